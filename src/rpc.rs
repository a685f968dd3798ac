//! Chain-data provider
//!
//! The driver only needs "give me the block at this height". The HTTP
//! implementation speaks Ethereum-style JSON-RPC 2.0; tests swap in an
//! in-memory provider through the same trait.

use async_trait::async_trait;
use num_bigint::BigUint;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RpcConfig;
use crate::constants::METHOD_GET_BLOCK_BY_NUMBER;
use crate::metrics;
use crate::types::TallyError;

/// Source of block data, queried once per run
#[async_trait]
pub trait BlockProvider: Send + Sync {
    /// Fetch the block at `height` as the node's JSON object
    ///
    /// Returns `TallyError::BlockNotFound` when the node has no such block.
    async fn get_block_by_height(&self, height: &BigUint) -> Result<Value, TallyError>;
}

/// JSON-RPC over HTTP provider
pub struct HttpBlockProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpBlockProvider {
    pub fn new(config: &RpcConfig) -> Result<Self, TallyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: config.endpoint(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, TallyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params
            }))
            .send()
            .await?
            .error_for_status()?;

        let json: Value = response.json().await?;
        extract_rpc_result(json)
    }
}

#[async_trait]
impl BlockProvider for HttpBlockProvider {
    async fn get_block_by_height(&self, height: &BigUint) -> Result<Value, TallyError> {
        let method = METHOD_GET_BLOCK_BY_NUMBER;
        let quantity = to_quantity(height);
        debug!(url = %self.url, method, height = %quantity, "RPC request");

        // false: transaction hashes only, the count is all we need
        let timer = metrics::Timer::new();
        let result = self
            .call(method, serde_json::json!([quantity, false]))
            .await;
        let elapsed = timer.elapsed_secs();
        metrics::observe_rpc_duration(method, elapsed);

        if elapsed > 5.0 {
            warn!(method, height = %quantity, duration_secs = elapsed, "Slow RPC call");
        }

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                metrics::increment_rpc_errors(method, error_kind(&e));
                return Err(e);
            }
        };

        if result.is_null() {
            metrics::increment_rpc_errors(method, "not_found");
            return Err(TallyError::BlockNotFound(height.clone()));
        }

        Ok(result)
    }
}

/// Render a height as a JSON-RPC quantity ("0x" + hex, no leading zeros)
pub fn to_quantity(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

/// Pull `result` out of a JSON-RPC response envelope
///
/// A present `error` object wins over any `result`. A missing `result`
/// is reported as malformed; `null` is passed through for the caller.
pub fn extract_rpc_result(mut json: Value) -> Result<Value, TallyError> {
    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(TallyError::Rpc { code, message });
    }

    json.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| TallyError::MalformedBlockData("No result in RPC response".to_string()))
}

fn error_kind(e: &TallyError) -> &'static str {
    match e {
        TallyError::ProviderUnavailable(_) => "connection",
        TallyError::Rpc { .. } => "rpc",
        TallyError::BlockNotFound(_) => "not_found",
        _ => "malformed",
    }
}
