//! Query Driver
//!
//! One run: decode the input, take the first record as a block height,
//! ask the provider for that block, count its transactions, and write the
//! count back as a single field.
//!
//! Every failure is fatal. The output file is touched only after the
//! provider response has been turned into a field.

use num_bigint::BigUint;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{AppConfig, CodecConfig};
use crate::constants::is_record_aligned;
use crate::metrics;
use crate::output::write_atomic;
use crate::record::{decode, decode_to_integer, encode_field, RecordEncoding};
use crate::rpc::BlockProvider;
use crate::telemetry::{truncate_hex, truncate_list};
use crate::types::{BlockTransactionCount, TallyError};

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    /// Block height read from the first input record
    pub height: BigUint,
    /// Full records found in the input
    pub records: usize,
    pub count: BlockTransactionCount,
    /// Bytes of the encoded output field, as written to disk
    pub field: Vec<u8>,
}

/// Count the entries of a block's `transactions` list
pub fn count_transactions(block: &Value) -> Result<BlockTransactionCount, TallyError> {
    let transactions = block
        .get("transactions")
        .and_then(|t| t.as_array())
        .ok_or_else(|| TallyError::MalformedBlockData("No transactions array in block".to_string()))?;
    Ok(BlockTransactionCount(transactions.len() as u64))
}

/// Run the query against in-memory input, without touching the filesystem
pub async fn tally<P>(provider: &P, input: &[u8], codec: CodecConfig) -> Result<Tally, TallyError>
where
    P: BlockProvider + ?Sized,
{
    let hex_len = match codec.encoding {
        RecordEncoding::Text => input.len(),
        RecordEncoding::Binary => input.len() * 2,
    };
    if !is_record_aligned(hex_len) {
        debug!(hex_len, "Trailing partial record dropped");
    }

    let records = decode(input, codec.encoding);
    metrics::increment_records_decoded(records.len() as u64);
    debug!(
        records = records.len(),
        list = %truncate_list(&records, 4),
        "Input decoded"
    );

    let first = records.first().ok_or(TallyError::EmptyInput)?;
    let height = decode_to_integer(first.as_str(), codec.digits)?;
    info!(height = %height, record = %truncate_hex(first.as_str(), 16), "Block height read");

    let block = provider.get_block_by_height(&height).await?;
    let count = count_transactions(&block)?;
    info!(height = %height, transactions = count.0, "Block fetched");

    let field = encode_field(&BigUint::from(count), codec.encoding)?;
    metrics::set_block_transactions(count.0 as i64);

    Ok(Tally {
        height,
        records: records.len(),
        count,
        field,
    })
}

/// Read the configured input file, query the provider, write the output file
pub async fn run<P>(config: &AppConfig, provider: &P) -> Result<Tally, TallyError>
where
    P: BlockProvider + ?Sized,
{
    let input_path = config.paths.input_path();
    let output_path = config.paths.output_path();

    let input = std::fs::read(&input_path)?;
    debug!(path = %input_path.display(), bytes = input.len(), "Input read");

    let result = tally(provider, &input, config.codec).await?;

    write_atomic(&output_path, &result.field)?;
    info!(
        path = %output_path.display(),
        transactions = result.count.0,
        "Output written"
    );

    Ok(result)
}
