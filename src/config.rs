//! Run configuration
//!
//! Built once at start-up and passed down explicitly. Sources, lowest
//! priority first:
//! - built-in defaults
//! - `blocktally.toml` in the working directory (optional)
//! - `BLOCKTALLY__SECTION__KEY` environment variables
//! - the host given on the command line

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File as ConfigFile, Map};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT, DEFAULT_RPC_SCHEME,
};
use crate::record::{DigitPolicy, RecordEncoding};
use crate::types::TallyError;

/// Name of the optional config file (extension picked by the `config` crate)
pub const CONFIG_FILE_NAME: &str = "blocktally";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "BLOCKTALLY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    pub paths: PathsConfig,
    pub codec: CodecConfig,
    pub metrics: MetricsConfig,
}

/// Where and how to reach the chain-data provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    pub scheme: String,
    /// Transport timeout in seconds; unset means wait as long as the node does
    pub timeout_secs: Option<u64>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            scheme: DEFAULT_RPC_SCHEME.to_string(),
            timeout_secs: None,
        }
    }
}

impl RpcConfig {
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: String,
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT_PATH.to_string(),
            output: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

impl PathsConfig {
    pub fn input_path(&self) -> PathBuf {
        expand_path(&self.input)
    }

    pub fn output_path(&self) -> PathBuf {
        expand_path(&self.output)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub encoding: RecordEncoding,
    pub digits: DigitPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Write the prometheus text exposition here when the run ends
    pub textfile: Option<String>,
}

impl MetricsConfig {
    pub fn textfile_path(&self) -> Option<PathBuf> {
        self.textfile.as_deref().map(expand_path)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

impl AppConfig {
    /// Load config from file and environment, then apply the CLI host
    pub fn load(host_override: Option<&str>) -> Result<Self, TallyError> {
        let builder = Config::builder()
            .add_source(ConfigFile::with_name(CONFIG_FILE_NAME).required(false));
        Self::from_builder(builder, None, host_override)
    }

    /// Load config from a TOML string instead of the working directory
    pub fn from_toml(toml: &str, host_override: Option<&str>) -> Result<Self, TallyError> {
        Self::from_toml_with_env(toml, None, host_override)
    }

    /// Like [`AppConfig::from_toml`], but `env` replaces the process
    /// environment when given
    fn from_toml_with_env(
        toml: &str,
        env: Option<Map<String, String>>,
        host_override: Option<&str>,
    ) -> Result<Self, TallyError> {
        let builder =
            Config::builder().add_source(ConfigFile::from_str(toml, config::FileFormat::Toml));
        Self::from_builder(builder, env, host_override)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        env: Option<Map<String, String>>,
        host_override: Option<&str>,
    ) -> Result<Self, TallyError> {
        // No try_parsing: a host like "1e5" must reach serde as a string
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .set_override_option("rpc.host", host_override.map(str::to_string))?
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        if app.rpc.host.is_empty() {
            return Err(TallyError::Config("rpc.host must not be empty".to_string()));
        }
        Ok(app)
    }
}
