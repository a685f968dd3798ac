use std::fmt;

use num_bigint::BigUint;

use crate::constants::RECORD_WIDTH;

/// One fixed-width field of ASCII hex digits.
///
/// Records produced by [`crate::record::decode`] are always exactly
/// `RECORD_WIDTH` characters long. Character class is not checked here;
/// that happens when the record is turned into an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexRecord(String);

impl HexRecord {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the record spans exactly one field
    pub fn is_full_width(&self) -> bool {
        self.0.len() == RECORD_WIDTH
    }
}

impl fmt::Display for HexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Records in the order they appeared in the source stream
pub type RecordList = Vec<HexRecord>;

/// Number of transactions found in one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockTransactionCount(pub u64);

impl From<BlockTransactionCount> for BigUint {
    fn from(count: BlockTransactionCount) -> Self {
        BigUint::from(count.0)
    }
}

impl fmt::Display for BlockTransactionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for a single tally run
#[derive(Debug)]
pub enum TallyError {
    /// The input held no complete record
    EmptyInput,
    /// The provider answered, but without a usable transaction list
    MalformedBlockData(String),
    /// The provider has no block at the requested height
    BlockNotFound(BigUint),
    /// Transport failure talking to the provider
    ProviderUnavailable(String),
    /// JSON-RPC error object returned by the node
    Rpc { code: i64, message: String },
    /// Non-hex digit (or missing digit) under the strict digit policy
    InvalidRecord { position: usize, found: Option<char> },
    /// Encoded value does not fit in the field
    FieldOverflow { width: usize, digits: usize },
    Io(std::io::Error),
    Config(String),
}

impl fmt::Display for TallyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TallyError::EmptyInput => write!(f, "Input contains no complete record"),
            TallyError::MalformedBlockData(s) => write!(f, "Malformed block data: {}", s),
            TallyError::BlockNotFound(height) => write!(f, "Block not found at height {}", height),
            TallyError::ProviderUnavailable(s) => write!(f, "Provider unavailable: {}", s),
            TallyError::Rpc { code, message } => write!(f, "RPC error {}: {}", code, message),
            TallyError::InvalidRecord { position, found: Some(c) } => {
                write!(f, "Invalid hex digit {:?} at position {}", c, position)
            }
            TallyError::InvalidRecord { position, found: None } => {
                write!(f, "Record ends early: no digit at position {}", position)
            }
            TallyError::FieldOverflow { width, digits } => {
                write!(f, "Value needs {} hex digits, field holds {}", digits, width)
            }
            TallyError::Io(e) => write!(f, "IO error: {}", e),
            TallyError::Config(s) => write!(f, "Config error: {}", s),
        }
    }
}

impl std::error::Error for TallyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TallyError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TallyError {
    fn from(e: std::io::Error) -> Self {
        TallyError::Io(e)
    }
}

impl From<config::ConfigError> for TallyError {
    fn from(e: config::ConfigError) -> Self {
        TallyError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for TallyError {
    fn from(e: reqwest::Error) -> Self {
        TallyError::ProviderUnavailable(e.to_string())
    }
}
