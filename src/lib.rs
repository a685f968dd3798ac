//! blocktally: read a block height from a fixed-width hex record, ask a
//! chain node how many transactions that block holds, and write the count
//! back as a fixed-width hex record.

pub mod config;
pub mod constants;
pub mod driver;
pub mod metrics;
pub mod output;
pub mod record;
pub mod rpc;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use driver::{run, tally, Tally};
pub use record::{decode, decode_to_integer, encode, encode_checked, DigitPolicy, RecordEncoding};
pub use rpc::{BlockProvider, HttpBlockProvider};
pub use types::{BlockTransactionCount, HexRecord, RecordList, TallyError};
