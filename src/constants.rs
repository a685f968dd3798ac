/// Record and Provider Constants
///
/// Fixed widths and defaults shared by the codec, the driver and the
/// configuration layer. Use these instead of magic numbers.

/// Width of one record field in hex characters (256 bits)
pub const RECORD_WIDTH: usize = 64;

/// Width of one record field in raw bytes
pub const RECORD_BYTES: usize = RECORD_WIDTH / 2;

/// Padding character used when encoding a field
pub const PAD_CHAR: char = '0';

/// Default provider host when neither the CLI nor the config names one
pub const DEFAULT_RPC_HOST: &str = "localhost";

/// Default JSON-RPC port of an Ethereum-style node
pub const DEFAULT_RPC_PORT: u16 = 8545;

pub const DEFAULT_RPC_SCHEME: &str = "http";

/// Default input file, read from the working directory
pub const DEFAULT_INPUT_PATH: &str = "custom.in";

/// Default output file, written to the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "custom.out";

/// JSON-RPC method used to fetch a block by its height
pub const METHOD_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

/// Check if a hex stream length lines up exactly with record boundaries
#[inline]
pub fn is_record_aligned(hex_len: usize) -> bool {
    hex_len % RECORD_WIDTH == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_alignment() {
        assert!(is_record_aligned(0));
        assert!(is_record_aligned(64));
        assert!(is_record_aligned(128));
        assert!(!is_record_aligned(70));
        assert_eq!(RECORD_BYTES, 32);
    }
}
