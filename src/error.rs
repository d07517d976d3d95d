// Error kinds surfaced by the genesis builder

use thiserror::Error;

/// Errors produced while encoding, hashing or grinding a genesis block.
///
/// None of these are retried internally. `NonceSpaceExhausted` is the only
/// one a caller is expected to react to, by changing the time, message or
/// extra nonce and running the pipeline again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    /// Compact bits that do not describe a non-negative 256-bit target
    #[error("invalid compact difficulty 0x{bits:08x}: {reason}")]
    InvalidDifficulty { bits: u32, reason: &'static str },

    /// A script that does not fit behind a single-byte length prefix
    #[error("{field} is {len} bytes, single-byte length prefix allows at most 252")]
    ScriptTooLongForCompactEncoding { field: &'static str, len: usize },

    /// Script numbers are only encoded for non-negative values
    #[error("cannot encode negative script number {0}")]
    UnsupportedNegative(i64),

    /// Every nonce from `start_nonce` up to u32::MAX was tried (or the time budget ran out)
    #[error("nonce space exhausted after {attempts} attempts starting at nonce {start_nonce}")]
    NonceSpaceExhausted { start_nonce: u32, attempts: u64 },

    /// The external grinder answered with something we could not verify
    #[error("grinding accelerator contract violation: {0}")]
    AcceleratorContractViolation(String),

    /// Malformed hex or truncated byte input
    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, GenesisError>;
