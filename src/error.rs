use ethers_core::types::Address;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PriceSignerError>;

/// Everything that can go wrong while building a signed price batch.
/// All variants are fatal to the whole batch.
#[derive(Error, Debug)]
pub enum PriceSignerError {
    /// Secret key is not a usable secp256k1 scalar
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// A price record failed validation
    #[error("malformed price record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// Packed payload width drifted from the preamble's declared length
    #[error("packed payload is {actual} bytes but preamble declares {declared}")]
    EncodingMismatch { declared: usize, actual: usize },

    #[error("configured provider {configured:#x} does not match key address {derived:#x}")]
    ProviderMismatch { configured: Address, derived: Address },

    #[error("transaction #{index}: signature recovers to {recovered:#x}, expected {expected:#x}")]
    SignatureMismatch {
        index: usize,
        expected: Address,
        recovered: Address,
    },

    /// Batch-level settings (chain id, addresses, nonce) are unusable
    #[error("invalid batch configuration: {0}")]
    Config(String),

    #[error("abi encoding failed: {0}")]
    Encoding(String),

    #[error("calldata decode failed: {0}")]
    Decode(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

impl PriceSignerError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}
