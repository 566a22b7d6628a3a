use ethers_core::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::defaults::Defaults;

/// Batch input file (camelCase field names)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    pub chain_id: Option<u64>,
    pub oracle_address: Option<String>,
    pub provider_address: String,
    pub nonce: Option<UintInput>,
    pub prices: Vec<PriceRecordInput>,
}

/// One `{ key, price }` entry as written by the operator
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRecordInput {
    pub key: String,
    pub price: UintInput,
}

/// Integers may come as JSON numbers or as decimal / 0x strings.
/// Anything above 2^53 has to be a string to survive JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UintInput {
    Number(serde_json::Number),
    Text(String),
}

/// Validated record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRecord {
    pub key: [u8; 32],
    pub price: U256,
}

/// Provider secp256k1 secret, wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ProviderSecret([u8; 32]);

impl ProviderSecret {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ProviderSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderSecret(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NonceMode {
    /// Every record carries the configured nonce
    #[default]
    Static,
    /// Record i carries nonce + i
    Increment,
}

/// Everything shared by one batch
#[derive(Debug, Clone)]
pub struct UpdateContext {
    pub provider_address: Address,
    pub provider_secret: ProviderSecret,
    pub chain_id: u64,
    pub oracle_address: Address,
    pub nonce: U256,
    pub nonce_mode: NonceMode,
}

impl UpdateContext {
    /// Nonce carried by the record at `index`
    pub fn nonce_for(&self, index: usize) -> U256 {
        match self.nonce_mode {
            NonceMode::Static => self.nonce,
            NonceMode::Increment => self.nonce.saturating_add(U256::from(index)),
        }
    }
}

/// (r, s, v) as the oracle's ecrecover check expects them: v in {27, 28}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

/// Unsigned call description for an external batching/submission system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTransaction {
    pub to: Address,
    #[serde(serialize_with = "serialize_decimal")]
    pub value: U256,
    pub data: Bytes,
}

impl MetaTransaction {
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            value: U256::zero(),
            data: data.into(),
        }
    }
}

/// Decoded setPrice arguments, in ABI order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPriceCall {
    pub provider: Address,
    pub nonce: U256,
    pub key: [u8; 32],
    pub price: U256,
    pub signature: PriceSignature,
}

/// Ordered JSON view of a decoded setPrice call
#[allow(non_snake_case)]
#[derive(Debug, Serialize)]
pub struct SetPriceDecodedOrdered {
    pub funcName: String,
    pub provider: String,
    pub nonce: String,
    pub key: String,
    pub price: String,
    pub r: String,
    pub s: String,
    pub v: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recoveredSigner: Option<String>,
}

impl From<&SetPriceCall> for SetPriceDecodedOrdered {
    fn from(c: &SetPriceCall) -> Self {
        use crate::util::bytes_to_0x;
        Self {
            funcName: Defaults::SET_PRICE_FUNCTION.to_string(),
            provider: format!("{:#x}", c.provider),
            nonce: c.nonce.to_string(),
            key: bytes_to_0x(&c.key),
            price: c.price.to_string(),
            r: bytes_to_0x(&c.signature.r),
            s: bytes_to_0x(&c.signature.s),
            v: c.signature.v,
            recoveredSigner: None,
        }
    }
}

fn serialize_decimal<S: Serializer>(v: &U256, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&v.to_string())
}
