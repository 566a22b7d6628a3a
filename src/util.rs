// src/util.rs
use anyhow::{anyhow, Result};
use ethers_core::types::{Address, U256};

/// Decimal or 0x-hex into U256. Rejects empty input, signs and anything above 2^256-1.
pub fn parse_u256_any(s: &str) -> Result<U256> {
    let t = s.trim();
    if t.is_empty() {
        return Err(anyhow!("empty integer"));
    }
    Ok(if let Some(x) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        if x.is_empty() || x.len() > 64 {
            return Err(anyhow!("hex integer must have 1..=64 digits, got {}", x.len()));
        }
        U256::from_str_radix(x, 16)?
    } else {
        U256::from_dec_str(t)?
    })
}

pub fn parse_addr(s: &str) -> Result<Address> {
    Ok(s.trim().parse::<Address>()?)
}

pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>> {
    let t = s.trim();
    let t = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")).unwrap_or(t);
    Ok(hex::decode(t)?)
}

/// Exactly 32 bytes of hex, nothing shorter is padded.
pub fn parse_bytes32(s: &str) -> Result<[u8; 32]> {
    let bytes = hex_to_bytes(s)?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| anyhow!("expected 32 bytes, got {}", bytes.len()))
}

pub fn bytes_to_0x(v: &[u8]) -> String {
    format!("0x{}", hex::encode(v))
}
