use ethers_core::abi::{Function, Token};
use ethers_core::types::{Address, U256};

use crate::error::{PriceSignerError, Result};
use crate::types::{PriceSignature, SetPriceCall};

fn bad(msg: impl Into<String>) -> PriceSignerError {
    PriceSignerError::Decode(msg.into())
}

fn as_address(tok: &Token) -> Result<Address> {
    match tok {
        Token::Address(a) => Ok(*a),
        _ => Err(bad("expected address")),
    }
}
fn as_uint(tok: &Token) -> Result<U256> {
    match tok {
        Token::Uint(u) => Ok(*u),
        _ => Err(bad("expected uint")),
    }
}
fn as_bytes32(tok: &Token) -> Result<[u8; 32]> {
    match tok {
        Token::FixedBytes(b) => <[u8; 32]>::try_from(b.as_slice()).map_err(|_| bad("expected bytes32")),
        _ => Err(bad("expected fixed bytes")),
    }
}
fn as_u8(tok: &Token) -> Result<u8> {
    let u = as_uint(tok)?;
    if u > U256::from(u8::MAX) {
        return Err(bad("uint8 out of range"));
    }
    Ok(u.low_u32() as u8)
}

/// selector || abi.encode(...) -> typed setPrice arguments
pub fn decode_set_price(func: &Function, data: &[u8]) -> Result<SetPriceCall> {
    if data.len() < 4 {
        return Err(bad("calldata too short"));
    }
    if data[..4] != func.short_signature() {
        return Err(bad(format!(
            "selector 0x{} is not {}",
            hex::encode(&data[..4]),
            func.name
        )));
    }
    let t = func
        .decode_input(&data[4..])
        .map_err(|e| bad(e.to_string()))?;
    if t.len() != 7 {
        return Err(bad(format!("expected 7 arguments, got {}", t.len())));
    }

    Ok(SetPriceCall {
        provider: as_address(&t[0])?,
        nonce: as_uint(&t[1])?,
        key: as_bytes32(&t[2])?,
        price: as_uint(&t[3])?,
        signature: PriceSignature {
            r: as_bytes32(&t[4])?,
            s: as_bytes32(&t[5])?,
            v: as_u8(&t[6])?,
        },
    })
}
