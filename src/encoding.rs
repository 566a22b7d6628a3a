use ethers_core::abi::{encode_packed, Function, Token};
use ethers_core::types::{Address, U256};

use crate::defaults::Defaults;
use crate::error::{PriceSignerError, Result};
use crate::types::PriceSignature;

pub fn t_uint(v: U256) -> Token {
    Token::Uint(v)
}
pub fn t_address(a: Address) -> Token {
    Token::Address(a)
}
pub fn t_bytes32(b: &[u8; 32]) -> Token {
    Token::FixedBytes(b.to_vec())
}

/// `abi.encodePacked(uint256 chainId, address provider, uint256 nonce, bytes32 key, uint256 price)`
///
/// Fields keep their natural width (32/20/32/32/32) and are concatenated
/// without padding. The result must match the preamble's declared length.
pub fn pack_price_change(
    chain_id: u64,
    provider: Address,
    nonce: U256,
    key: &[u8; 32],
    price: U256,
) -> Result<Vec<u8>> {
    let packed = encode_packed(&[
        t_uint(U256::from(chain_id)),
        t_address(provider),
        t_uint(nonce),
        t_bytes32(key),
        t_uint(price),
    ])
    .map_err(|e| PriceSignerError::Encoding(format!("packed encoding: {e}")))?;

    if packed.len() != Defaults::PACKED_PRICE_CHANGE_LEN {
        return Err(PriceSignerError::EncodingMismatch {
            declared: Defaults::PACKED_PRICE_CHANGE_LEN,
            actual: packed.len(),
        });
    }
    Ok(packed)
}

/// selector || abi.encode(provider, nonce, key, price, r, s, v)
pub fn encode_set_price(
    func: &Function,
    provider: Address,
    nonce: U256,
    key: &[u8; 32],
    price: U256,
    sig: &PriceSignature,
) -> Result<Vec<u8>> {
    let args = vec![
        t_address(provider),
        t_uint(nonce),
        t_bytes32(key),
        t_uint(price),
        t_bytes32(&sig.r),
        t_bytes32(&sig.s),
        t_uint(U256::from(sig.v)),
    ];
    func.encode_input(&args)
        .map_err(|e| PriceSignerError::Encoding(format!("setPrice encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{load_abi, set_price_function};

    fn u256_to_be32(x: U256) -> [u8; 32] {
        let mut b = [0u8; 32];
        x.to_big_endian(&mut b);
        b
    }

    fn key01() -> [u8; 32] {
        let mut k = [0u8; 32];
        k[31] = 1;
        k
    }

    #[test]
    fn packed_layout_is_natural_width() {
        let provider = Address::repeat_byte(0xaa);
        let price = U256::exp10(18);
        let packed = pack_price_change(11155111, provider, U256::zero(), &key01(), price).unwrap();

        assert_eq!(packed.len(), 148);
        assert_eq!(&packed[0..32], &u256_to_be32(U256::from(11155111u64)));
        assert_eq!(&packed[32..52], provider.as_bytes());
        assert_eq!(&packed[52..84], &[0u8; 32]);
        assert_eq!(&packed[84..116], &key01());
        assert_eq!(&packed[116..148], &u256_to_be32(price));
    }

    #[test]
    fn packing_is_deterministic() {
        let a = pack_price_change(1, Address::repeat_byte(3), U256::from(9u64), &key01(), U256::from(42u64)).unwrap();
        let b = pack_price_change(1, Address::repeat_byte(3), U256::from(9u64), &key01(), U256::from(42u64)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn packing_keeps_price_bounds() {
        let zero = pack_price_change(1, Address::zero(), U256::zero(), &key01(), U256::zero()).unwrap();
        assert_eq!(&zero[116..], &[0u8; 32]);
        let max = pack_price_change(1, Address::zero(), U256::zero(), &key01(), U256::MAX).unwrap();
        assert_eq!(&max[116..], &[0xffu8; 32]);
        assert_eq!(max.len(), 148);
    }

    #[test]
    fn calldata_is_selector_plus_padded_args() {
        let abi = load_abi().unwrap();
        let f = set_price_function(&abi).unwrap();
        let sig = PriceSignature { r: [0x11; 32], s: [0x22; 32], v: 28 };
        let data = encode_set_price(f, Address::repeat_byte(0xaa), U256::from(5u64), &key01(), U256::MAX, &sig).unwrap();

        assert_eq!(data.len(), 4 + 7 * 32);
        assert_eq!(&data[..4], &f.short_signature());
        // address left-padded to a full word
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], Address::repeat_byte(0xaa).as_bytes());
        assert_eq!(&data[4 + 3 * 32..4 + 4 * 32], &[0xffu8; 32]);
        assert_eq!(&data[4 + 4 * 32..4 + 5 * 32], &[0x11u8; 32]);
        assert_eq!(data[4 + 7 * 32 - 1], 28);
    }
}
