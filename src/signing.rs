use ethers_core::types::{Address, Signature, H256, U256};
use ethers_signers::{LocalWallet, Signer};
use tiny_keccak::{Hasher, Keccak};

use crate::defaults::Defaults;
use crate::error::{PriceSignerError, Result};
use crate::types::{PriceSignature, ProviderSecret};

/// keccak256(PREAMBLE || packed), hashed once
pub fn price_change_digest(packed: &[u8]) -> Result<[u8; 32]> {
    if packed.len() != Defaults::PACKED_PRICE_CHANGE_LEN {
        return Err(PriceSignerError::EncodingMismatch {
            declared: Defaults::PACKED_PRICE_CHANGE_LEN,
            actual: packed.len(),
        });
    }
    let mut hasher = Keccak::v256();
    hasher.update(Defaults::PRICE_CHANGE_PREAMBLE.as_bytes());
    hasher.update(packed);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    Ok(out)
}

/// Wallet for a provider secret. Zero and >= n are rejected by k256.
pub fn wallet_from_secret(secret: &ProviderSecret, chain_id: u64) -> Result<LocalWallet> {
    let sk = k256::ecdsa::SigningKey::from_slice(secret.as_bytes()).map_err(|_| {
        PriceSignerError::InvalidKeyMaterial(
            "invalid secp256k1 secret key (out of range or zero)".into(),
        )
    })?;
    Ok(LocalWallet::from(sk).with_chain_id(chain_id))
}

/// Raw ECDSA over the digest (RFC 6979 nonce, low-s). No EIP-191 prefix is added here:
/// the preamble is already part of the digest.
pub fn sign_digest(wallet: &LocalWallet, digest: &[u8; 32]) -> Result<PriceSignature> {
    let (sig, recid) = wallet
        .signer()
        .sign_prehash_recoverable(digest)
        .map_err(|e| PriceSignerError::Signing(e.to_string()))?;
    let rs = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&rs[..32]);
    s.copy_from_slice(&rs[32..]);
    Ok(PriceSignature {
        r,
        s,
        v: 27 + recid.to_byte(),
    })
}

/// ecrecover, the same check the oracle runs on-chain
pub fn recover_signer(digest: &[u8; 32], sig: &PriceSignature) -> Result<Address> {
    let sig = Signature {
        r: U256::from_big_endian(&sig.r),
        s: U256::from_big_endian(&sig.s),
        v: sig.v as u64,
    };
    sig.recover(H256::from(*digest))
        .map_err(|e| PriceSignerError::Signing(format!("recovery: {e}")))
}

pub fn provider_address(wallet: &LocalWallet) -> Address {
    wallet.address()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::pack_price_change;
    use ethers_core::utils::keccak256;

    // Hardhat / anvil account #0
    const TEST_PK: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDR: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn test_secret() -> ProviderSecret {
        let mut b = [0u8; 32];
        b.copy_from_slice(&hex::decode(TEST_PK).unwrap());
        ProviderSecret::new(b)
    }

    fn key01() -> [u8; 32] {
        let mut k = [0u8; 32];
        k[31] = 1;
        k
    }

    fn digest_for(provider: Address, price: U256) -> [u8; 32] {
        let packed = pack_price_change(11155111, provider, U256::zero(), &key01(), price).unwrap();
        price_change_digest(&packed).unwrap()
    }

    #[test]
    fn digest_is_keccak_of_preamble_and_payload() {
        let packed = pack_price_change(11155111, Address::repeat_byte(0xaa), U256::zero(), &key01(), U256::exp10(18)).unwrap();
        let mut msg = b"\x19Oracle Signed Price Change:\n148".to_vec();
        msg.extend_from_slice(&packed);
        assert_eq!(price_change_digest(&packed).unwrap(), keccak256(&msg));
    }

    #[test]
    fn digest_rejects_wrong_payload_width() {
        let err = price_change_digest(&[0u8; 116]).unwrap_err();
        assert!(matches!(
            err,
            PriceSignerError::EncodingMismatch { declared: 148, actual: 116 }
        ));
    }

    #[test]
    fn wallet_address_matches_known_key() {
        let w = wallet_from_secret(&test_secret(), 11155111).unwrap();
        assert_eq!(provider_address(&w), TEST_ADDR.parse::<Address>().unwrap());
    }

    #[test]
    fn signature_recovers_to_provider() {
        let w = wallet_from_secret(&test_secret(), 11155111).unwrap();
        let digest = digest_for(w.address(), U256::exp10(18));
        let sig = sign_digest(&w, &digest).unwrap();
        assert!(sig.v == 27 || sig.v == 28);
        assert_eq!(recover_signer(&digest, &sig).unwrap(), w.address());
    }

    #[test]
    fn signing_is_deterministic() {
        let w = wallet_from_secret(&test_secret(), 11155111).unwrap();
        let digest = digest_for(w.address(), U256::from(5u64));
        assert_eq!(sign_digest(&w, &digest).unwrap(), sign_digest(&w, &digest).unwrap());
    }

    #[test]
    fn different_prices_differ() {
        let w = wallet_from_secret(&test_secret(), 11155111).unwrap();
        let d1 = digest_for(w.address(), U256::from(100u64));
        let d2 = digest_for(w.address(), U256::from(101u64));
        assert_ne!(d1, d2);
        assert_ne!(sign_digest(&w, &d1).unwrap(), sign_digest(&w, &d2).unwrap());
    }

    #[test]
    fn sepolia_scenario_recovers_with_foreign_provider_field() {
        // provider field is 0xAA..AA; the signature still recovers to the key's own address
        let w = wallet_from_secret(&test_secret(), 11155111).unwrap();
        let digest = digest_for(Address::repeat_byte(0xaa), U256::exp10(18));
        assert_eq!(digest, digest_for(Address::repeat_byte(0xaa), U256::exp10(18)));
        let sig = sign_digest(&w, &digest).unwrap();
        assert_eq!(recover_signer(&digest, &sig).unwrap(), w.address());
    }

    #[test]
    fn zero_and_out_of_range_keys_rejected() {
        assert!(matches!(
            wallet_from_secret(&ProviderSecret::new([0u8; 32]), 1),
            Err(PriceSignerError::InvalidKeyMaterial(_))
        ));
        assert!(matches!(
            wallet_from_secret(&ProviderSecret::new([0xffu8; 32]), 1),
            Err(PriceSignerError::InvalidKeyMaterial(_))
        ));
    }
}
