use bech32::{decode as bech32_decode, FromBase32, Variant};
use ethers_core::abi::Abi;
use ethers_core::types::U256;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::abi::set_price_function;
use crate::decoder::decode_set_price;
use crate::encoding::{encode_set_price, pack_price_change};
use crate::error::{PriceSignerError, Result};
use crate::signing::{price_change_digest, provider_address, recover_signer, sign_digest, wallet_from_secret};
use crate::types::{
    BatchInput, MetaTransaction, NonceMode, PriceRecord, PriceRecordInput, ProviderSecret,
    UintInput, UpdateContext,
};
use crate::util::{parse_addr, parse_bytes32, parse_u256_any};
use crate::defaults::Defaults;

fn key_err(msg: impl Into<String>) -> PriceSignerError {
    PriceSignerError::InvalidKeyMaterial(msg.into())
}

/// Parse a secret key input as either:
/// - hex (64 hex chars, optional 0x/0X prefix), or
/// - bech32 "nsec1..." (payload must be exactly 32 bytes)
pub fn privkey_bytes_from_input(input: &str) -> Result<ProviderSecret> {
    let s = input.trim();

    if s.to_ascii_lowercase().starts_with("nsec1") {
        let (hrp, data, variant) =
            bech32_decode(s).map_err(|e| key_err(format!("nsec: bech32 decode failed: {e}")))?;
        if variant != Variant::Bech32 {
            return Err(key_err("nsec: invalid bech32 variant"));
        }
        if hrp.to_ascii_lowercase() != "nsec" {
            return Err(key_err(format!("nsec: invalid human-readable part '{hrp}'")));
        }
        let bytes = Zeroizing::new(
            Vec::<u8>::from_base32(&data).map_err(|_| key_err("nsec: invalid bech32 payload"))?,
        );
        return secret_from_slice(&bytes, "nsec: payload");
    }

    let pk = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    // hex errors never echo the input
    let bytes = Zeroizing::new(hex::decode(pk).map_err(|_| key_err("secret key is not valid hex"))?);
    secret_from_slice(&bytes, "hex secret key")
}

fn secret_from_slice(bytes: &[u8], what: &str) -> Result<ProviderSecret> {
    if bytes.len() != 32 {
        return Err(key_err(format!("{what} must be exactly 32 bytes (got {})", bytes.len())));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    let secret = ProviderSecret::new(out);
    zeroize::Zeroize::zeroize(&mut out);
    Ok(secret)
}

fn parse_uint(input: &UintInput) -> std::result::Result<U256, String> {
    match input {
        UintInput::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("{n} is not a non-negative integer (use a string above 2^64)")),
        UintInput::Text(t) => parse_u256_any(t).map_err(|e| format!("'{t}': {e}")),
    }
}

/// key must be exactly 32 bytes; price must fit uint256 and be non-negative
pub fn parse_record(index: usize, input: &PriceRecordInput) -> Result<PriceRecord> {
    let key = parse_bytes32(&input.key)
        .map_err(|e| PriceSignerError::malformed(index, format!("key: {e}")))?;
    let price = parse_uint(&input.price)
        .map_err(|e| PriceSignerError::malformed(index, format!("price: {e}")))?;
    Ok(PriceRecord { key, price })
}

/// Merge the batch file with the operator's secret into one explicit context.
/// The configured provider must be the key's own address.
pub fn build_context(
    batch: &BatchInput,
    secret: ProviderSecret,
    nonce_mode: NonceMode,
) -> Result<UpdateContext> {
    let chain_id = batch.chain_id.unwrap_or(Defaults::CHAIN_ID);
    if chain_id == 0 {
        return Err(PriceSignerError::Config("chainId must be positive".into()));
    }
    let oracle_address = parse_addr(batch.oracle_address.as_deref().unwrap_or(Defaults::ORACLE_ADDRESS))
        .map_err(|e| PriceSignerError::Config(format!("oracleAddress: {e}")))?;
    let configured = parse_addr(&batch.provider_address)
        .map_err(|e| PriceSignerError::Config(format!("providerAddress: {e}")))?;
    let nonce = match &batch.nonce {
        Some(n) => parse_uint(n).map_err(|e| PriceSignerError::Config(format!("nonce: {e}")))?,
        None => U256::from(Defaults::NONCE),
    };

    let wallet = wallet_from_secret(&secret, chain_id)?;
    let derived = provider_address(&wallet);
    if derived != configured {
        return Err(PriceSignerError::ProviderMismatch { configured, derived });
    }

    Ok(UpdateContext {
        provider_address: configured,
        provider_secret: secret,
        chain_id,
        oracle_address,
        nonce,
        nonce_mode,
    })
}

/// One signed setPrice meta-transaction per record, in input order.
pub fn build_meta_transactions(
    abi: &Abi,
    ctx: &UpdateContext,
    records: &[PriceRecord],
) -> Result<Vec<MetaTransaction>> {
    let func = set_price_function(abi).map_err(|e| PriceSignerError::Encoding(e.to_string()))?;
    let wallet = wallet_from_secret(&ctx.provider_secret, ctx.chain_id)?;

    if ctx.nonce_mode == NonceMode::Static && records.len() > 1 {
        debug!(
            nonce = %ctx.nonce,
            count = records.len(),
            "static nonce shared by every record in the batch"
        );
    }

    let mut out = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let nonce = ctx.nonce_for(i);
        let packed = pack_price_change(ctx.chain_id, ctx.provider_address, nonce, &rec.key, rec.price)?;
        let digest = price_change_digest(&packed)?;
        let sig = sign_digest(&wallet, &digest)?;
        let data = encode_set_price(func, ctx.provider_address, nonce, &rec.key, rec.price, &sig)?;

        debug!(
            index = i,
            key = %hex::encode(rec.key),
            nonce = %nonce,
            price = %rec.price,
            v = sig.v,
            "signed price change"
        );
        out.push(MetaTransaction::call(ctx.oracle_address, data));
    }

    info!(count = out.len(), oracle = ?ctx.oracle_address, "built setPrice meta-transactions");
    Ok(out)
}

/// Decode the call back, recompute the digest and ecrecover it, as the oracle will.
pub fn verify_meta_transaction(
    abi: &Abi,
    ctx: &UpdateContext,
    index: usize,
    tx: &MetaTransaction,
) -> Result<()> {
    if tx.to != ctx.oracle_address || !tx.value.is_zero() {
        return Err(PriceSignerError::Decode(format!(
            "transaction #{index} is not a zero-value call to {:#x}",
            ctx.oracle_address
        )));
    }
    let func = set_price_function(abi).map_err(|e| PriceSignerError::Decode(e.to_string()))?;
    let call = decode_set_price(func, &tx.data)?;
    let packed = pack_price_change(ctx.chain_id, call.provider, call.nonce, &call.key, call.price)?;
    let digest = price_change_digest(&packed)?;
    let recovered = recover_signer(&digest, &call.signature)?;
    if recovered != ctx.provider_address || call.provider != ctx.provider_address {
        return Err(PriceSignerError::SignatureMismatch {
            index,
            expected: ctx.provider_address,
            recovered,
        });
    }
    Ok(())
}

/// Full pipeline for the `build` subcommand: validate, sign, self-check.
pub fn process_batch(
    abi: &Abi,
    batch: &BatchInput,
    secret: ProviderSecret,
    nonce_mode: NonceMode,
) -> Result<(UpdateContext, Vec<MetaTransaction>)> {
    let records = batch
        .prices
        .iter()
        .enumerate()
        .map(|(i, r)| parse_record(i, r))
        .collect::<Result<Vec<_>>>()?;
    let ctx = build_context(batch, secret, nonce_mode)?;
    let txs = build_meta_transactions(abi, &ctx, &records)?;
    for (i, tx) in txs.iter().enumerate() {
        verify_meta_transaction(abi, &ctx, i, tx)?;
    }
    Ok((ctx, txs))
}
