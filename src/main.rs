use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

mod abi;
mod cli;
mod decoder;
mod defaults;
mod encoding;
mod error;
mod process;
mod signing;
mod types;
mod util;
mod write_meta_transactions_to_file;

use crate::abi::{load_abi, set_price_function};
use crate::cli::{Cli, Command};
use crate::defaults::Defaults;
use crate::process::{privkey_bytes_from_input, process_batch};
use crate::types::SetPriceDecodedOrdered;
use crate::write_meta_transactions_to_file::{write_meta_transactions_to_file, BatchNameHint};

fn main() -> Result<()> {
    // .env may carry ORACLE_PROVIDER_PK; must load before clap reads env
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Defaults::LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Build { batch, out, private_key, nonce_mode, compact } => {
            let abi = load_abi()?;
            let text = fs::read_to_string(&batch)
                .with_context(|| format!("reading batch JSON {}", batch.display()))?;
            let input: types::BatchInput =
                serde_json::from_str(&text).context("parsing batch JSON")?;

            let private_key = Zeroizing::new(private_key);
            let secret = privkey_bytes_from_input(&private_key).context("loading provider key")?;
            drop(private_key);

            let (ctx, txs) = process_batch(&abi, &input, secret, nonce_mode)
                .with_context(|| format!("building batch from {}", batch.display()))?;

            let hint = BatchNameHint {
                provider: ctx.provider_address,
                chain_id: ctx.chain_id,
                nonce: ctx.nonce,
                count: txs.len(),
            };
            drop(ctx);

            let written = write_meta_transactions_to_file(&out, &txs, &hint, !compact)?;
            tracing::info!(count = txs.len(), path = %written.display(), "wrote meta-transactions");
            println!("✓ Wrote {}", written.display());
            Ok(())
        }

        Command::Decode { data, chain_id } => {
            let abi = load_abi()?;
            let func = set_price_function(&abi)?;
            let bytes = util::hex_to_bytes(&data).context("calldata is not hex")?;
            let call = decoder::decode_set_price(func, &bytes)?;

            let mut view = SetPriceDecodedOrdered::from(&call);
            if let Some(chain_id) = chain_id {
                let packed = encoding::pack_price_change(chain_id, call.provider, call.nonce, &call.key, call.price)?;
                let digest = signing::price_change_digest(&packed)?;
                let signer = signing::recover_signer(&digest, &call.signature)?;
                if signer != call.provider {
                    tracing::warn!(provider = ?call.provider, recovered = ?signer, "signature does not recover to provider");
                }
                view.recoveredSigner = Some(format!("{:#x}", signer));
            }
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
    }
}
