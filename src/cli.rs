use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::defaults::Defaults;
use crate::types::NonceMode;

/// Oracle price signer: builds signed setPrice meta-transactions offline
#[derive(Parser, Debug)]
#[command(version, about = "Oracle price signer (offline)")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign a batch of (key, price) records into setPrice meta-transactions
    Build {
        /// Path to the batch input JSON
        #[arg(long)]
        batch: PathBuf,

        /// Output file or directory (never overwritten; a " (n)" suffix is added)
        #[arg(long, default_value = Defaults::OUT_PATH)]
        out: PathBuf,

        /// Provider secret key (hex or nsec1…)
        #[arg(long, env = Defaults::PRIVATE_KEY_ENV, hide_env_values = true)]
        private_key: String,

        /// How the nonce is assigned across the batch
        #[arg(long, value_enum, default_value_t = NonceMode::Static)]
        nonce_mode: NonceMode,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Decode setPrice calldata into its arguments
    Decode {
        /// 0x-prefixed calldata
        #[arg(long)]
        data: String,

        /// Recover the signer by recomputing the digest on this chain
        #[arg(long)]
        chain_id: Option<u64>,
    },
}
