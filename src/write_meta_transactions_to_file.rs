use anyhow::{Context, Result};
use ethers_core::types::{Address, U256};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::types::MetaTransaction;

/// Write the meta-transactions to a file as a JSON array.
/// - If the file already exists, creates a unique variant like "file (1).json".
/// - If `out_path` is an existing directory, a descriptive filename is generated inside it.
/// - `pretty = false` → compact JSON (no extra whitespace).
pub fn write_meta_transactions_to_file<P: AsRef<Path>>(
    out_path: P,
    txs: &[MetaTransaction],
    name_hint: &BatchNameHint,
    pretty: bool,
) -> Result<PathBuf> {
    let out_path = out_path.as_ref();
    let out_path = if out_path.is_dir() {
        out_path.join(build_filename_for_batch(name_hint))
    } else {
        out_path.to_path_buf()
    };

    // Ensure parent directory exists
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating parent directory {}", parent.display()))?;
        }
    }

    // Serialize once (fail before touching the filesystem)
    let json = if pretty {
        serde_json::to_string_pretty(txs)?
    } else {
        serde_json::to_string(txs)?
    };

    let (mut f, final_path) = create_unique_file(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    f.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", final_path.display()))?;
    f.flush()?;
    Ok(final_path)
}

pub struct BatchNameHint {
    pub provider: Address,
    pub chain_id: u64,
    pub nonce: U256,
    pub count: usize,
}

/// e.g. "set_price_0xf39fd6..92266_chain_11155111_nonce_0_x3.json"
pub fn build_filename_for_batch(hint: &BatchNameHint) -> String {
    let provider = hex::encode(hint.provider.as_bytes());
    format!(
        "set_price_0x{}_chain_{}_nonce_{}_x{}.json",
        abbrev_hex(&provider),
        hint.chain_id,
        hint.nonce,
        hint.count
    )
}

/// Abbreviate a hex string as "first6..last5".
fn abbrev_hex(x: &str) -> String {
    if x.len() >= 16 {
        format!("{}..{}", &x[..6], &x[x.len() - 5..])
    } else {
        x.to_string()
    }
}

/// Create a file with a unique name, avoiding overwrite by appending " (1)", " (2)", etc.
fn create_unique_file(path: &Path) -> io::Result<(File, PathBuf)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    for i in 0..10_000 {
        let candidate_name = match (i, ext.is_empty()) {
            (0, true) => stem.to_string(),
            (0, false) => format!("{stem}.{ext}"),
            (_, true) => format!("{stem} ({i})"),
            (_, false) => format!("{stem} ({i}).{ext}"),
        };
        let candidate_path = dir.join(&candidate_name);

        match OpenOptions::new().write(true).create_new(true).open(&candidate_path) {
            Ok(f) => return Ok((f, candidate_path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "failed to create a unique filename after many attempts",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn hint() -> BatchNameHint {
        BatchNameHint {
            provider: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap(),
            chain_id: 11155111,
            nonce: U256::zero(),
            count: 2,
        }
    }

    fn txs() -> Vec<MetaTransaction> {
        vec![
            MetaTransaction::call(Address::repeat_byte(1), vec![1, 2, 3]),
            MetaTransaction::call(Address::repeat_byte(1), vec![4, 5, 6]),
        ]
    }

    #[test]
    fn never_overwrites_existing_output() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out").join("txs.json");

        let first = write_meta_transactions_to_file(&target, &txs(), &hint(), true).unwrap();
        let second = write_meta_transactions_to_file(&target, &txs(), &hint(), false).unwrap();

        assert_eq!(first, target);
        assert_eq!(second, dir.path().join("out").join("txs (1).json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&second).unwrap()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["data"], "0x040506");
        assert_eq!(parsed[0]["value"], "0");
    }

    #[test]
    fn directory_target_gets_generated_name() {
        let dir = tempdir().unwrap();
        let p = write_meta_transactions_to_file(dir.path(), &txs(), &hint(), true).unwrap();
        assert_eq!(
            p.file_name().unwrap().to_str().unwrap(),
            "set_price_0xf39fd6..92266_chain_11155111_nonce_0_x2.json"
        );
    }
}
