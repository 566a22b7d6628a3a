use anyhow::{Context, Result};
use ethers_core::abi::{Abi, Function};

/// OracleEntrypoint ABI, trimmed to what this tool calls.
const ORACLE_ENTRYPOINT_ABI: &str = r#"[
  {
    "type": "function",
    "name": "setPrice",
    "stateMutability": "nonpayable",
    "inputs": [
      { "name": "provider", "type": "address", "internalType": "address" },
      { "name": "nonce",    "type": "uint256", "internalType": "uint256" },
      { "name": "key",      "type": "bytes32", "internalType": "bytes32" },
      { "name": "price",    "type": "uint256", "internalType": "uint256" },
      { "name": "r",        "type": "bytes32", "internalType": "bytes32" },
      { "name": "s",        "type": "bytes32", "internalType": "bytes32" },
      { "name": "v",        "type": "uint8",   "internalType": "uint8" }
    ],
    "outputs": []
  },
  {
    "type": "function",
    "name": "nonces",
    "stateMutability": "view",
    "inputs": [
      { "name": "provider", "type": "address", "internalType": "address" }
    ],
    "outputs": [
      { "name": "", "type": "uint256", "internalType": "uint256" }
    ]
  }
]"#;

pub fn load_abi() -> Result<Abi> {
    serde_json::from_str(ORACLE_ENTRYPOINT_ABI).context("parsing embedded OracleEntrypoint ABI")
}

pub fn set_price_function(abi: &Abi) -> Result<&Function> {
    abi.function(crate::defaults::Defaults::SET_PRICE_FUNCTION)
        .context("setPrice not in embedded ABI")
}
