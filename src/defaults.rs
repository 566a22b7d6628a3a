//! Central place for all default values.
//! Update these and the whole tool picks them up.

pub struct Defaults;

impl Defaults {
    /* Target chain / contract */
    pub const CHAIN_ID: u64 = 11155111; // sepolia
    pub const ORACLE_ADDRESS: &'static str = "0x9F82E17fb4d5815cf261a9AafFE53A9834F55b9F";
    pub const NONCE: u64 = 0; // provider never called the oracle entrypoint

    /* setPrice */
    pub const SET_PRICE_FUNCTION: &'static str = "setPrice";
    pub const SET_PRICE_SIGNATURE: &'static str =
        "setPrice(address,uint256,bytes32,uint256,bytes32,bytes32,uint8)";

    /* Signed payload: chainId(32) || provider(20) || nonce(32) || key(32) || price(32) */
    pub const PACKED_PRICE_CHANGE_LEN: usize = 148;
    pub const PRICE_CHANGE_PREAMBLE: &'static str = "\x19Oracle Signed Price Change:\n148";

    /* Output */
    pub const OUT_PATH: &'static str = "./generated_transactions/set_price_meta_txs.json";

    /* Env */
    pub const PRIVATE_KEY_ENV: &'static str = "ORACLE_PROVIDER_PK";
    pub const LOG_FILTER: &'static str = "oracle_price_signer=info";
}
