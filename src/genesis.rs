// Genesis block pipeline: parameters -> coinbase -> template -> search -> report

use serde::Serialize;

use crate::consensus::{ProofOfWorkSearch, Target, verify_solution};
use crate::core::script::{GENESIS_EXTRA_NONCE, GENESIS_SCRIPT_BITS};
use crate::core::{CoinbaseTransaction, GenesisBlock, OutputScript, Script, TxOutput};
use crate::error::Result;

/// Smallest units per coin
pub const COIN: u64 = 100_000_000;

/// Caller-chosen inputs for one genesis attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisParams {
    /// Human-readable message embedded in the coinbase scriptSig
    pub message: String,
    pub time: u32,
    /// Header difficulty bits
    pub bits: u32,
    pub version: i32,
    /// Output value in smallest units
    pub reward: u64,
    pub output_script: OutputScript,
    /// Number pushed first in the scriptSig, independent of `bits`
    pub script_bits: u32,
    /// Small constant pushed after `script_bits`
    pub extra_nonce: i64,
    pub start_nonce: u32,
}

impl GenesisParams {
    /// Version 1, 50 coins, historical scriptSig constants, search from nonce 0
    pub fn new(message: impl Into<String>, time: u32, bits: u32, output_script: OutputScript) -> Self {
        Self {
            message: message.into(),
            time,
            bits,
            version: 1,
            reward: 50 * COIN,
            output_script,
            script_bits: GENESIS_SCRIPT_BITS,
            extra_nonce: GENESIS_EXTRA_NONCE,
            start_nonce: 0,
        }
    }
}

/// Build the coinbase and the header template (nonce = `start_nonce`)
pub fn build_template(params: &GenesisParams) -> Result<GenesisBlock> {
    let script_sig = Script::coinbase_script_sig(
        params.script_bits as i64,
        params.extra_nonce,
        params.message.as_bytes(),
    )?;
    let coinbase = CoinbaseTransaction::new(
        script_sig,
        TxOutput::new(params.reward, params.output_script.to_bytes()),
    );

    let mut block = GenesisBlock::new(coinbase, params.version, params.time, params.bits)?;
    block.header.nonce = params.start_nonce;
    Ok(block)
}

/// Build the template and search for a nonce with `search`.
///
/// The search result is checked against the template and the target before
/// it is accepted, whichever backend produced it.
pub fn mine_genesis(params: &GenesisParams, search: &dyn ProofOfWorkSearch) -> Result<GenesisBlock> {
    let template = build_template(params)?;
    let target = Target::from_bits(params.bits)?;

    log::info!(
        "Grinding genesis with {} backend: bits=0x{:08x} target={} merkle={}",
        search.name(),
        params.bits,
        target.to_hex(),
        template.header.merkle_root
    );

    let result = search.search(&template.header, &target, params.start_nonce)?;
    verify_solution(&template.header, &result.header, &target)?;

    log::info!(
        "Genesis solved: nonce={} hash={} ({} attempts in {:?}, {:.2} H/s)",
        result.nonce,
        result.hash,
        result.attempts,
        result.duration,
        result.hash_rate()
    );

    Ok(GenesisBlock {
        header: result.header,
        coinbase: template.coinbase,
    })
}

/// Rebuild a genesis block with a known nonce and check its proof-of-work
pub fn verify_genesis(params: &GenesisParams, nonce: u32) -> Result<GenesisBlock> {
    let mut block = build_template(params)?;
    let template = block.header.clone();
    block.header.nonce = nonce;
    verify_solution(&template, &block.header, &Target::from_bits(params.bits)?)?;
    Ok(block)
}

/// Everything a reporter needs about a solved genesis block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenesisReport {
    pub message: String,
    pub version: i32,
    pub time: u32,
    pub bits: String,
    pub nonce: u32,
    pub reward: u64,
    pub block_hash: String,
    pub merkle_root: String,
    pub coinbase_txid: String,
    pub coinbase_txid_internal: String,
    pub coinbase_hex: String,
    pub header_hex: String,
    pub script_sig: String,
    pub script_pubkey: String,
}

impl GenesisReport {
    pub fn new(message: &str, block: &GenesisBlock) -> Result<Self> {
        let header = &block.header;
        let txid = block.coinbase.txid()?;
        Ok(Self {
            message: message.to_string(),
            version: header.version,
            time: header.time,
            bits: format!("0x{:08x}", header.bits),
            nonce: header.nonce,
            reward: block.coinbase.output.value,
            block_hash: header.hash().to_hex(),
            merkle_root: header.merkle_root.to_hex(),
            coinbase_txid: txid.to_hex(),
            coinbase_txid_internal: txid.to_internal_hex(),
            coinbase_hex: hex::encode(block.coinbase.serialize()?),
            header_hex: header.to_hex(),
            script_sig: hex::encode(&block.coinbase.input.script_sig),
            script_pubkey: hex::encode(&block.coinbase.output.script_pubkey),
        })
    }

    /// Plain `key: value` lines
    pub fn to_text(&self) -> String {
        [
            format!("pszTimestamp: {}", self.message),
            format!("nVersion: {}", self.version),
            format!("nTime: {}", self.time),
            format!("nBits: {}", self.bits),
            format!("nNonce: {}", self.nonce),
            format!("genesis hash: {}", self.block_hash),
            format!("merkle root: {}", self.merkle_root),
            format!("coinbase txid: {}", self.coinbase_txid),
            format!("coinbase scriptSig: {}", self.script_sig),
            format!("coinbase scriptPubKey: {}", self.script_pubkey),
            format!("coinbase tx: {}", self.coinbase_hex),
            format!("header: {}", self.header_hex),
        ]
        .join("\n")
    }

    /// chainparams-style source lines for pinning the block in a node
    pub fn to_snippet(&self) -> String {
        let reward = if self.reward % COIN == 0 {
            format!("{} * COIN", self.reward / COIN)
        } else {
            self.reward.to_string()
        };
        let output_script = if self.script_pubkey == "51" {
            "CScript() << OP_TRUE".to_string()
        } else {
            format!("CScript(ParseHex(\"{}\"))", self.script_pubkey)
        };

        [
            format!("    const char* pszTimestamp = \"{}\";", escape_c_string(&self.message)),
            format!("    const CScript genesisOutputScript = {};", output_script),
            format!(
                "    genesis = CreateGenesisBlock(pszTimestamp, genesisOutputScript, {}, {}, {}, {}, {});",
                self.time, self.nonce, self.bits, self.version, reward
            ),
            "    consensus.hashGenesisBlock = genesis.GetHash();".to_string(),
            format!("    assert(consensus.hashGenesisBlock == uint256{{\"{}\"}});", self.block_hash),
            format!("    assert(genesis.hashMerkleRoot == uint256{{\"{}\"}});", self.merkle_root),
        ]
        .join("\n")
    }
}

/// Escape a message for a C++ string literal
fn escape_c_string(message: &str) -> String {
    message.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{Miner, ParallelMiner};
    use crate::error::GenesisError;

    fn regtest_params() -> GenesisParams {
        GenesisParams::new("regtest genesis", 1769169600, 0x207fffff, OutputScript::ConstantTrue)
    }

    #[test]
    fn test_template_fields() {
        let block = build_template(&regtest_params()).unwrap();
        assert!(block.is_genesis());
        assert_eq!(block.header.nonce, 0);
        assert_eq!(block.header.merkle_root, block.coinbase.txid().unwrap());
        assert_eq!(block.coinbase.output.value, 5_000_000_000);
        assert_eq!(block.coinbase.output.script_pubkey, vec![0x51]);
        assert!(hex::encode(&block.coinbase.input.script_sig).starts_with("04ffff001d0104"));
    }

    #[test]
    fn test_mine_regtest_is_deterministic() {
        let params = regtest_params();
        let first = mine_genesis(&params, &Miner::new()).unwrap();
        let second = mine_genesis(&params, &Miner::new()).unwrap();
        let parallel = mine_genesis(&params, &ParallelMiner::new(2)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, parallel);
        assert_eq!(
            GenesisReport::new(&params.message, &first).unwrap(),
            GenesisReport::new(&params.message, &second).unwrap()
        );
    }

    #[test]
    fn test_verify_genesis() {
        let params = regtest_params();
        let mined = mine_genesis(&params, &Miner::new()).unwrap();
        assert_eq!(verify_genesis(&params, mined.header.nonce).unwrap(), mined);

        let hard = GenesisParams { bits: 0x03000001, ..params };
        assert!(matches!(
            verify_genesis(&hard, 0),
            Err(GenesisError::AcceleratorContractViolation(_))
        ));
    }

    #[test]
    fn test_invalid_inputs_surface_immediately() {
        let bad_bits = GenesisParams { bits: 0x04923456, ..regtest_params() };
        assert!(matches!(
            mine_genesis(&bad_bits, &Miner::new()),
            Err(GenesisError::InvalidDifficulty { .. })
        ));

        let long_message = GenesisParams { message: "x".repeat(250), ..regtest_params() };
        assert!(matches!(
            mine_genesis(&long_message, &Miner::new()),
            Err(GenesisError::ScriptTooLongForCompactEncoding { field: "scriptSig", .. })
        ));

        let negative = GenesisParams { extra_nonce: -4, ..regtest_params() };
        assert_eq!(build_template(&negative), Err(GenesisError::UnsupportedNegative(-4)));
    }

    #[test]
    fn test_report_rendering() {
        let params = regtest_params();
        let block = mine_genesis(&params, &Miner::new()).unwrap();
        let report = GenesisReport::new(&params.message, &block).unwrap();

        assert_eq!(report.bits, "0x207fffff");
        assert_eq!(report.block_hash, block.hash().to_hex());
        assert_eq!(report.coinbase_txid, report.merkle_root);
        assert_eq!(report.header_hex.len(), 160);
        assert!(report.to_text().contains(&format!("nNonce: {}", block.header.nonce)));

        let snippet = report.to_snippet();
        assert!(snippet.contains("CScript() << OP_TRUE"));
        assert!(snippet.contains("0x207fffff, 1, 50 * COIN);"));

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["nonce"], block.header.nonce);
        assert_eq!(json["script_pubkey"], "51");
    }

    #[test]
    fn test_snippet_escapes_message() {
        let params = GenesisParams { message: r#"C:\new "era""#.to_string(), ..regtest_params() };
        let block = mine_genesis(&params, &Miner::new()).unwrap();
        let snippet = GenesisReport::new(&params.message, &block).unwrap().to_snippet();

        assert!(snippet.contains(r#"pszTimestamp = "C:\\new \"era\"";"#), "{}", snippet);
        assert_eq!(escape_c_string(r"a\b"), r"a\\b");
    }
}
