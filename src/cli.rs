// CLI commands

use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::consensus::pow::DEFAULT_PROGRESS_INTERVAL;
use crate::consensus::{ExternalGrinder, Miner, ParallelMiner, ProofOfWorkSearch, Target};
use crate::core::script::{GENESIS_EXTRA_NONCE, GENESIS_SCRIPT_BITS};
use crate::core::OutputScript;
use crate::genesis::{self, COIN, GenesisParams, GenesisReport};

#[derive(Parser)]
#[command(name = "bng-genesis")]
#[command(about = "Reproducible genesis block generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the coinbase and grind a nonce for the genesis header
    Generate {
        #[command(flatten)]
        genesis: GenesisArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also print chainparams source lines
        #[arg(long)]
        snippet: bool,
    },

    /// Rebuild the genesis block with a known nonce and check its proof-of-work
    Verify {
        #[command(flatten)]
        genesis: GenesisArgs,

        #[arg(long)]
        nonce: u32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode compact difficulty bits
    Target {
        /// Compact bits, hex (0x1d00ffff) or decimal
        #[arg(value_parser = parse_u32)]
        bits: u32,
    },
}

/// Network presets for the default message, time and bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Mainnet,
    Testnet,
    Testnet4,
    Signet,
}

impl Network {
    /// (message, time, bits)
    pub fn defaults(self) -> (&'static str, u32, u32) {
        match self {
            Network::Mainnet => ("Bitcoin-NG 22/Jan/2026 Network Identity genesis", 1769040000, 0x1d00ffff),
            Network::Testnet => ("Bitcoin-NG testnet 22/Jan/2026 Network Identity genesis", 1769083200, 0x1d00ffff),
            Network::Testnet4 => ("Bitcoin-NG testnet4 22/Jan/2026 Network Identity genesis", 1769083201, 0x1d00ffff),
            Network::Signet => ("Bitcoin-NG signet 22/Jan/2026 Network Identity genesis", 1769083202, 0x1e0377ae),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenesisArgs {
    #[arg(long, value_enum, default_value = "mainnet")]
    pub network: Network,

    /// Coinbase message (pszTimestamp)
    #[arg(long)]
    pub message: Option<String>,

    /// Header time, Unix epoch seconds
    #[arg(long)]
    pub time: Option<u32>,

    /// Header compact bits, hex (0x..) or decimal
    #[arg(long, value_parser = parse_u32)]
    pub bits: Option<u32>,

    /// Block and coinbase version
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub version: i32,

    /// Reward in whole coins
    #[arg(long, default_value_t = 50)]
    pub reward: u64,

    /// Reward in smallest units, overrides --reward
    #[arg(long)]
    pub reward_sats: Option<u64>,

    /// Raw output script as hex (default 51 = OP_TRUE)
    #[arg(long, conflicts_with = "pubkey")]
    pub script_pub_key: Option<String>,

    /// Pay the reward to this public key (hex) with OP_CHECKSIG
    #[arg(long)]
    pub pubkey: Option<String>,

    /// Number pushed first in the coinbase scriptSig
    #[arg(long, value_parser = parse_u32, default_value_t = GENESIS_SCRIPT_BITS)]
    pub script_bits: u32,

    /// Constant pushed after the scriptSig bits
    #[arg(long, default_value_t = GENESIS_EXTRA_NONCE)]
    pub extra_nonce: i64,

    /// First nonce to try
    #[arg(long, default_value_t = 0)]
    pub start_nonce: u32,
}

impl GenesisArgs {
    pub fn output_script(&self) -> anyhow::Result<OutputScript> {
        if let Some(pubkey) = &self.pubkey {
            let bytes = hex::decode(pubkey).context("--pubkey is not valid hex")?;
            secp256k1::PublicKey::from_slice(&bytes).context("--pubkey is not a secp256k1 public key")?;
            return Ok(OutputScript::PayToPubkey(bytes));
        }

        match self.script_pub_key.as_deref() {
            None | Some("51") => Ok(OutputScript::ConstantTrue),
            Some(script) => Ok(OutputScript::Raw(
                hex::decode(script).context("--script-pub-key is not valid hex")?,
            )),
        }
    }

    pub fn to_params(&self) -> anyhow::Result<GenesisParams> {
        let (message, time, bits) = self.network.defaults();
        let message = self.message.clone().unwrap_or_else(|| message.to_string());
        if message.len() > 75 {
            log::warn!("Message is {} bytes, pushed with OP_PUSHDATA1", message.len());
        }

        let reward = match self.reward_sats {
            Some(sats) => sats,
            None => self.reward.checked_mul(COIN).context("--reward overflows 64 bits")?,
        };

        Ok(GenesisParams {
            message,
            time: self.time.unwrap_or(time),
            bits: self.bits.unwrap_or(bits),
            version: self.version,
            reward,
            output_script: self.output_script()?,
            script_bits: self.script_bits,
            extra_nonce: self.extra_nonce,
            start_nonce: self.start_nonce,
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Mining threads, 0 = all cores, 1 = single-threaded reference search
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// External grinder command; the header hex is appended as the last argument
    #[arg(long)]
    pub accelerator: Option<String>,

    /// Stop the in-process search after this many seconds
    #[arg(long)]
    pub time_budget_secs: Option<u64>,

    /// Attempts between progress log lines
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: u64,
}

impl SearchArgs {
    pub fn backend(&self) -> anyhow::Result<Box<dyn ProofOfWorkSearch>> {
        if let Some(command) = &self.accelerator {
            return match ExternalGrinder::from_command_line(command) {
                Some(grinder) => Ok(Box::new(grinder)),
                None => bail!("--accelerator command is empty"),
            };
        }

        let budget = self.time_budget_secs.map(Duration::from_secs);
        if self.threads == 1 {
            let mut miner = Miner::new().with_progress_interval(self.progress_interval);
            if let Some(budget) = budget {
                miner = miner.with_time_budget(budget);
            }
            Ok(Box::new(miner))
        } else {
            let mut miner = ParallelMiner::new(self.threads).with_progress_interval(self.progress_interval);
            if let Some(budget) = budget {
                miner = miner.with_time_budget(budget);
            }
            Ok(Box::new(miner))
        }
    }
}

/// Parse `0x`-prefixed hex or decimal
pub fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {:?}: {}", s, e))
}

/// Handle CLI command
pub fn handle(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate { genesis, search, json, snippet } => {
            let params = genesis.to_params()?;
            let backend = search.backend()?;
            let block = genesis::mine_genesis(&params, backend.as_ref())
                .context("genesis generation failed")?;
            let report = GenesisReport::new(&params.message, &block)?;

            println!("network: {:?}", genesis.network);
            print_report(&report, json)?;
            if snippet && !json {
                println!("\nC++ snippet:");
                println!("{}", report.to_snippet());
            }
            Ok(())
        }
        Commands::Verify { genesis, nonce, json } => {
            let params = genesis.to_params()?;
            let block = genesis::verify_genesis(&params, nonce)
                .with_context(|| format!("nonce {} does not solve this genesis block", nonce))?;
            print_report(&GenesisReport::new(&params.message, &block)?, json)?;
            println!("✓ Proof of work valid");
            Ok(())
        }
        Commands::Target { bits } => {
            let target = Target::from_bits(bits)?;
            println!("bits: 0x{:08x}", bits);
            println!("normalized bits: 0x{:08x}", target.to_bits());
            println!("target: {}", target.to_hex());
            println!("leading zero bits: {}", target.leading_zeros());
            Ok(())
        }
    }
}

fn print_report(report: &GenesisReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.to_text());
    }
    Ok(())
}
