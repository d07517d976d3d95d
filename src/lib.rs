// Reproducible genesis block construction
// Coinbase + header codec, compact targets and nonce grinding

pub mod core;
pub mod consensus;
pub mod error;
pub mod genesis;
pub mod cli;

// Re-exports for convenience
pub use crate::core::{BlockHeader, CoinbaseTransaction, GenesisBlock, Hash256, OutputScript, Script, TxOutput};
pub use crate::consensus::{ExternalGrinder, Miner, MiningResult, ParallelMiner, ProofOfWorkSearch, Target};
pub use crate::error::{GenesisError, Result};
pub use crate::genesis::{GenesisParams, GenesisReport, build_template, mine_genesis, verify_genesis};
pub use crate::cli::{Cli, handle};
