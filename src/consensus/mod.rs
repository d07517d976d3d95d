// Difficulty targets and proof-of-work search

pub mod external;
pub mod pow;
pub mod target;

pub use external::ExternalGrinder;
pub use pow::{Miner, MiningResult, ParallelMiner, ProgressFn, ProofOfWorkSearch, verify_solution};
pub use target::{Target, normalize_bits};
