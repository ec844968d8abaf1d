pub mod block;
pub mod consensus;
pub mod model;
pub mod pow;
pub mod validate;

pub use block::Block;
pub use model::{AppendOutcome, Blockchain};

/// Proof-of-Work difficulty: number of leading `'0'` characters required
/// in a block hash. Fixed for the whole network.
pub const DIFFICULTY: usize = 3;

/// Nonce stored in the genesis block.
pub const GENESIS_NONCE: u64 = 100;

/// Hash and previous hash of the genesis block.
pub const GENESIS_HASH: &str = "0";
