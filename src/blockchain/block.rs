use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use super::{GENESIS_HASH, GENESIS_NONCE};
use crate::bet::Bet;

/// A single block in the chain holding an ordered batch of bets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // nanoseconds since the Unix epoch (UTC)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bets: Vec<Bet>,
    pub nonce: u64, // Proof-of-Work nonce
    pub hash: String,
    #[serde(rename = "previousblockhash")]
    pub previous_block_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        bets: Vec<Bet>,
        nonce: u64,
        hash: String,
        previous_block_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp: now_nanos(),
            bets,
            nonce,
            hash,
            previous_block_hash,
        }
    }

    /// Whether this block carries the fixed genesis values.
    pub fn is_genesis(&self) -> bool {
        self.nonce == GENESIS_NONCE
            && self.previous_block_hash == GENESIS_HASH
            && self.hash == GENESIS_HASH
            && self.bets.is_empty()
    }
}

/// Data committed to by the proof of work: the block position and its bets.
#[derive(Serialize)]
struct BlockData<'a> {
    #[serde(rename = "Index")]
    index: String,
    #[serde(rename = "Bets")]
    bets: &'a [Bet],
}

/// Canonical encoding of `{index, bets}` fed to [`hash_block`].
///
/// JSON with the index as a decimal string, then URL-safe base64. Both the
/// miner and every validator must produce the same bytes for the same
/// logical content.
pub fn encode_block_data(index: u64, bets: &[Bet]) -> String {
    let data = BlockData {
        index: index.to_string(),
        bets,
    };
    let json = serde_json::to_vec(&data).expect("serialize block data");
    URL_SAFE.encode(json)
}

/// SHA-256 of `previous_hash || block_data || nonce`, URL-safe base64 encoded.
pub fn hash_block(previous_hash: &str, block_data: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(block_data.as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    URL_SAFE.encode(hasher.finalize())
}

/// Whether `hash` starts with `difficulty` literal `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.starts_with(&"0".repeat(difficulty))
}

pub(crate) fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Peers may send `null` for an empty list.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
