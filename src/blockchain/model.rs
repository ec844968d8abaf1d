use std::fmt;

use serde::{Deserialize, Serialize};

use super::block::{Block, encode_block_data, null_as_empty};
use super::pow::{MiningTemplate, Proof};
use super::validate::is_chain_valid;
use super::{DIFFICULTY, GENESIS_HASH, GENESIS_NONCE};
use crate::bet::Bet;
use crate::error::ChainError;

/// In-memory ledger: the chain, bets waiting to be mined and known peers.
///
/// This is also the snapshot exchanged between nodes on `GET /blockchain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockchain {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub chain: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pending_bets: Vec<Bet>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub network_nodes: Vec<String>,
    #[serde(skip, default = "default_difficulty")]
    difficulty: usize,
}

fn default_difficulty() -> usize {
    DIFFICULTY
}

/// Result of offering a single peer block to the local chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Accepted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    PreviousHashMismatch { expected: String, found: String },
    IndexMismatch { expected: u64, found: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PreviousHashMismatch { expected, found } => {
                write!(f, "previous block hash {found} does not match tip {expected}")
            }
            RejectReason::IndexMismatch { expected, found } => {
                write!(f, "block index {found} does not follow tip (expected {expected})")
            }
        }
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Initialize a chain holding only the genesis block.
    pub fn new() -> Self {
        Self::with_difficulty(DIFFICULTY)
    }

    /// Same as [`new`](Self::new) with a custom Proof-of-Work difficulty.
    pub fn with_difficulty(difficulty: usize) -> Self {
        let mut bc = Self {
            chain: Vec::new(),
            pending_bets: Vec::new(),
            network_nodes: Vec::new(),
            difficulty,
        };
        bc.create_new_block(GENESIS_NONCE, GENESIS_HASH.into(), GENESIS_HASH.into());
        bc
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Queue a bet for a future block. Which block picks it up is only known
    /// once a mining run snapshots the pool.
    pub fn register_bet(&mut self, bet: Bet) {
        self.pending_bets.push(bet);
    }

    /// Add a peer URL. Returns `false` if it was already known.
    pub fn register_node(&mut self, url: &str) -> bool {
        if self.network_nodes.iter().any(|n| n == url) {
            return false;
        }
        self.network_nodes.push(url.to_string());
        true
    }

    /// Register every URL except `own_url`. Returns how many were new.
    pub fn register_nodes<'a>(
        &mut self,
        urls: impl IntoIterator<Item = &'a str>,
        own_url: &str,
    ) -> usize {
        urls.into_iter()
            .filter(|url| *url != own_url)
            .filter(|url| self.register_node(url))
            .count()
    }

    /// Package the pending bets into a new block with the given proof values,
    /// append it and empty the pending pool. Performs no validation.
    pub fn create_new_block(&mut self, nonce: u64, previous_hash: String, hash: String) -> Block {
        let block = Block::new(
            self.chain.len() as u64 + 1,
            std::mem::take(&mut self.pending_bets),
            nonce,
            hash,
            previous_hash,
        );
        self.chain.push(block.clone());
        block
    }

    /// Snapshot the tip and pending bets for an out-of-lock nonce search.
    pub fn mining_template(&self) -> MiningTemplate {
        let last = self.last_block();
        let index = last.index + 1;
        MiningTemplate {
            index,
            previous_hash: last.hash.clone(),
            bets: self.pending_bets.clone(),
            block_data: encode_block_data(index, &self.pending_bets),
        }
    }

    /// Append the block proven for `template`, provided the chain did not
    /// move meanwhile. Bets queued after the snapshot stay pending.
    pub fn seal_block(&mut self, template: &MiningTemplate, proof: Proof) -> Result<Block, ChainError> {
        let last = self.last_block();
        if last.hash != template.previous_hash || last.index + 1 != template.index {
            return Err(ChainError::StaleTip {
                expected: template.previous_hash.clone(),
                found: last.hash.clone(),
            });
        }
        if !self.pending_bets.starts_with(&template.bets) {
            return Err(ChainError::StalePendingPool);
        }

        let late = self.pending_bets.split_off(template.bets.len());
        let block = self.create_new_block(proof.nonce, template.previous_hash.clone(), proof.hash);
        self.pending_bets = late;
        Ok(block)
    }

    /// Accept a block pushed by a peer if it links onto the current tip.
    pub fn try_append(&mut self, block: Block) -> AppendOutcome {
        let tip = self.last_block();
        if block.previous_block_hash != tip.hash {
            return AppendOutcome::Rejected(RejectReason::PreviousHashMismatch {
                expected: tip.hash.clone(),
                found: block.previous_block_hash,
            });
        }
        if tip.index.checked_add(1) != Some(block.index) {
            return AppendOutcome::Rejected(RejectReason::IndexMismatch {
                expected: tip.index.saturating_add(1),
                found: block.index,
            });
        }

        self.pending_bets.clear();
        self.chain.push(block);
        AppendOutcome::Accepted
    }

    /// Validate the whole chain: proof of work, linkage and genesis.
    pub fn is_valid_chain(&self) -> bool {
        is_chain_valid(&self.chain, self.difficulty)
    }

    /// All mined bets for a match, compared case-insensitively.
    pub fn bets_for_match(&self, match_id: &str) -> Vec<Bet> {
        let wanted = match_id.to_lowercase();
        self.mined_bets()
            .filter(|b| b.match_id.to_lowercase() == wanted)
            .cloned()
            .collect()
    }

    /// All mined bets placed by a player, compared case-insensitively.
    pub fn bets_for_player(&self, player_name: &str) -> Vec<Bet> {
        let wanted = player_name.to_lowercase();
        self.mined_bets()
            .filter(|b| b.player_name.to_lowercase() == wanted)
            .cloned()
            .collect()
    }

    fn mined_bets(&self) -> impl Iterator<Item = &Bet> {
        self.chain.iter().flat_map(|block| block.bets.iter())
    }
}
