use log::{debug, info};

use super::Blockchain;
use super::validate::is_chain_valid;

/// What a consensus round did to the local chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusOutcome {
    Replaced { length: usize },
    Kept { length: usize },
}

impl ConsensusOutcome {
    pub fn replaced(&self) -> bool {
        matches!(self, ConsensusOutcome::Replaced { .. })
    }

    pub fn length(&self) -> usize {
        match self {
            ConsensusOutcome::Replaced { length } | ConsensusOutcome::Kept { length } => *length,
        }
    }
}

/// Pick the longest snapshot whose chain validates at `difficulty`.
/// On equal lengths the first one seen wins.
pub fn longest_valid(candidates: Vec<Blockchain>, difficulty: usize) -> Option<Blockchain> {
    let mut best: Option<Blockchain> = None;
    for candidate in candidates {
        if !is_chain_valid(&candidate.chain, difficulty) {
            debug!(
                "consensus - discarding invalid peer chain (length {})",
                candidate.chain.len()
            );
            continue;
        }
        if best.as_ref().is_none_or(|b| candidate.chain.len() > b.chain.len()) {
            best = Some(candidate);
        }
    }
    best
}

impl Blockchain {
    /// Adopt the chain and pending bets of the longest valid peer snapshot
    /// if it is strictly longer than ours. Known peers are kept.
    pub fn resolve(&mut self, candidates: Vec<Blockchain>) -> ConsensusOutcome {
        let local = self.chain.len();
        match longest_valid(candidates, self.difficulty()) {
            Some(winner) if winner.chain.len() > local => {
                info!(
                    "consensus - replacing local chain ({} blocks) with peer chain ({} blocks)",
                    local,
                    winner.chain.len()
                );
                self.chain = winner.chain;
                self.pending_bets = winner.pending_bets;
                ConsensusOutcome::Replaced {
                    length: self.chain.len(),
                }
            }
            _ => ConsensusOutcome::Kept { length: local },
        }
    }
}
