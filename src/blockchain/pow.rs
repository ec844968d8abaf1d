use std::sync::atomic::{AtomicBool, Ordering};

use super::block::{hash_block, meets_difficulty};
use crate::bet::Bet;

/// How many nonces are tried between two checks of the abort flag.
const ABORT_CHECK_INTERVAL: u64 = 1024;

/// Snapshot of the chain tip and pending bets a new block is mined against.
#[derive(Debug, Clone)]
pub struct MiningTemplate {
    pub index: u64,
    pub previous_hash: String,
    pub bets: Vec<Bet>,
    pub block_data: String,
}

/// A nonce and the hash it produces for a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub nonce: u64,
    pub hash: String,
}

impl MiningTemplate {
    /// Search for the smallest nonce meeting `difficulty`. Blocks the caller
    /// and gives up once `abort` is set.
    pub fn solve(&self, difficulty: usize, abort: &AtomicBool) -> Option<Proof> {
        let nonce = find_nonce(&self.previous_hash, &self.block_data, difficulty, abort)?;
        Some(Proof {
            nonce,
            hash: hash_block(&self.previous_hash, &self.block_data, nonce),
        })
    }
}

/// Try nonces `0, 1, 2, ...` and return the first whose hash starts with
/// `difficulty` zero characters, or `None` as soon as `abort` is observed set.
pub fn find_nonce(
    previous_hash: &str,
    block_data: &str,
    difficulty: usize,
    abort: &AtomicBool,
) -> Option<u64> {
    for nonce in 0..=u64::MAX {
        if nonce % ABORT_CHECK_INTERVAL == 0 && abort.load(Ordering::Relaxed) {
            return None;
        }
        if meets_difficulty(&hash_block(previous_hash, block_data, nonce), difficulty) {
            return Some(nonce);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::block::encode_block_data;
    use crate::blockchain::testing::bet;

    #[test]
    fn returns_smallest_satisfying_nonce() {
        let data = encode_block_data(2, &[bet("alice", "m1", 2, 1)]);
        let nonce = find_nonce("0", &data, 2, &AtomicBool::new(false)).unwrap();
        assert!(meets_difficulty(&hash_block("0", &data, nonce), 2));
        for smaller in 0..nonce {
            assert!(!meets_difficulty(&hash_block("0", &data, smaller), 2));
        }
    }

    #[test]
    fn search_is_deterministic() {
        let data = encode_block_data(3, &[bet("bob", "m2", 1, 4)]);
        let never = AtomicBool::new(false);
        assert_eq!(find_nonce("prev", &data, 2, &never), find_nonce("prev", &data, 2, &never));
    }

    #[test]
    fn zero_difficulty_accepts_first_nonce() {
        assert_eq!(find_nonce("0", "data", 0, &AtomicBool::new(false)), Some(0));
    }

    #[test]
    fn abort_flag_stops_search() {
        let abort = AtomicBool::new(true);
        // Unreachable difficulty: only the abort flag can end this search.
        assert_eq!(find_nonce("0", "data", 64, &abort), None);
    }

    #[test]
    fn abort_from_another_thread_ends_search() {
        let template = MiningTemplate {
            index: 2,
            previous_hash: "0".into(),
            bets: vec![],
            block_data: encode_block_data(2, &[]),
        };
        let abort = std::sync::Arc::new(AtomicBool::new(false));
        let flag = std::sync::Arc::clone(&abort);
        let search = std::thread::spawn(move || template.solve(64, &flag));

        std::thread::sleep(std::time::Duration::from_millis(50));
        abort.store(true, Ordering::Relaxed);
        assert_eq!(search.join().unwrap(), None);
    }

    #[test]
    fn solved_template_hash_matches_nonce() {
        let template = MiningTemplate {
            index: 2,
            previous_hash: "0".into(),
            bets: vec![bet("alice", "m1", 2, 1)],
            block_data: encode_block_data(2, &[bet("alice", "m1", 2, 1)]),
        };
        let proof = template.solve(1, &AtomicBool::new(false)).unwrap();
        assert_eq!(
            proof.hash,
            hash_block(&template.previous_hash, &template.block_data, proof.nonce)
        );
        assert!(proof.hash.starts_with('0'));
    }
}
