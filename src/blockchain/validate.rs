use super::block::{Block, encode_block_data, hash_block, meets_difficulty};

/// Verify a full chain received from anywhere.
///
/// For every block after genesis the proof is recomputed from the
/// predecessor's stored hash, the expected index and the block's bets and
/// nonce, and must meet `difficulty`; `previous_block_hash` must equal the
/// predecessor's stored hash. Finally the genesis values are checked.
///
/// The stored `hash` of a block is not compared with the recomputed one,
/// and the stored `index` is not checked: both act as opaque values here.
/// `Blockchain::try_append` checks the index for single pushed blocks.
pub fn is_chain_valid(chain: &[Block], difficulty: usize) -> bool {
    let Some(genesis) = chain.first() else {
        return false;
    };

    for pair in chain.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);

        let block_data = encode_block_data(prev.index.wrapping_add(1), &current.bets);
        let hash = hash_block(&prev.hash, &block_data, current.nonce);
        if !meets_difficulty(&hash, difficulty) {
            return false;
        }

        if current.previous_block_hash != prev.hash {
            return false;
        }
    }

    genesis.is_genesis()
}
