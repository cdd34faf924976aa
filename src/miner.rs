//! The simplified "mine" action.
//!
//! Mining here is a stand-in for real work: the proof is a random number
//! drawn from a configured range and stored on the block as-is. Nothing checks
//! it against a target.

use crate::blockchain::{Block, Blockchain};
use crate::error::{ChainError, Result};
use rand::Rng;
use std::ops::RangeInclusive;

/// Draw a proof uniformly from `range`.
pub fn random_proof<R: Rng>(rng: &mut R, range: RangeInclusive<u64>) -> u64 {
    rng.gen_range(range)
}

/// Seal the pending transactions under a random proof.
///
/// Refuses with [`ChainError::NothingToMine`] when nothing is pending; the
/// ledger itself would happily seal an empty block.
pub fn mine_pending<R: Rng>(
    chain: &mut Blockchain,
    rng: &mut R,
    range: RangeInclusive<u64>,
) -> Result<Block> {
    if chain.pending().is_empty() {
        return Err(ChainError::NothingToMine);
    }
    let proof = random_proof(rng, range);
    let block = chain.seal_block(proof, None);
    tracing::info!(index = block.index(), proof, "mined block");
    Ok(block)
}
