use crate::error::ChainError;

use super::chain::Block;

/// Walk `blocks` and check positional indices and hash links.
///
/// Block `i` must carry index `i + 1`, and for `i > 0` its `previous_hash`
/// must equal the hash of block `i - 1`. Reports the first violation.
pub fn verify_links(blocks: &[Block]) -> Result<(), ChainError> {
    for (position, block) in blocks.iter().enumerate() {
        let expected_index = position as u64 + 1;
        if block.index() != expected_index {
            return Err(ChainError::InvalidBlockLinkage {
                index: expected_index,
                expected: format!("index {}", expected_index),
                found: format!("index {}", block.index()),
            });
        }
    }

    for pair in blocks.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        let expected = previous.hash_hex();
        if current.previous_hash() != expected {
            return Err(ChainError::InvalidBlockLinkage {
                index: current.index(),
                expected,
                found: current.previous_hash().to_string(),
            });
        }
    }
    Ok(())
}
