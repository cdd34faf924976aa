use crate::canonical;
use crate::crypto::{hash_to_hex, Sha256Hash};
use crate::error::ChainError;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

use super::validation::verify_links;

/// Maximum number of transactions waiting for the next block.
pub const PENDING_CAPACITY: usize = 3;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks.";

/// Proof stored on the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// A sealed block. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: f64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        timestamp: f64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        Block {
            index,
            timestamp,
            transactions,
            proof,
            previous_hash: previous_hash.into(),
        }
    }

    /// 1-based position in the chain.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Seconds since the Unix epoch, with sub-second precision.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn proof(&self) -> u64 {
        self.proof
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    /// SHA-256 over the canonical encoding of every field of the block.
    pub fn hash(&self) -> Sha256Hash {
        // Strings, integers, floats and sequences always map onto JSON values.
        canonical::digest(self).expect("block fields always serialize to JSON")
    }

    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash())
    }
}

/// Current wall-clock time as fractional Unix seconds.
pub fn current_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// The in-memory ledger: sealed blocks plus a small queue of pending
/// transactions.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a ledger holding only the genesis block.
    pub fn new() -> Self {
        Self::with_genesis_timestamp(current_timestamp())
    }

    /// Create a ledger whose genesis block carries the given timestamp.
    pub fn with_genesis_timestamp(timestamp: f64) -> Self {
        let genesis = Block::new(
            1,
            timestamp,
            Vec::new(),
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH,
        );
        Blockchain {
            blocks: vec![genesis],
            pending: Vec::with_capacity(PENDING_CAPACITY),
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block exists from construction.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last_block(&self) -> &Block {
        // `blocks` starts with the genesis block and is append-only.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn pending_capacity(&self) -> usize {
        PENDING_CAPACITY
    }

    pub fn is_pending_full(&self) -> bool {
        self.pending.len() >= PENDING_CAPACITY
    }

    /// Queue a transaction for the next block.
    ///
    /// Returns the transaction's 1-based position in the queue, or `None`
    /// without touching the queue when it already holds
    /// [`PENDING_CAPACITY`] transactions.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> Option<usize> {
        if self.is_pending_full() {
            tracing::debug!(capacity = PENDING_CAPACITY, "pending queue full");
            return None;
        }
        self.pending.push(Transaction::new(sender, recipient, amount));
        let position = self.pending.len();
        tracing::debug!(position, "transaction queued");
        Some(position)
    }

    /// Seal the pending transactions into a new block stamped with the current time.
    ///
    /// `proof` is stored as given. When `previous_hash` is `None` or empty it
    /// is computed from the current last block.
    pub fn seal_block(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        self.seal_block_at(proof, previous_hash, current_timestamp())
    }

    /// [`seal_block`](Self::seal_block) with an explicit timestamp.
    pub fn seal_block_at(
        &mut self,
        proof: u64,
        previous_hash: Option<String>,
        timestamp: f64,
    ) -> Block {
        let previous_hash = match previous_hash.filter(|hash| !hash.is_empty()) {
            Some(hash) => hash,
            None => self.last_block().hash_hex(),
        };

        let block = Block::new(
            self.blocks.len() as u64 + 1,
            timestamp,
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );
        self.blocks.push(block.clone());

        tracing::debug!(
            index = block.index(),
            transactions = block.transactions().len(),
            proof,
            "block sealed"
        );
        block
    }

    /// Lowercase hex SHA-256 of any block, sealed or not.
    pub fn hash(block: &Block) -> String {
        block.hash_hex()
    }

    /// Check that every block points at the hash of its predecessor.
    pub fn verify_links(&self) -> Result<(), ChainError> {
        verify_links(&self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::to_canonical_string;

    const GENESIS_TS: f64 = 1700000000.5;
    const GENESIS_HASH: &str = "c38120edd4e37dc049ed1ee02874234171b625ca50a2ecdf2a550651daad7701";

    #[test]
    fn test_new_chain_has_only_genesis() {
        let chain = Blockchain::new();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
        assert!(chain.pending().is_empty());

        let genesis = chain.last_block();
        assert_eq!(genesis.index(), 1);
        assert_eq!(genesis.previous_hash(), GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.proof(), 100);
        assert!(genesis.transactions().is_empty());
        assert!(genesis.timestamp() > 0.0);
    }

    #[test]
    fn test_pending_capacity() {
        let mut chain = Blockchain::new();
        assert_eq!(chain.submit_transaction("a", "b", 1.0), Some(1));
        assert_eq!(chain.submit_transaction("a", "b", 2.0), Some(2));
        assert_eq!(chain.submit_transaction("a", "b", 3.0), Some(3));
        assert!(chain.is_pending_full());

        assert_eq!(chain.submit_transaction("a", "b", 4.0), None);
        assert_eq!(chain.pending().len(), 3);
        assert_eq!(chain.pending()[2].amount(), 3.0);
    }

    #[test]
    fn test_seal_links_to_previous_block() {
        let mut chain = Blockchain::new();
        chain.submit_transaction("a", "b", 1.0);
        let previous = chain.last_block().clone();

        let block = chain.seal_block(1234, None);
        assert_eq!(chain.len(), 2);
        assert!(chain.pending().is_empty());
        assert_eq!(block.index(), 2);
        assert_eq!(block.proof(), 1234);
        assert_eq!(block.previous_hash(), Blockchain::hash(&previous));
        assert_eq!(chain.last_block(), &block);
    }

    #[test]
    fn test_seal_preserves_submission_order() {
        let mut chain = Blockchain::new();
        chain.submit_transaction("first", "x", 1.0);
        chain.submit_transaction("second", "x", 2.0);
        chain.submit_transaction("third", "x", 3.0);

        let block = chain.seal_block(1, None);
        let senders: Vec<&str> = block.transactions().iter().map(|t| t.sender()).collect();
        assert_eq!(senders, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_seal_empty_pending_is_allowed() {
        let mut chain = Blockchain::new();
        let block = chain.seal_block(5, None);
        assert!(block.transactions().is_empty());
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_explicit_previous_hash_is_used() {
        let mut chain = Blockchain::new();
        let block = chain.seal_block(5, Some("deadbeef".to_string()));
        assert_eq!(block.previous_hash(), "deadbeef");
    }

    #[test]
    fn test_empty_previous_hash_falls_back_to_computed() {
        let mut chain = Blockchain::new();
        let expected = chain.last_block().hash_hex();
        let block = chain.seal_block(5, Some(String::new()));
        assert_eq!(block.previous_hash(), expected);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let txs = vec![Transaction::new("A", "B", 1.0)];
        let a = Block::new(2, 1.25, txs.clone(), 7, "prev");
        let b = Block::new(2, 1.25, txs, 7, "prev");
        assert_eq!(Blockchain::hash(&a), Blockchain::hash(&b));
        assert_eq!(a.hash_hex().len(), 64);
    }

    #[test]
    fn test_hash_changes_with_any_field() {
        let base = Block::new(2, 1.25, vec![Transaction::new("A", "B", 1.0)], 7, "prev");
        let variants = [
            Block::new(3, 1.25, vec![Transaction::new("A", "B", 1.0)], 7, "prev"),
            Block::new(2, 1.5, vec![Transaction::new("A", "B", 1.0)], 7, "prev"),
            Block::new(2, 1.25, vec![Transaction::new("A", "B", 1.1)], 7, "prev"),
            Block::new(2, 1.25, vec![Transaction::new("A", "C", 1.0)], 7, "prev"),
            Block::new(2, 1.25, vec![Transaction::new("A", "B", 1.0)], 8, "prev"),
            Block::new(2, 1.25, vec![Transaction::new("A", "B", 1.0)], 7, "prev2"),
            Block::new(2, 1.25, vec![], 7, "prev"),
        ];
        for variant in &variants {
            assert_ne!(base.hash(), variant.hash(), "{:?}", variant);
        }
    }

    #[test]
    fn test_genesis_canonical_vector() {
        let chain = Blockchain::with_genesis_timestamp(GENESIS_TS);
        let genesis = chain.last_block();
        assert_eq!(
            to_canonical_string(genesis).unwrap(),
            r#"{"index": 1, "previous_hash": "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks.", "proof": 100, "timestamp": 1700000000.5, "transactions": []}"#
        );
        assert_eq!(genesis.hash_hex(), GENESIS_HASH);
    }

    #[test]
    fn test_sealed_block_vector() {
        let mut chain = Blockchain::with_genesis_timestamp(GENESIS_TS);
        chain.submit_transaction("A", "B", 1.0);
        chain.submit_transaction("C", "D", 2.0);
        let block = chain.seal_block_at(4242, None, 1700000060.25);

        assert_eq!(block.previous_hash(), GENESIS_HASH);
        assert_eq!(
            block.hash_hex(),
            "cfe7476dd92cf2dcbec86ca491d144634f8d194d63509e7d5d26b4f2df7f07df"
        );

        let tampered = Block::new(
            2,
            1700000060.25,
            vec![Transaction::new("A", "B", 1.5), Transaction::new("C", "D", 2.0)],
            4242,
            GENESIS_HASH,
        );
        assert_eq!(
            tampered.hash_hex(),
            "5a27919620d36986245d12c10989b2eaa910517dd217ddbcc197dd3d661b54b0"
        );
    }

    #[test]
    fn test_hash_vector_with_seventeen_digit_ties() {
        let mut chain = Blockchain::with_genesis_timestamp(GENESIS_TS);
        chain.submit_transaction("A", "B", 108470213473.640625);
        let block = chain.seal_block_at(4242, None, 1813803036.73828125);

        assert_eq!(
            to_canonical_string(&block).unwrap(),
            format!(
                r#"{{"index": 2, "previous_hash": "{}", "proof": 4242, "timestamp": 1813803036.7382812, "transactions": [{{"amount": 108470213473.64062, "recipient": "B", "sender": "A"}}]}}"#,
                GENESIS_HASH
            )
        );
        assert_eq!(
            block.hash_hex(),
            "fd010943f7e66bcab513f8b7804cae327532059b74f79fc5e36899bc219ea678"
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut chain = Blockchain::new();
        let genesis_hash = Blockchain::hash(chain.last_block());

        assert_eq!(chain.submit_transaction("A", "B", 1.0), Some(1));
        assert_eq!(chain.submit_transaction("C", "D", 2.0), Some(2));
        let block = chain.seal_block(4242, None);

        assert_eq!(block.index(), 2);
        assert_eq!(
            block.transactions(),
            &[Transaction::new("A", "B", 1.0), Transaction::new("C", "D", 2.0)]
        );
        assert_eq!(block.previous_hash(), genesis_hash);
        assert!(chain.pending().is_empty());

        assert_eq!(chain.submit_transaction("E", "F", 3.0), Some(1));
        assert_eq!(chain.submit_transaction("G", "H", 4.0), Some(2));
        assert_eq!(chain.submit_transaction("I", "J", 5.0), Some(3));
        assert_eq!(chain.submit_transaction("K", "L", 6.0), None);
        assert!(chain.verify_links().is_ok());
    }
}
