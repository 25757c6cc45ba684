//! Abstraction layer over the node internals this server reads and drives.
//!
//! The RPC layer holds long-lived shared references to the chain core, the
//! peer stack and the sync tracker, but only ever talks to them through the
//! narrow traits below. Implementations must be safe for concurrent reads;
//! the mutating submission path is expected to serialize internally.

use async_trait::async_trait;
use fp_types::{
    BlockHeader, BlockTemplate, ChainStats, Hash, PeerStats, PoolChanges, RandomOuts, RawSyncBlock, SyncBlock,
    SyncFeed, SyncStart, Transaction, TransactionsStatus,
};

/// Failure of the chain core itself (storage layer, inconsistent state).
/// Never used for absent entities, which read as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("inconsistent chain state: {0}")]
    Inconsistent(String),
}

/// Rejection or failure of a submission command.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The core looked at the payload and said no. The reason is surfaced
    /// verbatim to the client.
    #[error("rejected: {reason}")]
    Rejected { reason: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubmitError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }
}

/// Read-only view of validated chain state and the transaction pool.
pub trait ChainReader: Send + Sync {
    fn stats(&self) -> Result<ChainStats, CoreError>;

    /// Height of the top block. The chain always has at least the genesis
    /// block, so this is total block count minus one.
    fn chain_height(&self) -> Result<u64, CoreError>;

    fn block_hash_at(&self, height: u64) -> Result<Option<Hash>, CoreError>;

    fn block_header_by_hash(&self, hash: &Hash) -> Result<Option<BlockHeader>, CoreError>;

    fn block_header_at(&self, height: u64) -> Result<Option<BlockHeader>, CoreError>;

    fn top_block_header(&self) -> Result<BlockHeader, CoreError>;

    /// Non-coinbase transactions of the given block, in block order.
    fn block_transactions(&self, hash: &Hash) -> Result<Vec<Transaction>, CoreError>;

    fn raw_block_by_hash(&self, hash: &Hash) -> Result<Option<Vec<u8>>, CoreError>;

    fn raw_block_at(&self, height: u64) -> Result<Option<Vec<u8>>, CoreError>;

    /// A mined or pooled transaction, plus the height of the including
    /// block when mined.
    fn transaction_by_hash(&self, hash: &Hash) -> Result<Option<(Transaction, Option<u64>)>, CoreError>;

    fn raw_transaction_by_hash(&self, hash: &Hash) -> Result<Option<Vec<u8>>, CoreError>;

    fn pool_transactions(&self) -> Result<Vec<Transaction>, CoreError>;

    fn raw_pool_transactions(&self) -> Result<Vec<Vec<u8>>, CoreError>;

    /// Diff the pool against a client's last-seen view. `tail` is the top
    /// block hash the client last observed; a reorg past it marks the view
    /// stale.
    fn pool_changes(&self, tail: &Hash, known: &[Hash]) -> Result<PoolChanges, CoreError>;

    fn transactions_status(&self, hashes: &[Hash]) -> Result<TransactionsStatus, CoreError>;

    /// Ring member candidates for each requested amount.
    fn random_outputs(&self, amounts: &[u64], count: u64) -> Result<Vec<RandomOuts>, CoreError>;

    /// Global output indexes of one transaction's outputs, in output order.
    fn transaction_global_indexes(&self, hash: &Hash) -> Result<Option<Vec<u64>>, CoreError>;

    /// Bounded wallet synchronization feed from the given start point.
    /// `None` when no checkpoint matches the chain.
    fn wallet_sync_data(
        &self,
        start: &SyncStart,
        limit: u64,
        skip_coinbase: bool,
    ) -> Result<Option<SyncFeed<SyncBlock>>, CoreError>;

    /// Binary counterpart of [`ChainReader::wallet_sync_data`].
    fn raw_sync_data(&self, start: &SyncStart, limit: u64) -> Result<Option<SyncFeed<RawSyncBlock>>, CoreError>;
}

/// The node's acceptance paths. These mutate shared state and are the only
/// commands this server issues.
#[async_trait]
pub trait SubmitProvider: Send + Sync {
    /// Hand a decoded transaction blob to the pool. Returns the transaction
    /// hash on acceptance.
    async fn submit_transaction(&self, blob: Vec<u8>) -> Result<Hash, SubmitError>;

    /// Hand a mined block blob to the chain. Returns the block hash on
    /// acceptance.
    async fn submit_block(&self, blob: Vec<u8>) -> Result<Hash, SubmitError>;

    /// Assemble a minable block template paying out to `address`, with
    /// `reserve_size` bytes reserved in the coinbase extra for the miner.
    async fn block_template(&self, address: &str, reserve_size: usize) -> Result<BlockTemplate, SubmitError>;
}

/// Read-only view of the peer stack.
pub trait PeerTable: Send + Sync {
    fn peer_stats(&self) -> PeerStats;
}

/// Whether this node has caught up with the network.
pub trait SyncState: Send + Sync {
    fn is_synchronized(&self) -> bool;

    /// Best chain height observed on the network.
    fn network_height(&self) -> u64;

    /// Unix timestamp of node startup.
    fn start_time(&self) -> u64;
}
