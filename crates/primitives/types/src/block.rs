use crate::hash::Hash;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Canonical block header fields as resolved against chain state. Reward,
/// difficulty and size are chain-derived rather than part of the block blob,
/// so this is the read-side shape, not the consensus encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: Hash,
    pub previous_hash: Hash,
    pub height: u64,
    pub timestamp: u64,
    pub nonce: u32,
    pub major_version: u8,
    pub minor_version: u8,
    pub difficulty: u64,
    pub reward: u64,
    pub transaction_count: u64,
    pub size: u64,
    pub already_generated_coins: u64,
}

/// One block of the wallet synchronization feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncBlock {
    pub hash: Hash,
    pub height: u64,
    pub timestamp: u64,
    /// Absent when the wallet asked to skip coinbase transactions.
    pub coinbase_transaction: Option<Transaction>,
    pub transactions: Vec<Transaction>,
}

/// One block of the raw (binary) synchronization feed. Blobs are the stored
/// consensus encodings, opaque to this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSyncBlock {
    pub block: Vec<u8>,
    pub transactions: Vec<Vec<u8>>,
}

/// Where a synchronizing client wants the feed to start: the newest-first
/// list of block hashes it already knows, optionally pinned by height or
/// timestamp.
#[derive(Debug, Clone, Default)]
pub struct SyncStart {
    pub checkpoints: Vec<Hash>,
    pub height: Option<u64>,
    pub timestamp: Option<u64>,
}

/// A bounded slice of the chain handed to a synchronizing client, plus
/// whether that slice reaches the current tip.
#[derive(Debug, Clone)]
pub struct SyncFeed<B> {
    pub blocks: Vec<B>,
    pub synced: bool,
    pub top_height: u64,
    pub top_hash: Hash,
}

/// A minable block template with a reserved region for the miner's extra
/// nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    pub blob: Vec<u8>,
    pub difficulty: u64,
    pub height: u64,
    pub reserved_offset: usize,
}
