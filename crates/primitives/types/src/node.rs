use crate::hash::Hash;

/// Snapshot of chain-side counters backing the /info endpoint.
#[derive(Debug, Clone, Default)]
pub struct ChainStats {
    pub height: u64,
    pub top_block_hash: Hash,
    pub difficulty: u64,
    pub cumulative_transaction_count: u64,
    pub pool_size: u64,
    pub alternate_block_count: u64,
    pub major_version: u8,
}

/// Snapshot of the peer table backing /info and /peers.
#[derive(Debug, Clone, Default)]
pub struct PeerStats {
    pub grey_peers: Vec<String>,
    pub white_peers: Vec<String>,
    pub incoming_connection_count: u64,
    pub outgoing_connection_count: u64,
}
