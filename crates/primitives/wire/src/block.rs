use crate::hex;
use crate::transaction::{WireTransaction, WireTransactionSummary};
use fp_types::{BlockHeader, Hash, RawSyncBlock, SyncBlock};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Canonical block header field set, shared by the top/by-hash/by-height
/// header endpoints and embedded in block listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBlockHeader {
    pub hash: Hash,
    pub prev_hash: Hash,
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

impl WireBlockHeader {
    pub fn new(header: &BlockHeader) -> Self {
        Self {
            hash: header.hash,
            prev_hash: header.previous_hash,
            height: header.height,
            timestamp: header.timestamp,
            nonce: header.nonce,
            major_version: header.major_version,
            minor_version: header.minor_version,
            difficulty: header.difficulty,
            reward: header.reward,
            transaction_count: header.transaction_count,
            size: header.size,
            already_generated_coins: header.already_generated_coins,
        }
    }
}

/// A block-explorer page entry: the header fields plus per-transaction
/// summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBlockSummary {
    #[serde(flatten)]
    pub header: WireBlockHeader,
    /// Aggregate fee carried by the block's transactions, corroborating the
    /// miner-claimed reward.
    pub total_fee_amount: u64,
    pub transactions: Vec<WireTransactionSummary>,
}

impl WireBlockSummary {
    pub fn new(header: &BlockHeader, total_fee_amount: u64, transactions: Vec<WireTransactionSummary>) -> Self {
        Self { header: WireBlockHeader::new(header), total_fee_amount, transactions }
    }
}

/// One block of the wallet synchronization feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSyncBlock {
    pub hash: Hash,
    pub height: u64,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub coinbase_transaction: Option<WireTransaction>,
    pub transactions: Vec<WireTransaction>,
}

impl WireSyncBlock {
    pub fn new(block: &SyncBlock) -> Self {
        Self {
            hash: block.hash,
            height: block.height,
            timestamp: block.timestamp,
            coinbase_transaction: block
                .coinbase_transaction
                .as_ref()
                .map(|tx| WireTransaction::new(tx, Some(block.height))),
            transactions: block.transactions.iter().map(|tx| WireTransaction::new(tx, Some(block.height))).collect(),
        }
    }
}

/// One block of the raw synchronization feed: hex blobs, not decoded JSON.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRawSyncBlock {
    #[serde_as(as = "hex::BytesAsHex")]
    pub block: Vec<u8>,
    #[serde_as(as = "Vec<hex::BytesAsHex>")]
    pub transactions: Vec<Vec<u8>>,
}

impl WireRawSyncBlock {
    pub fn new(block: &RawSyncBlock) -> Self {
        Self { block: block.block.clone(), transactions: block.transactions.clone() }
    }
}

/// The tip marker returned alongside a fully-synced feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTopBlock {
    pub hash: Hash,
    pub height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            hash: "12".repeat(32).parse().unwrap(),
            previous_hash: "34".repeat(32).parse().unwrap(),
            height: 100_000,
            timestamp: 1_600_000_000,
            nonce: 0xdead_beef,
            major_version: 5,
            minor_version: 0,
            difficulty: 312_034,
            reward: 29_656_000_000,
            transaction_count: 3,
            size: 12_345,
            already_generated_coins: 9_000_000_000_000,
        }
    }

    #[test]
    fn header_round_trips_through_json() {
        let wire = WireBlockHeader::new(&sample_header());
        let json = serde_json::to_string(&wire).unwrap();
        let back: WireBlockHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn header_uses_camel_case_keys() {
        let json = serde_json::to_value(WireBlockHeader::new(&sample_header())).unwrap();
        assert!(json.get("prevHash").is_some());
        assert!(json.get("transactionCount").is_some());
        assert!(json.get("alreadyGeneratedCoins").is_some());
        assert!(json.get("previous_hash").is_none());
    }

    #[test]
    fn summary_flattens_header_fields() {
        let summary = WireBlockSummary::new(&sample_header(), 250, vec![]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["height"], 100_000);
        assert_eq!(json["totalFeeAmount"], 250);
        assert!(json["transactions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn raw_sync_block_is_hex_encoded() {
        let raw = RawSyncBlock { block: vec![0xab, 0xcd], transactions: vec![vec![0x01], vec![0x02, 0x03]] };
        let json = serde_json::to_value(WireRawSyncBlock::new(&raw)).unwrap();
        assert_eq!(json["block"], "abcd");
        assert_eq!(json["transactions"][1], "0203");
    }
}
