//! In-memory collaborators and request builders for the crate's tests.

use crate::providers::{ChainReader, CoreError, PeerTable, SubmitError, SubmitProvider, SyncState};
use crate::routes::RpcMode;
use crate::{RpcContext, ServerConfig};
use async_trait::async_trait;
use bytes::Bytes;
use fp_types::{
    BlockHeader, BlockTemplate, ChainStats, Hash, KeyImage, OutputEntry, PeerStats, PoolChanges, PublicKey,
    RandomOuts, RawSyncBlock, SyncBlock, SyncFeed, SyncStart, Transaction, TransactionInput, TransactionOutput,
    TransactionPrefix, TransactionsStatus,
};
use http_body_util::Full;
use hyper::{Method, Request};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) fn hash(seed: u8) -> Hash {
    Hash([seed; 32])
}

pub(crate) fn sample_tx(seed: u8, input_amount: u64, output_amount: u64) -> Transaction {
    Transaction {
        hash: hash(seed),
        prefix: TransactionPrefix {
            version: 1,
            unlock_time: 0,
            inputs: vec![TransactionInput::Key {
                amount: input_amount,
                key_offsets: vec![1, 2, 5],
                key_image: KeyImage([seed; 32]),
            }],
            outputs: vec![TransactionOutput { amount: output_amount, key: PublicKey([seed; 32]) }],
            extra: vec![seed],
        },
        size: 300 + seed as u64,
    }
}

fn coinbase_tx(height: u64, reward: u64) -> Transaction {
    Transaction {
        hash: Hash([0xc0 | height as u8; 32]),
        prefix: TransactionPrefix {
            version: 1,
            unlock_time: height + 10,
            inputs: vec![TransactionInput::Coinbase { height }],
            outputs: vec![TransactionOutput { amount: reward, key: PublicKey::ZERO }],
            extra: vec![],
        },
        size: 120,
    }
}

/// An in-memory chain with three blocks; the top block carries two mined
/// transactions (fees 10 and 5) and the pool holds two more.
pub(crate) struct MockChain {
    headers: Vec<BlockHeader>,
    block_txs: HashMap<Hash, Vec<Transaction>>,
    raw_blocks: Vec<Vec<u8>>,
    mined_txs: HashMap<Hash, (Transaction, Option<u64>)>,
    raw_txs: HashMap<Hash, Vec<u8>>,
    pool: Vec<Transaction>,
    global_indexes: HashMap<Hash, Vec<u64>>,
    /// Counts every read so tests can assert a gated request never reached
    /// the chain.
    pub read_calls: AtomicUsize,
}

pub(crate) const MINED_TX_A: u8 = 0x0a;
pub(crate) const MINED_TX_B: u8 = 0x0b;
pub(crate) const POOL_TX_A: u8 = 0x1a;
pub(crate) const POOL_TX_B: u8 = 0x1b;

impl MockChain {
    pub fn new() -> Self {
        let mut headers = Vec::new();
        let mut block_txs = HashMap::new();
        let mut mined_txs = HashMap::new();
        let mut raw_txs = HashMap::new();
        let mut global_indexes = HashMap::new();

        for height in 0..3u64 {
            let tx_count = if height == 2 { 3 } else { 1 };
            headers.push(BlockHeader {
                hash: hash(height as u8 + 1),
                previous_hash: if height == 0 { Hash::ZERO } else { hash(height as u8) },
                height,
                timestamp: 1_600_000_000 + height * 120,
                nonce: height as u32 * 7,
                major_version: 5,
                minor_version: 0,
                difficulty: 100_000 + height,
                reward: 29_000 + height,
                transaction_count: tx_count,
                size: 400 * tx_count,
                already_generated_coins: 1_000_000 * (height + 1),
            });
        }

        // 100 in / 90 out and 50 in / 45 out: fees 10 and 5.
        let tx_a = sample_tx(MINED_TX_A, 100, 90);
        let tx_b = sample_tx(MINED_TX_B, 50, 45);
        let top_hash = headers[2].hash;
        for (index, tx) in [&tx_a, &tx_b].into_iter().enumerate() {
            mined_txs.insert(tx.hash, (tx.clone(), Some(2)));
            raw_txs.insert(tx.hash, vec![0xee, tx.hash.0[0]]);
            global_indexes.insert(tx.hash, vec![7 + index as u64, 20 + index as u64]);
        }
        block_txs.insert(top_hash, vec![tx_a, tx_b]);
        block_txs.insert(headers[0].hash, vec![]);
        block_txs.insert(headers[1].hash, vec![]);

        Self {
            headers,
            block_txs,
            raw_blocks: vec![vec![0xb0], vec![0xb1], vec![0xb2]],
            mined_txs,
            raw_txs,
            pool: vec![sample_tx(POOL_TX_A, 70, 68), sample_tx(POOL_TX_B, 30, 29)],
            global_indexes,
            read_calls: AtomicUsize::new(0),
        }
    }

    fn touch(&self) {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn top(&self) -> &BlockHeader {
        self.headers.last().expect("sample chain is never empty")
    }

    fn sync_start_height(&self, start: &SyncStart) -> Option<u64> {
        if let Some(checkpoint) =
            start.checkpoints.iter().find_map(|cp| self.headers.iter().find(|h| h.hash == *cp))
        {
            return Some(checkpoint.height + 1);
        }
        match start.height {
            Some(height) if height <= self.top().height => Some(height),
            Some(_) => None,
            None if start.checkpoints.is_empty() => Some(0),
            None => None,
        }
    }
}

impl ChainReader for MockChain {
    fn stats(&self) -> Result<ChainStats, CoreError> {
        self.touch();
        Ok(ChainStats {
            height: self.top().height,
            top_block_hash: self.top().hash,
            difficulty: self.top().difficulty,
            cumulative_transaction_count: 5,
            pool_size: self.pool.len() as u64,
            alternate_block_count: 1,
            major_version: 5,
        })
    }

    fn chain_height(&self) -> Result<u64, CoreError> {
        self.touch();
        Ok(self.top().height)
    }

    fn block_hash_at(&self, height: u64) -> Result<Option<Hash>, CoreError> {
        self.touch();
        Ok(self.headers.get(height as usize).map(|h| h.hash))
    }

    fn block_header_by_hash(&self, hash: &Hash) -> Result<Option<BlockHeader>, CoreError> {
        self.touch();
        Ok(self.headers.iter().find(|h| h.hash == *hash).cloned())
    }

    fn block_header_at(&self, height: u64) -> Result<Option<BlockHeader>, CoreError> {
        self.touch();
        Ok(self.headers.get(height as usize).cloned())
    }

    fn top_block_header(&self) -> Result<BlockHeader, CoreError> {
        self.touch();
        Ok(self.top().clone())
    }

    fn block_transactions(&self, hash: &Hash) -> Result<Vec<Transaction>, CoreError> {
        self.touch();
        Ok(self.block_txs.get(hash).cloned().unwrap_or_default())
    }

    fn raw_block_by_hash(&self, hash: &Hash) -> Result<Option<Vec<u8>>, CoreError> {
        self.touch();
        Ok(self
            .headers
            .iter()
            .position(|h| h.hash == *hash)
            .and_then(|index| self.raw_blocks.get(index).cloned()))
    }

    fn raw_block_at(&self, height: u64) -> Result<Option<Vec<u8>>, CoreError> {
        self.touch();
        Ok(self.raw_blocks.get(height as usize).cloned())
    }

    fn transaction_by_hash(&self, hash: &Hash) -> Result<Option<(Transaction, Option<u64>)>, CoreError> {
        self.touch();
        if let Some(found) = self.mined_txs.get(hash) {
            return Ok(Some(found.clone()));
        }
        Ok(self.pool.iter().find(|tx| tx.hash == *hash).map(|tx| (tx.clone(), None)))
    }

    fn raw_transaction_by_hash(&self, hash: &Hash) -> Result<Option<Vec<u8>>, CoreError> {
        self.touch();
        Ok(self.raw_txs.get(hash).cloned())
    }

    fn pool_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        self.touch();
        Ok(self.pool.clone())
    }

    fn raw_pool_transactions(&self) -> Result<Vec<Vec<u8>>, CoreError> {
        self.touch();
        Ok(self.pool.iter().map(|tx| vec![0xdd, tx.hash.0[0]]).collect())
    }

    fn pool_changes(&self, tail: &Hash, known: &[Hash]) -> Result<PoolChanges, CoreError> {
        self.touch();
        let added = self.pool.iter().filter(|tx| !known.contains(&tx.hash)).cloned().collect();
        let deleted = known.iter().filter(|h| !self.pool.iter().any(|tx| tx.hash == **h)).copied().collect();
        Ok(PoolChanges { added, deleted, stale: *tail != self.top().hash })
    }

    fn transactions_status(&self, hashes: &[Hash]) -> Result<TransactionsStatus, CoreError> {
        self.touch();
        let mut status = TransactionsStatus::default();
        for h in hashes {
            if self.pool.iter().any(|tx| tx.hash == *h) {
                status.in_pool.push(*h);
            } else if self.mined_txs.contains_key(h) {
                status.in_block.push(*h);
            } else {
                status.not_found.push(*h);
            }
        }
        Ok(status)
    }

    fn random_outputs(&self, amounts: &[u64], count: u64) -> Result<Vec<RandomOuts>, CoreError> {
        self.touch();
        Ok(amounts
            .iter()
            .map(|amount| RandomOuts {
                amount: *amount,
                outputs: (0..count)
                    .map(|i| OutputEntry { global_index: amount + i, key: PublicKey([i as u8; 32]) })
                    .collect(),
            })
            .collect())
    }

    fn transaction_global_indexes(&self, hash: &Hash) -> Result<Option<Vec<u64>>, CoreError> {
        self.touch();
        Ok(self.global_indexes.get(hash).cloned())
    }

    fn wallet_sync_data(
        &self,
        start: &SyncStart,
        limit: u64,
        skip_coinbase: bool,
    ) -> Result<Option<SyncFeed<SyncBlock>>, CoreError> {
        self.touch();
        let Some(from) = self.sync_start_height(start) else { return Ok(None) };
        let top = self.top().height;
        if from > top {
            return Ok(Some(SyncFeed { blocks: vec![], synced: true, top_height: top, top_hash: self.top().hash }));
        }
        let to = (from + limit - 1).min(top);
        let blocks = self.headers[from as usize..=to as usize]
            .iter()
            .map(|header| SyncBlock {
                hash: header.hash,
                height: header.height,
                timestamp: header.timestamp,
                coinbase_transaction: (!skip_coinbase).then(|| coinbase_tx(header.height, header.reward)),
                transactions: self.block_txs.get(&header.hash).cloned().unwrap_or_default(),
            })
            .collect();
        Ok(Some(SyncFeed { blocks, synced: to == self.top().height, top_height: self.top().height, top_hash: self.top().hash }))
    }

    fn raw_sync_data(&self, start: &SyncStart, limit: u64) -> Result<Option<SyncFeed<RawSyncBlock>>, CoreError> {
        self.touch();
        let Some(from) = self.sync_start_height(start) else { return Ok(None) };
        let top = self.top().height;
        if from > top {
            return Ok(Some(SyncFeed { blocks: vec![], synced: true, top_height: top, top_hash: self.top().hash }));
        }
        let to = (from + limit - 1).min(top);
        let blocks = (from..=to)
            .map(|height| RawSyncBlock {
                block: self.raw_blocks[height as usize].clone(),
                transactions: self.block_txs[&self.headers[height as usize].hash]
                    .iter()
                    .map(|tx| vec![0xee, tx.hash.0[0]])
                    .collect(),
            })
            .collect();
        Ok(Some(SyncFeed { blocks, synced: to == self.top().height, top_height: self.top().height, top_hash: self.top().hash }))
    }
}

pub(crate) struct MockSubmit {
    pub accept: bool,
    pub calls: AtomicUsize,
}

impl MockSubmit {
    pub fn accepting() -> Self {
        Self { accept: true, calls: AtomicUsize::new(0) }
    }

    pub fn rejecting() -> Self {
        Self { accept: false, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl SubmitProvider for MockSubmit {
    async fn submit_transaction(&self, blob: Vec<u8>) -> Result<Hash, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.accept {
            return Err(SubmitError::rejected("Transaction failed validation"));
        }
        Ok(Hash([blob.first().copied().unwrap_or_default(); 32]))
    }

    async fn submit_block(&self, blob: Vec<u8>) -> Result<Hash, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.accept {
            return Err(SubmitError::rejected("Block failed validation"));
        }
        Ok(Hash([blob.first().copied().unwrap_or_default(); 32]))
    }

    async fn block_template(&self, address: &str, reserve_size: usize) -> Result<BlockTemplate, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if address.is_empty() {
            return Err(SubmitError::rejected("Miner address is not valid"));
        }
        Ok(BlockTemplate { blob: vec![0xab; 16], difficulty: 100_002, height: 3, reserved_offset: 8 + reserve_size })
    }
}

pub(crate) struct MockPeers;

impl PeerTable for MockPeers {
    fn peer_stats(&self) -> PeerStats {
        PeerStats {
            grey_peers: vec!["10.0.0.8:24887".to_string()],
            white_peers: vec!["10.0.0.1:24887".to_string(), "10.0.0.2:24887".to_string()],
            incoming_connection_count: 3,
            outgoing_connection_count: 8,
        }
    }
}

pub(crate) struct MockSync {
    synced: AtomicBool,
}

impl MockSync {
    pub fn synced() -> Self {
        Self { synced: AtomicBool::new(true) }
    }

    pub fn syncing() -> Self {
        Self { synced: AtomicBool::new(false) }
    }

    pub fn set_synchronized(&self, value: bool) {
        self.synced.store(value, Ordering::SeqCst);
    }
}

impl SyncState for MockSync {
    fn is_synchronized(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }

    fn network_height(&self) -> u64 {
        12
    }

    fn start_time(&self) -> u64 {
        1_600_000_000
    }
}

pub(crate) struct TestHarness {
    pub context: Arc<RpcContext>,
    pub chain: Arc<MockChain>,
    pub submit: Arc<MockSubmit>,
    pub sync: Arc<MockSync>,
}

pub(crate) fn harness(mode: RpcMode) -> TestHarness {
    harness_with(ServerConfig { mode, ..ServerConfig::default() }, MockSubmit::accepting(), MockSync::synced())
}

pub(crate) fn harness_with(config: ServerConfig, submit: MockSubmit, sync: MockSync) -> TestHarness {
    let chain = Arc::new(MockChain::new());
    let submit = Arc::new(submit);
    let sync = Arc::new(sync);
    let context = Arc::new(RpcContext::new(
        config,
        Arc::clone(&chain) as Arc<dyn ChainReader>,
        Arc::clone(&submit) as Arc<dyn SubmitProvider>,
        Arc::new(MockPeers),
        Arc::clone(&sync) as Arc<dyn SyncState>,
    ));
    TestHarness { context, chain, submit, sync }
}

pub(crate) fn get(path: &str) -> Request<Full<Bytes>> {
    Request::builder().method(Method::GET).uri(path).body(Full::new(Bytes::new())).unwrap()
}

pub(crate) fn post(path: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

pub(crate) fn options(path: &str) -> Request<Full<Bytes>> {
    Request::builder().method(Method::OPTIONS).uri(path).body(Full::new(Bytes::new())).unwrap()
}

pub(crate) fn body_json(response: &hyper::Response<String>) -> serde_json::Value {
    serde_json::from_str(response.body()).expect("response body is JSON")
}
