//! One handler per endpoint. Each is a thin composition of a collaborator
//! query or command and a wire serializer; gating has already happened in
//! the dispatcher by the time a handler runs. Handlers return their
//! prepared success response or an [`RpcError`], never a hand-written error
//! envelope.

use crate::error::RpcError;
use crate::helpers::create_json_response;
use crate::providers::{ChainReader, CoreError};
use crate::routes::RouteRequest;
use crate::{RpcContext, NODE_VERSION};
use fp_types::{Hash, SyncStart};
use fp_wire::{
    hex, WireBlockHeader, WireBlockSummary, WireRandomOuts, WireRawSyncBlock, WireSyncBlock, WireTopBlock,
    WireTransaction, WireTransactionSummary,
};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Page size of the block-explorer listing.
const EXPLORER_PAGE_SIZE: u64 = 30;

/// Upper bound on blocks served per wallet-sync response.
const MAX_SYNC_BLOCK_COUNT: u64 = 100;

/// Largest coinbase-extra reservation a miner may ask for.
const MAX_TEMPLATE_RESERVE_SIZE: usize = 255;

fn parse_params<T: DeserializeOwned>(body: &serde_json::Value) -> Result<T, RpcError> {
    serde_json::from_value(body.clone()).map_err(|e| RpcError::invalid_params(format!("Invalid parameters: {e}")))
}

/// Bulk listings are serialized as typed structs straight into the response
/// body, not assembled as intermediate JSON trees.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionListing<T: Serialize> {
    transactions: Vec<T>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockListing {
    blocks: Vec<WireBlockSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncFeedResponse<B: Serialize> {
    blocks: Vec<B>,
    synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_block: Option<WireTopBlock>,
}

/// Aggregate fee over a set of transaction hashes. Hashes that no longer
/// resolve are skipped rather than failing the whole aggregation; an empty
/// set sums to zero.
pub(crate) fn calculate_total_fee_amount(chain: &dyn ChainReader, hashes: &[Hash]) -> Result<u64, CoreError> {
    let mut total: u64 = 0;
    for hash in hashes {
        match chain.transaction_by_hash(hash)? {
            Some((tx, _)) => total = total.saturating_add(tx.fee()),
            None => {
                tracing::debug!(target: "rpc_calls", "Skipping unresolvable transaction {hash} in fee aggregation");
            }
        }
    }
    Ok(total)
}

pub(crate) async fn handle_info(ctx: Arc<RpcContext>, _req: RouteRequest) -> Result<Response<String>, RpcError> {
    let stats = ctx.chain.stats()?;
    let peers = ctx.peers.peer_stats();

    let body = json!({
        "height": stats.height,
        "networkHeight": ctx.sync.network_height(),
        "topBlockHash": stats.top_block_hash,
        "difficulty": stats.difficulty,
        "txCount": stats.cumulative_transaction_count,
        "txPoolSize": stats.pool_size,
        "altBlocksCount": stats.alternate_block_count,
        "majorVersion": stats.major_version,
        "greyPeerlistSize": peers.grey_peers.len(),
        "whitePeerlistSize": peers.white_peers.len(),
        "incomingConnectionsCount": peers.incoming_connection_count,
        "outgoingConnectionsCount": peers.outgoing_connection_count,
        "startTime": ctx.sync.start_time(),
        "synced": ctx.sync.is_synchronized(),
        "version": NODE_VERSION,
    });
    Ok(create_json_response(StatusCode::OK, &body))
}

pub(crate) async fn handle_height(ctx: Arc<RpcContext>, _req: RouteRequest) -> Result<Response<String>, RpcError> {
    let body = json!({
        "height": ctx.chain.chain_height()?,
        "networkHeight": ctx.sync.network_height(),
    });
    Ok(create_json_response(StatusCode::OK, &body))
}

pub(crate) async fn handle_fee(ctx: Arc<RpcContext>, _req: RouteRequest) -> Result<Response<String>, RpcError> {
    let body = json!({
        "address": ctx.config.fee_address,
        "amount": ctx.config.fee_amount,
    });
    Ok(create_json_response(StatusCode::OK, &body))
}

pub(crate) async fn handle_peers(ctx: Arc<RpcContext>, _req: RouteRequest) -> Result<Response<String>, RpcError> {
    let peers = ctx.peers.peer_stats();
    let body = json!({
        "peers": peers.white_peers,
        "greyPeers": peers.grey_peers,
    });
    Ok(create_json_response(StatusCode::OK, &body))
}

pub(crate) async fn handle_block_count(ctx: Arc<RpcContext>, _req: RouteRequest) -> Result<Response<String>, RpcError> {
    let body = json!({ "count": ctx.chain.chain_height()? + 1 });
    Ok(create_json_response(StatusCode::OK, &body))
}

pub(crate) async fn handle_block_hash_for_height(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let height = req.param().height();
    // A height past the tip is an unresolved entity, not a bad parameter.
    let hash = ctx.chain.block_hash_at(height)?.ok_or_else(RpcError::block_not_found)?;
    Ok(create_json_response(StatusCode::OK, &json!({ "hash": hash })))
}

pub(crate) async fn handle_top_block_header(
    ctx: Arc<RpcContext>,
    _req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let header = ctx.chain.top_block_header()?;
    Ok(create_json_response(StatusCode::OK, &WireBlockHeader::new(&header)))
}

pub(crate) async fn handle_block_header_by_hash(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let hash = req.param().hash();
    let header = ctx.chain.block_header_by_hash(&hash)?.ok_or_else(RpcError::block_not_found)?;
    Ok(create_json_response(StatusCode::OK, &WireBlockHeader::new(&header)))
}

pub(crate) async fn handle_block_header_by_height(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let height = req.param().height();
    let header = ctx.chain.block_header_at(height)?.ok_or_else(RpcError::block_not_found)?;
    Ok(create_json_response(StatusCode::OK, &WireBlockHeader::new(&header)))
}

pub(crate) async fn handle_blocks_by_height(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let start = req.param().height();
    if start > ctx.chain.chain_height()? {
        return Err(RpcError::block_not_found());
    }

    // One explorer page, walking backwards from the requested height.
    let first = start.saturating_sub(EXPLORER_PAGE_SIZE - 1);
    let mut blocks = Vec::with_capacity((start - first + 1) as usize);
    for height in (first..=start).rev() {
        let header = ctx.chain.block_header_at(height)?.ok_or_else(RpcError::block_not_found)?;
        let transactions = ctx.chain.block_transactions(&header.hash)?;
        let tx_hashes: Vec<Hash> = transactions.iter().map(|tx| tx.hash).collect();
        let total_fee_amount = calculate_total_fee_amount(ctx.chain.as_ref(), &tx_hashes)?;
        let summaries = transactions.iter().map(WireTransactionSummary::new).collect();
        blocks.push(WireBlockSummary::new(&header, total_fee_amount, summaries));
    }

    Ok(create_json_response(StatusCode::OK, &BlockListing { blocks }))
}

pub(crate) async fn handle_transaction_details(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let hash = req.param().hash();
    let (transaction, block_height) =
        ctx.chain.transaction_by_hash(&hash)?.ok_or_else(RpcError::transaction_not_found)?;
    Ok(create_json_response(StatusCode::OK, &WireTransaction::new(&transaction, block_height)))
}

pub(crate) async fn handle_transactions_in_pool(
    ctx: Arc<RpcContext>,
    _req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let transactions: Vec<WireTransaction> =
        ctx.chain.pool_transactions()?.iter().map(|tx| WireTransaction::new(tx, None)).collect();
    Ok(create_json_response(StatusCode::OK, &TransactionListing { transactions }))
}

pub(crate) async fn handle_raw_transactions_in_pool(
    ctx: Arc<RpcContext>,
    _req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let transactions: Vec<String> = ctx.chain.raw_pool_transactions()?.iter().map(|blob| hex::encode(blob)).collect();
    Ok(create_json_response(StatusCode::OK, &TransactionListing { transactions }))
}

pub(crate) async fn handle_raw_block_by_hash(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let hash = req.param().hash();
    let blob = ctx.chain.raw_block_by_hash(&hash)?.ok_or_else(RpcError::block_not_found)?;
    Ok(create_json_response(StatusCode::OK, &json!({ "blob": hex::encode(&blob) })))
}

pub(crate) async fn handle_raw_block_by_height(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let height = req.param().height();
    let blob = ctx.chain.raw_block_at(height)?.ok_or_else(RpcError::block_not_found)?;
    Ok(create_json_response(StatusCode::OK, &json!({ "blob": hex::encode(&blob) })))
}

pub(crate) async fn handle_raw_transaction_by_hash(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let hash = req.param().hash();
    let blob = ctx.chain.raw_transaction_by_hash(&hash)?.ok_or_else(RpcError::transaction_not_found)?;
    Ok(create_json_response(StatusCode::OK, &json!({ "blob": hex::encode(&blob) })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionParams {
    tx: String,
}

pub(crate) async fn handle_send_transaction(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let params: SendTransactionParams = parse_params(&req.body)?;
    let blob =
        hex::decode(&params.tx).map_err(|e| RpcError::invalid_params(format!("Invalid transaction blob: {e}")))?;
    let hash = ctx.submit.submit_transaction(blob).await?;
    Ok(create_json_response(StatusCode::OK, &json!({ "transactionHash": hash })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomOutputsParams {
    amounts: Vec<u64>,
    outs_count: u64,
}

pub(crate) async fn handle_random_outputs(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let params: RandomOutputsParams = parse_params(&req.body)?;
    let outs: Vec<WireRandomOuts> =
        ctx.chain.random_outputs(&params.amounts, params.outs_count)?.iter().map(WireRandomOuts::new).collect();
    Ok(create_json_response(StatusCode::OK, &json!({ "outs": outs })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlobalIndexesParams {
    hash: Hash,
}

pub(crate) async fn handle_global_indexes(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let params: GlobalIndexesParams = parse_params(&req.body)?;
    let indexes =
        ctx.chain.transaction_global_indexes(&params.hash)?.ok_or_else(RpcError::transaction_not_found)?;
    Ok(create_json_response(StatusCode::OK, &json!({ "indexes": indexes })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsStatusParams {
    transaction_hashes: Vec<Hash>,
}

pub(crate) async fn handle_transactions_status(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let params: TransactionsStatusParams = parse_params(&req.body)?;
    let status = ctx.chain.transactions_status(&params.transaction_hashes)?;
    let body = json!({
        "transactionsInPool": status.in_pool,
        "transactionsInBlock": status.in_block,
        "transactionsUnknown": status.not_found,
    });
    Ok(create_json_response(StatusCode::OK, &body))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolChangesParams {
    last_known_block: Hash,
    #[serde(default)]
    known_transaction_hashes: Vec<Hash>,
}

pub(crate) async fn handle_pool_changes(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let params: PoolChangesParams = parse_params(&req.body)?;
    let changes = ctx.chain.pool_changes(&params.last_known_block, &params.known_transaction_hashes)?;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct PoolChangesResponse {
        added_transactions: Vec<WireTransaction>,
        deleted_transaction_hashes: Vec<Hash>,
        stale: bool,
    }

    let response = PoolChangesResponse {
        added_transactions: changes.added.iter().map(|tx| WireTransaction::new(tx, None)).collect(),
        deleted_transaction_hashes: changes.deleted,
        stale: changes.stale,
    };
    Ok(create_json_response(StatusCode::OK, &response))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletSyncParams {
    #[serde(default)]
    checkpoints: Vec<Hash>,
    #[serde(default)]
    start_height: Option<u64>,
    #[serde(default)]
    start_timestamp: Option<u64>,
    #[serde(default)]
    block_count: Option<u64>,
    #[serde(default)]
    skip_coinbase_transactions: bool,
}

pub(crate) async fn handle_wallet_sync_data(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let params: WalletSyncParams = parse_params(&req.body)?;
    let limit = params.block_count.unwrap_or(MAX_SYNC_BLOCK_COUNT).clamp(1, MAX_SYNC_BLOCK_COUNT);
    let start = SyncStart {
        checkpoints: params.checkpoints,
        height: params.start_height,
        timestamp: params.start_timestamp,
    };

    let feed = ctx
        .chain
        .wallet_sync_data(&start, limit, params.skip_coinbase_transactions)?
        .ok_or_else(|| RpcError::NotFound("Sync start point not found on the chain".to_string()))?;

    let blocks: Vec<WireSyncBlock> = feed.blocks.iter().map(WireSyncBlock::new).collect();
    let top_block = feed.synced.then_some(WireTopBlock { hash: feed.top_hash, height: feed.top_height });
    Ok(create_json_response(StatusCode::OK, &SyncFeedResponse { blocks, synced: feed.synced, top_block }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlocksParams {
    #[serde(default)]
    checkpoints: Vec<Hash>,
    #[serde(default)]
    start_height: Option<u64>,
    #[serde(default)]
    block_count: Option<u64>,
}

pub(crate) async fn handle_raw_blocks(ctx: Arc<RpcContext>, req: RouteRequest) -> Result<Response<String>, RpcError> {
    let params: RawBlocksParams = parse_params(&req.body)?;
    let limit = params.block_count.unwrap_or(MAX_SYNC_BLOCK_COUNT).clamp(1, MAX_SYNC_BLOCK_COUNT);
    let start = SyncStart { checkpoints: params.checkpoints, height: params.start_height, timestamp: None };

    let feed = ctx
        .chain
        .raw_sync_data(&start, limit)?
        .ok_or_else(|| RpcError::NotFound("Sync start point not found on the chain".to_string()))?;

    let blocks: Vec<WireRawSyncBlock> = feed.blocks.iter().map(WireRawSyncBlock::new).collect();
    let top_block = feed.synced.then_some(WireTopBlock { hash: feed.top_hash, height: feed.top_height });
    Ok(create_json_response(StatusCode::OK, &SyncFeedResponse { blocks, synced: feed.synced, top_block }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockTemplateParams {
    address: String,
    reserve_size: usize,
}

pub(crate) async fn handle_block_template(
    ctx: Arc<RpcContext>,
    req: RouteRequest,
) -> Result<Response<String>, RpcError> {
    let params: BlockTemplateParams = parse_params(&req.body)?;
    if params.reserve_size > MAX_TEMPLATE_RESERVE_SIZE {
        return Err(RpcError::invalid_params(format!(
            "Reserve size of {} exceeds the maximum of {MAX_TEMPLATE_RESERVE_SIZE}",
            params.reserve_size
        )));
    }

    let template = ctx.submit.block_template(&params.address, params.reserve_size).await?;
    let body = json!({
        "blob": hex::encode(&template.blob),
        "difficulty": template.difficulty,
        "height": template.height,
        "reservedOffset": template.reserved_offset,
    });
    Ok(create_json_response(StatusCode::OK, &body))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBlockParams {
    block: String,
}

pub(crate) async fn handle_submit_block(ctx: Arc<RpcContext>, req: RouteRequest) -> Result<Response<String>, RpcError> {
    let params: SubmitBlockParams = parse_params(&req.body)?;
    let blob = hex::decode(&params.block).map_err(|e| RpcError::invalid_params(format!("Invalid block blob: {e}")))?;
    let hash = ctx.submit.submit_block(blob).await?;
    Ok(create_json_response(StatusCode::OK, &json!({ "blockHash": hash })))
}
