use crate::hex;
use fp_types::{
    Hash, KeyImage, PublicKey, RandomOuts, Transaction, TransactionInput, TransactionOutput, TransactionPrefix,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireTransactionInput {
    #[serde(rename_all = "camelCase")]
    Coinbase { height: u64 },
    #[serde(rename_all = "camelCase")]
    Key { amount: u64, key_offsets: Vec<u64>, key_image: KeyImage },
}

impl From<&TransactionInput> for WireTransactionInput {
    fn from(input: &TransactionInput) -> Self {
        match input {
            TransactionInput::Coinbase { height } => WireTransactionInput::Coinbase { height: *height },
            TransactionInput::Key { amount, key_offsets, key_image } => WireTransactionInput::Key {
                amount: *amount,
                key_offsets: key_offsets.clone(),
                key_image: *key_image,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransactionOutput {
    pub amount: u64,
    pub key: PublicKey,
}

impl From<&TransactionOutput> for WireTransactionOutput {
    fn from(output: &TransactionOutput) -> Self {
        Self { amount: output.amount, key: output.key }
    }
}

/// Canonical prefix field ordering shared by every endpoint that decodes a
/// transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransactionPrefix {
    pub version: u8,
    pub unlock_time: u64,
    pub inputs: Vec<WireTransactionInput>,
    pub outputs: Vec<WireTransactionOutput>,
    #[serde_as(as = "hex::BytesAsHex")]
    pub extra: Vec<u8>,
}

impl WireTransactionPrefix {
    pub fn new(prefix: &TransactionPrefix) -> Self {
        Self {
            version: prefix.version,
            unlock_time: prefix.unlock_time,
            inputs: prefix.inputs.iter().map(Into::into).collect(),
            outputs: prefix.outputs.iter().map(Into::into).collect(),
            extra: prefix.extra.clone(),
        }
    }
}

/// A fully decoded transaction as served by the details and pool endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction {
    pub hash: Hash,
    pub prefix: WireTransactionPrefix,
    pub fee: u64,
    pub amount_out: u64,
    pub size: u64,
    /// Height of the including block; absent while the transaction is in
    /// the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub block_height: Option<u64>,
}

impl WireTransaction {
    pub fn new(tx: &Transaction, block_height: Option<u64>) -> Self {
        Self {
            hash: tx.hash,
            prefix: WireTransactionPrefix::new(&tx.prefix),
            fee: tx.fee(),
            amount_out: tx.amount_out(),
            size: tx.size,
            block_height,
        }
    }
}

/// The abbreviated per-transaction shape embedded in block listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransactionSummary {
    pub hash: Hash,
    pub fee: u64,
    pub amount_out: u64,
    pub size: u64,
}

impl WireTransactionSummary {
    pub fn new(tx: &Transaction) -> Self {
        Self { hash: tx.hash, fee: tx.fee(), amount_out: tx.amount_out(), size: tx.size }
    }
}

/// Ring member candidates for one amount, as served to wallets building
/// transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRandomOuts {
    pub amount: u64,
    pub outs: Vec<WireOutputEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOutputEntry {
    pub global_index: u64,
    pub key: PublicKey,
}

impl WireRandomOuts {
    pub fn new(outs: &RandomOuts) -> Self {
        Self {
            amount: outs.amount,
            outs: outs
                .outputs
                .iter()
                .map(|entry| WireOutputEntry { global_index: entry.global_index, key: entry.key })
                .collect(),
        }
    }
}
