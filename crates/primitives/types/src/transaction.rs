use crate::hash::{Hash, KeyImage, PublicKey};
use serde::{Deserialize, Serialize};

/// A transaction input. Coinbase inputs mint the block reward and carry no
/// amount of their own; key inputs spend a previous output through a ring
/// referenced by relative key offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionInput {
    Coinbase { height: u64 },
    Key { amount: u64, key_offsets: Vec<u64>, key_image: KeyImage },
}

impl TransactionInput {
    pub fn amount(&self) -> u64 {
        match self {
            TransactionInput::Coinbase { .. } => 0,
            TransactionInput::Key { amount, .. } => *amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub amount: u64,
    pub key: PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionPrefix {
    pub version: u8,
    pub unlock_time: u64,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub extra: Vec<u8>,
}

impl TransactionPrefix {
    pub fn input_total(&self) -> u64 {
        self.inputs.iter().map(TransactionInput::amount).sum()
    }

    pub fn output_total(&self) -> u64 {
        self.outputs.iter().map(|output| output.amount).sum()
    }

    /// Fee is whatever the inputs carry beyond the outputs. Coinbase
    /// transactions mint their outputs, so their fee is zero.
    pub fn fee(&self) -> u64 {
        self.input_total().saturating_sub(self.output_total())
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self.inputs.as_slice(), [TransactionInput::Coinbase { .. }])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Hash,
    pub prefix: TransactionPrefix,
    /// Size of the canonical binary encoding, in bytes.
    pub size: u64,
}

impl Transaction {
    pub fn fee(&self) -> u64 {
        self.prefix.fee()
    }

    pub fn amount_out(&self) -> u64 {
        self.prefix.output_total()
    }
}

/// Where a set of queried transaction hashes currently live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionsStatus {
    pub in_pool: Vec<Hash>,
    pub in_block: Vec<Hash>,
    pub not_found: Vec<Hash>,
}

/// Diff between a client's view of the transaction pool and the node's.
/// `stale` means the client's view is too old to diff and it must resync
/// from scratch.
#[derive(Debug, Clone, Default)]
pub struct PoolChanges {
    pub added: Vec<Transaction>,
    pub deleted: Vec<Hash>,
    pub stale: bool,
}

/// Ring member candidates for one amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomOuts {
    pub amount: u64,
    pub outputs: Vec<OutputEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub global_index: u64,
    pub key: PublicKey,
}
