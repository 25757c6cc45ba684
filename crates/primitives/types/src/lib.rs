//! Core domain types shared by the ferrite node's client crates.
//!
//! Everything here is a plain value type: hashes and keys with their
//! canonical hex string form, block headers as the chain stores them, and
//! the transaction model (prefix, inputs, outputs) with the fee arithmetic
//! derived from it.

mod block;
mod hash;
mod node;
mod transaction;

pub use block::{BlockHeader, BlockTemplate, RawSyncBlock, SyncBlock, SyncFeed, SyncStart};
pub use hash::{FromHexError, Hash, KeyImage, PublicKey};
pub use node::{ChainStats, PeerStats};
pub use transaction::{
    OutputEntry, PoolChanges, RandomOuts, Transaction, TransactionInput, TransactionOutput, TransactionPrefix,
    TransactionsStatus,
};
