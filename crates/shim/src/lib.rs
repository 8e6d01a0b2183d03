//! # medledger shim
//!
//! The narrow interface through which the medical record contract reaches the ledger
//! substrate, plus an in-process substrate for tests and local runs.
//!
//! The substrate owns ordering, endorsement, commit and conflict detection. Nothing here
//! locks or retries: each trait call is a single request to the peer, and any failure is
//! reported back unchanged as a [`LedgerError`].
//!
//! Semantics follow the Fabric chaincode stub:
//! - `get_*` returns an empty byte vector when the key is absent
//! - range scans with empty start and end keys cover the whole namespace
//! - range and query results are lazy, finite and consumed once

pub mod memory;

use medledger_types::CollectionName;

pub use memory::{MemoryLedger, MemoryStub};

/// Errors raised by a ledger substrate call.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid rich query: {0}")]
    InvalidQuery(String),
    #[error("transaction context has no creator identity")]
    MissingCreator,
    #[error("failed to read ledger snapshot: {0}")]
    SnapshotRead(std::io::Error),
    #[error("failed to write ledger snapshot: {0}")]
    SnapshotWrite(std::io::Error),
    #[error("invalid ledger snapshot: {0}")]
    SnapshotFormat(serde_json::Error),
    #[error("invalid base64 value for key {key}: {source}")]
    SnapshotEncoding {
        key: String,
        #[source]
        source: base64::DecodeError,
    },
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// A single entry yielded by a range scan or rich query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// Lazy, single-pass sequence of state entries.
pub type StateIter<'a> = Box<dyn Iterator<Item = LedgerResult<KeyValue>> + 'a>;

/// Capabilities the ledger substrate exposes to a running transaction.
///
/// One value of this trait represents one transaction context. Every call may block while
/// the substrate answers; implementations must not perform their own retries.
pub trait ChaincodeStub {
    /// MSP id of the organisation that submitted the transaction.
    fn msp_id(&self) -> LedgerResult<String>;

    fn get_state(&self, key: &str) -> LedgerResult<Vec<u8>>;

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()>;

    fn delete_state(&self, key: &str) -> LedgerResult<()>;

    /// Scans public state in `[start_key, end_key)`. Empty bounds are open-ended.
    fn get_state_by_range(&self, start_key: &str, end_key: &str) -> LedgerResult<StateIter<'_>>;

    /// Runs a rich (selector based) query against public state.
    fn get_query_result(&self, query: &str) -> LedgerResult<StateIter<'_>>;

    fn get_private_data(&self, collection: &CollectionName, key: &str) -> LedgerResult<Vec<u8>>;

    fn put_private_data(
        &self,
        collection: &CollectionName,
        key: &str,
        value: &[u8],
    ) -> LedgerResult<()>;

    fn delete_private_data(&self, collection: &CollectionName, key: &str) -> LedgerResult<()>;

    /// Scans a private collection in `[start_key, end_key)`. Empty bounds are open-ended.
    fn get_private_data_by_range(
        &self,
        collection: &CollectionName,
        start_key: &str,
        end_key: &str,
    ) -> LedgerResult<StateIter<'_>>;

    /// Runs a rich (selector based) query against a private collection.
    fn get_private_data_query_result(
        &self,
        collection: &CollectionName,
        query: &str,
    ) -> LedgerResult<StateIter<'_>>;
}
