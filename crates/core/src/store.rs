//! Record storage over the ledger substrate.
//!
//! `RecordStore` is a structured-storage adapter: it serialises records into a partition,
//! reads them back, and runs range scans and selector queries. It does not know anything
//! about which caller may use which partition; that is decided by the service.

use crate::record::{MedicalRecord, ScanEntry};
use crate::{RecordError, RecordResult};
use medledger_shim::{ChaincodeStub, StateIter};
use medledger_types::CollectionName;
use serde_json::{Map, Value};

/// Where a record lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition<'a> {
    /// A private data collection, visible to its member organisations only.
    Private(&'a CollectionName),
    /// Public world state, readable by every channel member.
    Public,
}

impl std::fmt::Display for Partition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Partition::Private(collection) => write!(f, "private:{collection}"),
            Partition::Public => write!(f, "public"),
        }
    }
}

/// Structured record access for a single transaction.
pub struct RecordStore<'s, S: ChaincodeStub + ?Sized> {
    stub: &'s S,
}

impl<'s, S: ChaincodeStub + ?Sized> RecordStore<'s, S> {
    pub fn new(stub: &'s S) -> Self {
        Self { stub }
    }

    /// Stores `record` under `key`, replacing any existing value.
    pub fn put(
        &self,
        partition: Partition<'_>,
        key: &str,
        record: &MedicalRecord,
    ) -> RecordResult<()> {
        self.put_raw(partition, key, &record.to_bytes()?)
    }

    /// Stores already-encoded bytes under `key`, replacing any existing value.
    pub fn put_raw(&self, partition: Partition<'_>, key: &str, value: &[u8]) -> RecordResult<()> {
        match partition {
            Partition::Private(collection) => self.stub.put_private_data(collection, key, value)?,
            Partition::Public => self.stub.put_state(key, value)?,
        }
        Ok(())
    }

    /// Returns the stored bytes for `key`.
    ///
    /// # Errors
    ///
    /// `RecordError::NotExists` when the key is absent or its value is empty.
    pub fn get_raw(&self, partition: Partition<'_>, key: &str) -> RecordResult<Vec<u8>> {
        let value = match partition {
            Partition::Private(collection) => self.stub.get_private_data(collection, key)?,
            Partition::Public => self.stub.get_state(key)?,
        };

        if value.is_empty() {
            return Err(RecordError::NotExists(key.to_string()));
        }
        Ok(value)
    }

    pub fn get(&self, partition: Partition<'_>, key: &str) -> RecordResult<MedicalRecord> {
        MedicalRecord::from_bytes(&self.get_raw(partition, key)?)
    }

    /// Runs an equality selector query on `attribute`.
    ///
    /// Matches are yielded lazily in the substrate's order. Entries with an empty value and
    /// entries that do not decode as medical records are logged and skipped.
    pub fn query_by_attribute(
        &self,
        partition: Partition<'_>,
        attribute: &str,
        value: &str,
    ) -> RecordResult<impl Iterator<Item = RecordResult<MedicalRecord>> + 's> {
        let mut selector = Map::new();
        selector.insert(attribute.to_string(), Value::String(value.to_string()));
        let query = serde_json::json!({ "selector": selector }).to_string();

        let results: StateIter<'s> = match partition {
            Partition::Private(collection) => {
                self.stub.get_private_data_query_result(collection, &query)?
            }
            Partition::Public => self.stub.get_query_result(&query)?,
        };

        let origin = partition.to_string();
        Ok(results.filter_map(move |item| match item {
            Ok(kv) if kv.value.is_empty() => {
                tracing::warn!("skipping empty value for key {} in {}", kv.key, origin);
                None
            }
            Ok(kv) => match MedicalRecord::from_bytes(&kv.value) {
                Ok(record) => Some(Ok(record)),
                Err(e) => {
                    tracing::warn!("skipping key {} in {}: {}", kv.key, origin, e);
                    None
                }
            },
            Err(e) => Some(Err(RecordError::from(e))),
        }))
    }

    /// Scans every key of the partition.
    ///
    /// Values that do not decode as medical records are yielded as [`ScanEntry::Raw`].
    pub fn scan_all(
        &self,
        partition: Partition<'_>,
    ) -> RecordResult<impl Iterator<Item = RecordResult<ScanEntry>> + 's> {
        let results: StateIter<'s> = match partition {
            Partition::Private(collection) => {
                self.stub.get_private_data_by_range(collection, "", "")?
            }
            Partition::Public => self.stub.get_state_by_range("", "")?,
        };

        let origin = partition.to_string();
        Ok(results.map(move |item| {
            let kv = item?;
            let entry = ScanEntry::from_bytes(kv.value);
            if let ScanEntry::Raw(_) = entry {
                tracing::warn!("{} value for key {} is not a medical record", origin, kv.key);
            }
            Ok(entry)
        }))
    }

    /// Removes `key`. Absent keys are not an error.
    pub fn delete(&self, partition: Partition<'_>, key: &str) -> RecordResult<()> {
        match partition {
            Partition::Private(collection) => self.stub.delete_private_data(collection, key)?,
            Partition::Public => self.stub.delete_state(key)?,
        }
        Ok(())
    }
}
