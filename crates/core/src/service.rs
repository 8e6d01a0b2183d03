//! Medical record service.
//!
//! Every operation resolves the caller's MSP id once, looks up its private data collection,
//! and then talks to the ledger through a [`RecordStore`]. Records only ever move one way:
//! from a private collection into public state.
//!
//! Record lifecycle, per key:
//!
//! ```text
//! absent --create--> private --transfer_to_public--> private + public
//! public --delete_public--> absent (public copy only)
//! ```
//!
//! Private records have no delete operation, and a transfer leaves the private copy in place.

use crate::config::CoreConfig;
use crate::constants::PATIENT_ID_FIELD;
use crate::identity::caller_msp_id;
use crate::record::{sample_records, MedicalRecord, ScanEntry};
use crate::store::{Partition, RecordStore};
use crate::RecordResult;
use medledger_shim::ChaincodeStub;
use medledger_types::CollectionName;
use std::sync::Arc;

/// Pure record operations - no transport concerns.
#[derive(Clone, Debug)]
pub struct MedicalRecordService {
    cfg: Arc<CoreConfig>,
}

impl MedicalRecordService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn caller_collection<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
    ) -> RecordResult<&CollectionName> {
        let msp_id = caller_msp_id(stub)?;
        let collection = self.cfg.collections().collection_for(&msp_id)?;
        tracing::debug!(msp_id = %msp_id, collection = %collection, "resolved caller collection");
        Ok(collection)
    }

    /// Seeds the two sample records into the caller's collection.
    ///
    /// # Errors
    ///
    /// `RecordError::PartitionUnresolved` if the caller has no collection.
    pub fn initialise<S: ChaincodeStub + ?Sized>(&self, stub: &S) -> RecordResult<()> {
        let collection = self.caller_collection(stub)?;
        let store = RecordStore::new(stub);

        for record in sample_records() {
            store.put(Partition::Private(collection), &record.id, &record)?;
        }

        tracing::info!("seeded sample records into {}", collection);
        Ok(())
    }

    /// Lists every entry of public state, decoded where possible.
    ///
    /// Only the public partition is scanned. The caller's identity is not consulted.
    pub fn list_all<S: ChaincodeStub + ?Sized>(&self, stub: &S) -> RecordResult<Vec<ScanEntry>> {
        RecordStore::new(stub).scan_all(Partition::Public)?.collect()
    }

    /// Reads a record from the caller's collection.
    ///
    /// # Errors
    ///
    /// `RecordError::NotExists` if `id` is absent or its stored value is empty.
    pub fn get<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        id: &str,
    ) -> RecordResult<MedicalRecord> {
        let collection = self.caller_collection(stub)?;
        RecordStore::new(stub).get(Partition::Private(collection), id)
    }

    /// Reads a record from public state.
    pub fn get_public<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        id: &str,
    ) -> RecordResult<MedicalRecord> {
        RecordStore::new(stub).get(Partition::Public, id)
    }

    /// Returns every record in the caller's collection with the given `patientID`.
    ///
    /// No matches yields an empty vector. Result order is whatever the ledger returns.
    pub fn query_by_patient<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        patient_id: &str,
    ) -> RecordResult<Vec<MedicalRecord>> {
        let collection = self.caller_collection(stub)?;
        RecordStore::new(stub)
            .query_by_attribute(Partition::Private(collection), PATIENT_ID_FIELD, patient_id)?
            .collect()
    }

    /// Writes `record` into the caller's collection under `record.id`.
    ///
    /// This is an upsert: an existing record with the same id is overwritten without any
    /// uniqueness check.
    pub fn create<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        record: &MedicalRecord,
    ) -> RecordResult<()> {
        let collection = self.caller_collection(stub)?;
        RecordStore::new(stub).put(Partition::Private(collection), &record.id, record)?;
        tracing::info!("stored medical record {} in {}", record.id, collection);
        Ok(())
    }

    /// Copies a record from the caller's collection into public state under the same key.
    ///
    /// The stored bytes are copied verbatim. The private record is left in place, and the
    /// transfer cannot be undone other than by deleting the public copy.
    ///
    /// # Errors
    ///
    /// `RecordError::NotExists` if the record is not in the caller's collection.
    pub fn transfer_to_public<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        id: &str,
    ) -> RecordResult<()> {
        let collection = self.caller_collection(stub)?;
        let store = RecordStore::new(stub);

        let raw = store.get_raw(Partition::Private(collection), id)?;
        store.put_raw(Partition::Public, id, &raw)?;

        tracing::info!("transferred medical record {} from {} to public", id, collection);
        Ok(())
    }

    /// Removes a key from public state. Deleting an absent key succeeds.
    pub fn delete_public<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        id: &str,
    ) -> RecordResult<()> {
        RecordStore::new(stub).delete(Partition::Public, id)?;
        tracing::info!("deleted public medical record {}", id);
        Ok(())
    }
}
