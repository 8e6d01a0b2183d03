//! In-process ledger substrate.
//!
//! `MemoryLedger` holds public world state and private collection state as ordered maps.
//! Each transaction gets its own [`MemoryStub`] carrying the submitter's MSP id; writes are
//! applied immediately. There is no endorsement, ordering or MVCC validation here.

mod selector;
mod snapshot;

use crate::{ChaincodeStub, KeyValue, LedgerError, LedgerResult, StateIter};
use medledger_types::CollectionName;
use selector::Selector;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Namespace = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Default)]
pub(crate) struct WorldState {
    pub(crate) public: Namespace,
    pub(crate) private: BTreeMap<CollectionName, Namespace>,
}

/// Shared in-memory ledger. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<WorldState>>,
    offline: Arc<AtomicBool>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: WorldState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            offline: Arc::default(),
        }
    }

    /// Opens a transaction context submitted by `msp_id`.
    pub fn transaction(&self, msp_id: impl Into<String>) -> MemoryStub {
        MemoryStub {
            ledger: self.clone(),
            msp_id: msp_id.into(),
        }
    }

    /// While offline, every stub call fails with [`LedgerError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("peer is offline".into()));
        }
        Ok(())
    }

    pub(crate) fn read(&self) -> LedgerResult<RwLockReadGuard<'_, WorldState>> {
        self.check_online()?;
        self.state
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger state lock poisoned".into()))
    }

    pub(crate) fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, WorldState>> {
        self.check_online()?;
        self.state
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger state lock poisoned".into()))
    }
}

/// Transaction context over a [`MemoryLedger`].
#[derive(Clone, Debug)]
pub struct MemoryStub {
    ledger: MemoryLedger,
    msp_id: String,
}

fn validate_key(key: &str) -> LedgerResult<()> {
    if key.is_empty() {
        return Err(LedgerError::InvalidKey("key must not be empty".into()));
    }
    Ok(())
}

fn scan(namespace: Option<&Namespace>, start_key: &str, end_key: &str) -> Vec<KeyValue> {
    let Some(namespace) = namespace else {
        return Vec::new();
    };

    // BTreeMap::range panics on inverted bounds.
    if !start_key.is_empty() && !end_key.is_empty() && start_key > end_key {
        return Vec::new();
    }

    let lower = if start_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start_key.to_string())
    };
    let upper = if end_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end_key.to_string())
    };

    namespace
        .range((lower, upper))
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn query(namespace: Option<&Namespace>, query: &str) -> LedgerResult<Vec<KeyValue>> {
    let selector = Selector::parse(query)?;
    let Some(namespace) = namespace else {
        return Ok(Vec::new());
    };

    Ok(namespace
        .iter()
        .filter(|(_, value)| selector.matches(value))
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: value.clone(),
        })
        .collect())
}

fn into_iter(entries: Vec<KeyValue>) -> StateIter<'static> {
    Box::new(entries.into_iter().map(Ok))
}

impl ChaincodeStub for MemoryStub {
    fn msp_id(&self) -> LedgerResult<String> {
        if self.msp_id.is_empty() {
            return Err(LedgerError::MissingCreator);
        }
        Ok(self.msp_id.clone())
    }

    fn get_state(&self, key: &str) -> LedgerResult<Vec<u8>> {
        let state = self.ledger.read()?;
        Ok(state.public.get(key).cloned().unwrap_or_default())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        validate_key(key)?;
        let mut state = self.ledger.write()?;
        state.public.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete_state(&self, key: &str) -> LedgerResult<()> {
        validate_key(key)?;
        let mut state = self.ledger.write()?;
        state.public.remove(key);
        Ok(())
    }

    fn get_state_by_range(&self, start_key: &str, end_key: &str) -> LedgerResult<StateIter<'_>> {
        let state = self.ledger.read()?;
        Ok(into_iter(scan(Some(&state.public), start_key, end_key)))
    }

    fn get_query_result(&self, query_json: &str) -> LedgerResult<StateIter<'_>> {
        let state = self.ledger.read()?;
        Ok(into_iter(query(Some(&state.public), query_json)?))
    }

    fn get_private_data(&self, collection: &CollectionName, key: &str) -> LedgerResult<Vec<u8>> {
        let state = self.ledger.read()?;
        Ok(state
            .private
            .get(collection)
            .and_then(|namespace| namespace.get(key))
            .cloned()
            .unwrap_or_default())
    }

    fn put_private_data(
        &self,
        collection: &CollectionName,
        key: &str,
        value: &[u8],
    ) -> LedgerResult<()> {
        validate_key(key)?;
        let mut state = self.ledger.write()?;
        state
            .private
            .entry(collection.clone())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete_private_data(&self, collection: &CollectionName, key: &str) -> LedgerResult<()> {
        validate_key(key)?;
        let mut state = self.ledger.write()?;
        if let Some(namespace) = state.private.get_mut(collection) {
            namespace.remove(key);
        }
        Ok(())
    }

    fn get_private_data_by_range(
        &self,
        collection: &CollectionName,
        start_key: &str,
        end_key: &str,
    ) -> LedgerResult<StateIter<'_>> {
        let state = self.ledger.read()?;
        Ok(into_iter(scan(
            state.private.get(collection),
            start_key,
            end_key,
        )))
    }

    fn get_private_data_query_result(
        &self,
        collection: &CollectionName,
        query_json: &str,
    ) -> LedgerResult<StateIter<'_>> {
        let state = self.ledger.read()?;
        Ok(into_iter(query(state.private.get(collection), query_json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(name: &str) -> CollectionName {
        CollectionName::new(name).unwrap()
    }

    fn keys(iter: StateIter<'_>) -> Vec<String> {
        iter.map(|kv| kv.unwrap().key).collect()
    }

    #[test]
    fn absent_key_reads_as_empty() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("Org1MSP");
        assert!(stub.get_state("missing").unwrap().is_empty());
        assert!(stub
            .get_private_data(&collection("collectionOrg1"), "missing")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn private_collections_are_isolated() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("Org1MSP");
        let org1 = collection("collectionOrg1");
        let org2 = collection("collectionOrg2");

        stub.put_private_data(&org1, "1", b"org1").unwrap();
        stub.put_private_data(&org2, "1", b"org2").unwrap();

        assert_eq!(stub.get_private_data(&org1, "1").unwrap(), b"org1");
        assert_eq!(stub.get_private_data(&org2, "1").unwrap(), b"org2");
        assert!(stub.get_state("1").unwrap().is_empty());
    }

    #[test]
    fn range_scan_honours_bounds() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("Org1MSP");
        for key in ["a", "b", "c", "d"] {
            stub.put_state(key, key.as_bytes()).unwrap();
        }

        assert_eq!(keys(stub.get_state_by_range("", "").unwrap()), ["a", "b", "c", "d"]);
        assert_eq!(keys(stub.get_state_by_range("b", "d").unwrap()), ["b", "c"]);
        assert_eq!(keys(stub.get_state_by_range("c", "").unwrap()), ["c", "d"]);
        assert!(keys(stub.get_state_by_range("d", "a").unwrap()).is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("Org1MSP");
        stub.put_state("1", b"x").unwrap();
        stub.delete_state("1").unwrap();
        stub.delete_state("1").unwrap();
        stub.delete_private_data(&collection("collectionOrg1"), "1")
            .unwrap();
        assert!(stub.get_state("1").unwrap().is_empty());
    }

    #[test]
    fn empty_key_is_rejected_on_write() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("Org1MSP");
        let err = stub.put_state("", b"x").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidKey(_)));
    }

    #[test]
    fn private_query_filters_by_selector() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("Org1MSP");
        let org1 = collection("collectionOrg1");
        stub.put_private_data(&org1, "1", br#"{"patientID":"p1"}"#)
            .unwrap();
        stub.put_private_data(&org1, "2", br#"{"patientID":"p2"}"#)
            .unwrap();
        stub.put_private_data(&org1, "3", b"not json").unwrap();

        let found = keys(
            stub.get_private_data_query_result(&org1, r#"{"selector":{"patientID":"p1"}}"#)
                .unwrap(),
        );
        assert_eq!(found, ["1"]);
    }

    #[test]
    fn offline_ledger_fails_every_call() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("Org1MSP");
        ledger.set_offline(true);

        assert!(matches!(
            stub.get_state("1").unwrap_err(),
            LedgerError::Unavailable(_)
        ));
        assert!(matches!(
            stub.put_state("1", b"x").unwrap_err(),
            LedgerError::Unavailable(_)
        ));

        ledger.set_offline(false);
        assert!(stub.get_state("1").is_ok());
    }

    #[test]
    fn empty_msp_id_is_missing_creator() {
        let ledger = MemoryLedger::new();
        let stub = ledger.transaction("");
        assert!(matches!(
            stub.msp_id().unwrap_err(),
            LedgerError::MissingCreator
        ));
    }
}
