//! JSON snapshots of a [`MemoryLedger`], so local runs keep state between invocations.
//!
//! Values are opaque bytes and are stored base64 encoded:
//!
//! ```text
//! {
//!   "public":  { "<key>": "<base64>" },
//!   "private": { "<collection>": { "<key>": "<base64>" } }
//! }
//! ```

use super::{MemoryLedger, Namespace, WorldState};
use crate::{LedgerError, LedgerResult};
use base64::{engine::general_purpose, Engine as _};
use medledger_types::CollectionName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

type EncodedNamespace = BTreeMap<String, String>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    public: EncodedNamespace,
    #[serde(default)]
    private: BTreeMap<CollectionName, EncodedNamespace>,
}

fn encode(namespace: &Namespace) -> EncodedNamespace {
    namespace
        .iter()
        .map(|(key, value)| (key.clone(), general_purpose::STANDARD.encode(value)))
        .collect()
}

fn decode(namespace: EncodedNamespace) -> LedgerResult<Namespace> {
    namespace
        .into_iter()
        .map(|(key, value)| match general_purpose::STANDARD.decode(value) {
            Ok(bytes) => Ok((key, bytes)),
            Err(source) => Err(LedgerError::SnapshotEncoding { key, source }),
        })
        .collect()
}

impl MemoryLedger {
    /// Loads a ledger from `path`. A missing file yields an empty ledger.
    pub fn load_snapshot(path: &Path) -> LedgerResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no ledger snapshot at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(LedgerError::SnapshotRead(e)),
        };

        let snapshot: Snapshot =
            serde_json::from_str(&contents).map_err(LedgerError::SnapshotFormat)?;

        let mut private = BTreeMap::new();
        for (collection, namespace) in snapshot.private {
            private.insert(collection, decode(namespace)?);
        }

        Ok(Self::from_state(WorldState {
            public: decode(snapshot.public)?,
            private,
        }))
    }

    /// Writes the current ledger state to `path`, replacing any existing file.
    pub fn save_snapshot(&self, path: &Path) -> LedgerResult<()> {
        let snapshot = {
            let state = self.read()?;
            Snapshot {
                public: encode(&state.public),
                private: state
                    .private
                    .iter()
                    .map(|(collection, namespace)| (collection.clone(), encode(namespace)))
                    .collect(),
            }
        };

        let contents =
            serde_json::to_string_pretty(&snapshot).map_err(LedgerError::SnapshotFormat)?;
        fs::write(path, contents).map_err(LedgerError::SnapshotWrite)
    }
}
