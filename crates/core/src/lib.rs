//! # medledger core
//!
//! Collection routing and record lifecycle for medical data shared between organisations on
//! one ledger.
//!
//! Each organisation writes to its own private data collection, chosen from its MSP id via
//! the [`CollectionDirectory`]. Records can be looked up by id or by patient, and can be
//! copied one way into public state, from where they can later be deleted.
//!
//! - [`identity`]: caller MSP id
//! - [`collections`]: MSP id to collection mapping, loaded once at startup
//! - [`store`]: structured record storage over the ledger stub
//! - [`service`]: the contract operations
//! - [`dispatch`]: function-name dispatch as invoked by the ledger
//!
//! **No substrate concerns**: ordering, endorsement, commit and conflict detection belong to
//! the ledger behind [`medledger_shim::ChaincodeStub`].

pub mod collections;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod record;
pub mod service;
pub mod store;

pub use collections::{CollectionDefinition, CollectionDirectory, Policy};
pub use config::{resolve_collection_config_path, CoreConfig};
pub use dispatch::Dispatcher;
pub use error::{RecordError, RecordResult};
pub use record::{MedicalRecord, ScanEntry};
pub use service::MedicalRecordService;
pub use store::{Partition, RecordStore};

pub use medledger_types::{CollectionName, MspId};
