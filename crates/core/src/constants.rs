//! Constants used throughout the medledger core crate.

/// Default location of the collection configuration, relative to the working directory.
pub const DEFAULT_COLLECTION_CONFIG: &str = "collection_config.json";

/// Record attribute used for patient lookups in rich queries.
pub const PATIENT_ID_FIELD: &str = "patientID";

/// Contract function names accepted by the dispatcher.
pub mod functions {
    pub const INIT_LEDGER: &str = "initLedger";
    pub const GET_ALL: &str = "getAllMedicalData";
    pub const GET: &str = "getMedicalData";
    pub const GET_PUBLIC: &str = "getPublicMedicalData";
    pub const GET_BY_PATIENT: &str = "getMedicalDataByPatientID";
    pub const CREATE: &str = "createMedicalData";
    pub const TRANSFER: &str = "transferMedicalData";
    pub const DELETE_PUBLIC: &str = "deletePublicData";
}
