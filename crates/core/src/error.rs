use medledger_shim::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Medical data with ID {0} does not exist.")]
    NotExists(String),
    #[error("no private data collection is configured for MSP id {0}")]
    PartitionUnresolved(String),
    #[error("ledger call failed: {0}")]
    StoreUnavailable(#[from] LedgerError),
    #[error("invalid caller identity: {0}")]
    InvalidIdentity(medledger_types::TextError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to serialize medical record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize medical record: {0}")]
    Deserialization(serde_json::Error),

    #[error("failed to read collection config: {0}")]
    ConfigRead(std::io::Error),
    #[error("invalid collection config: {0}")]
    InvalidConfig(String),

    #[error("unknown contract function: {0}")]
    UnknownFunction(String),
    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
