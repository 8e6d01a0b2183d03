//! Caller identity resolution.

use crate::{RecordError, RecordResult};
use medledger_shim::ChaincodeStub;
use medledger_types::MspId;

/// Returns the MSP id of the organisation that submitted the current transaction.
///
/// Substrate failures propagate unchanged; an empty identity is rejected, since it would
/// match every collection policy by containment.
pub fn caller_msp_id<S: ChaincodeStub + ?Sized>(stub: &S) -> RecordResult<MspId> {
    let raw = stub.msp_id()?;
    MspId::new(raw).map_err(RecordError::InvalidIdentity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medledger_shim::{LedgerError, MemoryLedger};

    #[test]
    fn resolves_submitter_msp_id() {
        let ledger = MemoryLedger::new();
        let id = caller_msp_id(&ledger.transaction("Org2MSP")).unwrap();
        assert_eq!(id.as_str(), "Org2MSP");
    }

    #[test]
    fn whitespace_identity_is_invalid() {
        let ledger = MemoryLedger::new();
        let err = caller_msp_id(&ledger.transaction("   ")).unwrap_err();
        assert!(matches!(err, RecordError::InvalidIdentity(_)));
    }

    #[test]
    fn substrate_failure_propagates() {
        let ledger = MemoryLedger::new();
        let err = caller_msp_id(&ledger.transaction("")).unwrap_err();
        assert!(matches!(
            err,
            RecordError::StoreUnavailable(LedgerError::MissingCreator)
        ));
    }
}
