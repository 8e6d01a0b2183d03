//! Transaction dispatch.
//!
//! The ledger invokes the contract by function name with string arguments. `Dispatcher`
//! maps those names onto [`MedicalRecordService`] operations and encodes the response
//! payload as JSON. Write operations return an empty payload.
//!
//! | Function                    | Arguments                                                  |
//! |-----------------------------|------------------------------------------------------------|
//! | `initLedger`                | none                                                       |
//! | `getAllMedicalData`         | none                                                       |
//! | `getMedicalData`            | id                                                         |
//! | `getPublicMedicalData`      | id                                                         |
//! | `getMedicalDataByPatientID` | patientID                                                  |
//! | `createMedicalData`         | id, patientID, patientName, diagnosis, medications (JSON)  |
//! | `transferMedicalData`       | id                                                         |
//! | `deletePublicData`          | id                                                         |

use crate::constants::functions;
use crate::record::MedicalRecord;
use crate::service::MedicalRecordService;
use crate::{RecordError, RecordResult};
use medledger_shim::ChaincodeStub;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct Dispatcher {
    service: MedicalRecordService,
}

fn args<'a, const N: usize>(
    function: &str,
    arguments: &'a [String],
) -> RecordResult<&'a [String; N]> {
    <&[String; N]>::try_from(arguments).map_err(|_| RecordError::ArgumentCount {
        function: function.to_string(),
        expected: N,
        actual: arguments.len(),
    })
}

fn to_payload<T: Serialize + ?Sized>(value: &T) -> RecordResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(RecordError::Serialization)
}

fn parse_medications(raw: &str) -> RecordResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        RecordError::InvalidInput(format!("medications must be a JSON array of strings: {e}"))
    })
}

impl Dispatcher {
    pub fn new(service: MedicalRecordService) -> Self {
        Self { service }
    }

    /// Runs `function` with `arguments` in the transaction context `stub`.
    ///
    /// # Errors
    ///
    /// - `RecordError::UnknownFunction` for names the contract does not define
    /// - `RecordError::ArgumentCount` when the argument count is wrong
    /// - any error of the underlying service operation
    pub fn invoke<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        function: &str,
        arguments: &[String],
    ) -> RecordResult<Vec<u8>> {
        tracing::debug!(function, args = arguments.len(), "invoking contract function");

        match function {
            functions::INIT_LEDGER => {
                args::<0>(function, arguments)?;
                self.service.initialise(stub)?;
                Ok(Vec::new())
            }
            functions::GET_ALL => {
                args::<0>(function, arguments)?;
                to_payload(&self.service.list_all(stub)?)
            }
            functions::GET => {
                let [id] = args::<1>(function, arguments)?;
                to_payload(&self.service.get(stub, id)?)
            }
            functions::GET_PUBLIC => {
                let [id] = args::<1>(function, arguments)?;
                to_payload(&self.service.get_public(stub, id)?)
            }
            functions::GET_BY_PATIENT => {
                let [patient_id] = args::<1>(function, arguments)?;
                to_payload(&self.service.query_by_patient(stub, patient_id)?)
            }
            functions::CREATE => {
                let [id, patient_id, patient_name, diagnosis, medications] =
                    args::<5>(function, arguments)?;
                let record = MedicalRecord {
                    id: id.clone(),
                    patient_id: patient_id.clone(),
                    patient_name: patient_name.clone(),
                    diagnosis: diagnosis.clone(),
                    medications: parse_medications(medications)?,
                };
                self.service.create(stub, &record)?;
                Ok(Vec::new())
            }
            functions::TRANSFER => {
                let [id] = args::<1>(function, arguments)?;
                self.service.transfer_to_public(stub, id)?;
                Ok(Vec::new())
            }
            functions::DELETE_PUBLIC => {
                let [id] = args::<1>(function, arguments)?;
                self.service.delete_public(stub, id)?;
                Ok(Vec::new())
            }
            other => Err(RecordError::UnknownFunction(other.to_string())),
        }
    }
}
