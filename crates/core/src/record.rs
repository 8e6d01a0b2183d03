//! Medical record wire model.
//!
//! Records are stored on the ledger as JSON objects using the field names below. The key a
//! record is stored under is always its `id`.

use crate::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicalRecord {
    pub id: String,
    #[serde(rename = "patientID")]
    pub patient_id: String,
    #[serde(rename = "patientName")]
    pub patient_name: String,
    pub diagnosis: String,
    pub medications: Vec<String>,
}

impl MedicalRecord {
    pub fn to_bytes(&self) -> RecordResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(RecordError::Serialization)
    }

    pub fn from_bytes(bytes: &[u8]) -> RecordResult<Self> {
        serde_json::from_slice(bytes).map_err(RecordError::Deserialization)
    }
}

/// Records seeded into the caller's collection by `initLedger`.
pub fn sample_records() -> [MedicalRecord; 2] {
    [
        MedicalRecord {
            id: "1".into(),
            patient_id: "patient1".into(),
            patient_name: "John Doe".into(),
            diagnosis: "Fever".into(),
            medications: vec!["Medicine A".into(), "Medicine B".into()],
        },
        MedicalRecord {
            id: "2".into(),
            patient_id: "patient2".into(),
            patient_name: "Jane Smith".into(),
            diagnosis: "Headache".into(),
            medications: vec!["Medicine C".into(), "Medicine D".into()],
        },
    ]
}

/// One entry of a full partition scan.
///
/// Partitions may hold values that are not medical records (legacy or foreign entries).
/// Those are passed through untouched instead of failing the scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEntry {
    Decoded(MedicalRecord),
    Raw(Vec<u8>),
}

impl ScanEntry {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match MedicalRecord::from_bytes(&bytes) {
            Ok(record) => ScanEntry::Decoded(record),
            Err(_) => ScanEntry::Raw(bytes),
        }
    }
}

// Raw values that are JSON are emitted as-is; anything else renders as a (lossy) UTF-8 string.
impl Serialize for ScanEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ScanEntry::Decoded(record) => record.serialize(serializer),
            ScanEntry::Raw(bytes) => match serde_json::from_slice::<serde_json::Value>(bytes) {
                Ok(value) => value.serialize(serializer),
                Err(_) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_ledger_field_names() {
        let record = sample_records()[0].clone();
        let value: serde_json::Value = serde_json::from_slice(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(value["patientID"], "patient1");
        assert_eq!(value["patientName"], "John Doe");
        assert_eq!(value["medications"][1], "Medicine B");
    }

    #[test]
    fn scan_entry_falls_back_to_raw() {
        let entry = ScanEntry::from_bytes(b"legacy value".to_vec());
        assert_eq!(entry, ScanEntry::Raw(b"legacy value".to_vec()));

        let json = serde_json::to_string(&[entry]).unwrap();
        assert_eq!(json, r#"["legacy value"]"#);
    }

    #[test]
    fn scan_entry_decodes_records() {
        let record = sample_records()[1].clone();
        let entry = ScanEntry::from_bytes(record.to_bytes().unwrap());
        assert_eq!(entry, ScanEntry::Decoded(record.clone()));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::to_value(&record).unwrap()
        );
    }

    #[test]
    fn records_with_extra_fields_keep_them() {
        let bytes = br#"{"id":"1","patientID":"p1","patientName":"A","diagnosis":"X","medications":[],"allergies":["penicillin"]}"#;
        let entry = ScanEntry::from_bytes(bytes.to_vec());
        assert!(matches!(entry, ScanEntry::Raw(_)));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["allergies"][0], "penicillin");
        assert_eq!(value["patientID"], "p1");
    }

    #[test]
    fn json_entries_that_are_not_records_stay_json() {
        let entry = ScanEntry::from_bytes(br#"{"kind":"note","text":"hello"}"#.to_vec());
        assert!(matches!(entry, ScanEntry::Raw(_)));

        let json = serde_json::to_string(&[entry]).unwrap();
        assert_eq!(json, r#"[{"kind":"note","text":"hello"}]"#);
    }
}
