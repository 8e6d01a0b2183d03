//! Private data collection directory.
//!
//! Maps an organisation's MSP id to the private data collection it reads and writes. The
//! directory is built once from the collection configuration file at startup and then shared
//! read-only by every transaction.
//!
//! ## Configuration Format
//!
//! The file is a JSON array (or YAML sequence for `.yaml`/`.yml` paths) of Fabric-style
//! collection definitions:
//!
//! ```text
//! [
//!   {
//!     "name": "collectionOrg1",
//!     "policy": "OR('Org1MSP.member')",
//!     "requiredPeerCount": 0,
//!     "maxPeerCount": 3,
//!     "blockToLive": 0,
//!     "memberOnlyRead": true
//!   }
//! ]
//! ```
//!
//! `policy` may also be a list of identity strings. An MSP id matches a definition when it
//! appears within the policy expression, or within any list element. Definitions are scanned
//! in declared order and the first match wins.

use crate::{RecordError, RecordResult};
use medledger_types::{CollectionName, MspId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Membership policy of a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Policy {
    /// Signature policy expression, e.g. `OR('Org1MSP.member')`.
    Expression(String),
    /// Identity strings, each of which may name a member.
    Members(Vec<String>),
}

impl Policy {
    /// Whether `msp_id` appears within this policy.
    pub fn admits(&self, msp_id: &MspId) -> bool {
        match self {
            Policy::Expression(expression) => expression.contains(msp_id.as_str()),
            Policy::Members(members) => members
                .iter()
                .any(|member| member.contains(msp_id.as_str())),
        }
    }
}

/// A single collection definition from the configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDefinition {
    pub name: CollectionName,
    pub policy: Policy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_peer_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_peer_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_to_live: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_only_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_only_write: Option<bool>,
}

impl CollectionDefinition {
    pub fn new(name: CollectionName, policy: Policy) -> Self {
        Self {
            name,
            policy,
            required_peer_count: None,
            max_peer_count: None,
            block_to_live: None,
            member_only_read: None,
            member_only_write: None,
        }
    }
}

/// Read-only lookup from MSP id to private data collection.
#[derive(Clone, Debug)]
pub struct CollectionDirectory {
    definitions: Vec<CollectionDefinition>,
}

impl CollectionDirectory {
    /// Builds a directory from definitions in priority order.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidConfig` if two definitions share a name.
    pub fn from_definitions(definitions: Vec<CollectionDefinition>) -> RecordResult<Self> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.name.as_str()) {
                return Err(RecordError::InvalidConfig(format!(
                    "duplicate collection name {}",
                    definition.name
                )));
            }
        }

        Ok(Self { definitions })
    }

    /// Parses a JSON collection configuration.
    pub fn from_json_str(json_text: &str) -> RecordResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let definitions =
            serde_path_to_error::deserialize::<_, Vec<CollectionDefinition>>(&mut deserializer)
                .map_err(|err| config_error(err.path().to_string(), err.into_inner()))?;
        Self::from_definitions(definitions)
    }

    /// Parses a YAML collection configuration.
    pub fn from_yaml_str(yaml_text: &str) -> RecordResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let definitions =
            serde_path_to_error::deserialize::<_, Vec<CollectionDefinition>>(deserializer)
                .map_err(|err| config_error(err.path().to_string(), err.into_inner()))?;
        Self::from_definitions(definitions)
    }

    /// Loads the collection configuration at `path`.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as JSON.
    pub fn load(path: &Path) -> RecordResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(RecordError::ConfigRead)?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );

        let directory = if is_yaml {
            Self::from_yaml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        tracing::info!(
            "loaded {} collection definition(s) from {}",
            directory.definitions.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn definitions(&self) -> &[CollectionDefinition] {
        &self.definitions
    }

    /// Returns the first collection whose policy admits `msp_id`, if any.
    pub fn resolve(&self, msp_id: &MspId) -> Option<&CollectionDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.policy.admits(msp_id))
    }

    /// Like [`resolve`](Self::resolve), but failing with `PartitionUnresolved` when the
    /// identity has no collection.
    pub fn collection_for(&self, msp_id: &MspId) -> RecordResult<&CollectionName> {
        self.resolve(msp_id)
            .map(|definition| &definition.name)
            .ok_or_else(|| RecordError::PartitionUnresolved(msp_id.to_string()))
    }
}

fn config_error(path: String, source: impl std::fmt::Display) -> RecordError {
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    RecordError::InvalidConfig(format!("{path}: {source}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TWO_ORGS: &str = r#"[
        {
            "name": "collectionOrg1",
            "policy": "OR('Org1MSP.member')",
            "requiredPeerCount": 0,
            "maxPeerCount": 3,
            "blockToLive": 1000000,
            "memberOnlyRead": true
        },
        {
            "name": "collectionOrg2",
            "policy": "OR('Org2MSP.member')"
        }
    ]"#;

    fn msp(id: &str) -> MspId {
        MspId::new(id).unwrap()
    }

    #[test]
    fn resolves_collection_by_policy_containment() {
        let directory = CollectionDirectory::from_json_str(TWO_ORGS).unwrap();

        let org1 = directory.resolve(&msp("Org1MSP")).unwrap();
        assert_eq!(org1.name.as_str(), "collectionOrg1");
        assert_eq!(org1.max_peer_count, Some(3));
        assert_eq!(org1.member_only_read, Some(true));

        let org2 = directory.collection_for(&msp("Org2MSP")).unwrap();
        assert_eq!(org2.as_str(), "collectionOrg2");
    }

    #[test]
    fn first_matching_definition_wins() {
        let directory = CollectionDirectory::from_definitions(vec![
            CollectionDefinition::new(
                CollectionName::new("shared").unwrap(),
                Policy::Expression("OR('Org1MSP.member', 'Org2MSP.member')".into()),
            ),
            CollectionDefinition::new(
                CollectionName::new("org1only").unwrap(),
                Policy::Expression("OR('Org1MSP.member')".into()),
            ),
        ])
        .unwrap();

        for _ in 0..3 {
            assert_eq!(
                directory.collection_for(&msp("Org1MSP")).unwrap().as_str(),
                "shared"
            );
            assert_eq!(
                directory.collection_for(&msp("Org2MSP")).unwrap().as_str(),
                "shared"
            );
        }
    }

    #[test]
    fn member_list_policy_matches_any_element() {
        let directory = CollectionDirectory::from_json_str(
            r#"[{"name": "collectionOrg3", "policy": ["Org3MSP.member", "Org3MSP.admin"]}]"#,
        )
        .unwrap();

        assert!(directory.resolve(&msp("Org3MSP")).is_some());
        assert!(directory.resolve(&msp("Org1MSP")).is_none());
    }

    #[test]
    fn unknown_identity_is_partition_unresolved() {
        let directory = CollectionDirectory::from_json_str(TWO_ORGS).unwrap();
        let err = directory.collection_for(&msp("Org9MSP")).unwrap_err();
        match err {
            RecordError::PartitionUnresolved(id) => assert_eq!(id, "Org9MSP"),
            other => panic!("expected PartitionUnresolved, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_reports_field_path() {
        let err = CollectionDirectory::from_json_str(r#"[{"name": "", "policy": "x"}]"#)
            .unwrap_err();
        match err {
            RecordError::InvalidConfig(msg) => assert!(msg.contains("name"), "{msg}"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }

        let err = CollectionDirectory::from_json_str(r#"[{"name": "a"}]"#).unwrap_err();
        assert!(matches!(err, RecordError::InvalidConfig(_)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = CollectionDirectory::from_json_str(
            r#"[{"name": "a", "policy": "Org1MSP"}, {"name": "a", "policy": "Org2MSP"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::InvalidConfig(_)));
    }

    #[test]
    fn loads_json_and_yaml_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let json_path = temp_dir.path().join("collection_config.json");
        std::fs::write(&json_path, TWO_ORGS).unwrap();
        let directory = CollectionDirectory::load(&json_path).unwrap();
        assert_eq!(directory.definitions().len(), 2);

        let yaml_path = temp_dir.path().join("collection_config.yaml");
        std::fs::write(
            &yaml_path,
            "- name: collectionOrg1\n  policy: OR('Org1MSP.member')\n  memberOnlyRead: true\n",
        )
        .unwrap();
        let directory = CollectionDirectory::load(&yaml_path).unwrap();
        assert_eq!(
            directory.collection_for(&msp("Org1MSP")).unwrap().as_str(),
            "collectionOrg1"
        );
    }

    #[test]
    fn missing_file_is_config_read_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = CollectionDirectory::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RecordError::ConfigRead(_)));
    }
}
