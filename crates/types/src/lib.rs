//! Validated text types shared across the medledger crates.
//!
//! Organisational identities and collection names are both plain strings on the wire, but an
//! empty value for either is never meaningful: an empty MSP id would match every collection
//! policy by containment, and an empty collection name cannot be addressed by the ledger.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

macro_rules! validated_text {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Creates a new value from the given input.
            ///
            /// The input is trimmed of leading and trailing whitespace. If the trimmed
            /// result is empty, `TextError::Empty` is returned.
            pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
                let trimmed = input.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(TextError::Empty($label));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the inner string as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $name::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

validated_text!(
    /// Membership service provider identifier of the organisation that issued a transaction.
    ///
    /// Treated as an opaque token; the only operation performed on it is containment matching
    /// against collection policies.
    MspId,
    "MSP id"
);

validated_text!(
    /// Name of a private data collection on the ledger.
    CollectionName,
    "collection name"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msp_id_is_trimmed() {
        let id = MspId::new("  Org1MSP \n").unwrap();
        assert_eq!(id.as_str(), "Org1MSP");
        assert_eq!(id.to_string(), "Org1MSP");
    }

    #[test]
    fn whitespace_only_is_rejected() {
        let err = MspId::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "MSP id cannot be empty");

        let err = CollectionName::new("").unwrap_err();
        assert_eq!(err.to_string(), "collection name cannot be empty");
    }

    #[test]
    fn deserialize_rejects_empty_collection_name() {
        let result: Result<CollectionName, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());

        let name: CollectionName = serde_json::from_str("\"collectionOrg1\"").unwrap();
        assert_eq!(name.as_str(), "collectionOrg1");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"collectionOrg1\"");
    }
}
