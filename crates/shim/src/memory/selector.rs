//! Minimal Mango selector evaluation for rich queries.
//!
//! Supports `{"selector": {field: value, ...}}` where each condition is either a literal
//! (compared for equality) or `{"$eq": value}`. Conditions apply to top-level fields of
//! JSON object documents; values that are not JSON objects never match.

use crate::{LedgerError, LedgerResult};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct Selector {
    conditions: Vec<(String, Value)>,
}

impl Selector {
    pub(crate) fn parse(query: &str) -> LedgerResult<Self> {
        let document: Value = serde_json::from_str(query)
            .map_err(|e| LedgerError::InvalidQuery(format!("query is not JSON: {e}")))?;

        let selector = document
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                LedgerError::InvalidQuery("query must contain a \"selector\" object".into())
            })?;

        let mut conditions = Vec::with_capacity(selector.len());
        for (field, condition) in selector {
            if field.starts_with('$') {
                return Err(LedgerError::InvalidQuery(format!(
                    "unsupported combination operator {field}"
                )));
            }
            conditions.push((field.clone(), expected_value(field, condition)?));
        }

        Ok(Self { conditions })
    }

    pub(crate) fn matches(&self, value: &[u8]) -> bool {
        let Ok(Value::Object(document)) = serde_json::from_slice::<Value>(value) else {
            return false;
        };

        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

fn expected_value(field: &str, condition: &Value) -> LedgerResult<Value> {
    let Value::Object(operators) = condition else {
        return Ok(condition.clone());
    };

    if !operators.keys().any(|k| k.starts_with('$')) {
        return Ok(condition.clone());
    }

    match operators.get("$eq") {
        Some(value) if operators.len() == 1 => Ok(value.clone()),
        _ => Err(LedgerError::InvalidQuery(format!(
            "unsupported operator for field {field}"
        ))),
    }
}
