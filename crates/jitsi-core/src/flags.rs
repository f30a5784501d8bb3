use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::BridgeError;

/// A feature flag value as the engine accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFlag {
    Bool(bool),
    /// The engine stores integer flags as 32-bit ints.
    Int(i32),
}

impl FeatureFlag {
    /// Coerce one untyped flag value.
    ///
    /// Booleans (and the strings `"true"`/`"false"`) become [`FeatureFlag::Bool`];
    /// integers and base-10 integer strings that fit in an `i32` become
    /// [`FeatureFlag::Int`]. Everything else is rejected.
    pub fn coerce(key: &str, value: &Value) -> Result<Self, BridgeError> {
        let invalid = || BridgeError::FeatureFlag {
            key: key.to_string(),
            value: value.to_string(),
        };

        match value {
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Int)
                .ok_or_else(invalid),
            Value::String(s) => match s.as_str() {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                other => other.parse::<i32>().map(Self::Int).map_err(|_| invalid()),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => Err(invalid()),
        }
    }
}

/// Coerced feature flags, keyed by flag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlagSet {
    flags: BTreeMap<String, FeatureFlag>,
}

impl FeatureFlagSet {
    pub fn coerce(raw: &Map<String, Value>) -> Result<Self, BridgeError> {
        let flags = raw
            .iter()
            .map(|(key, value)| FeatureFlag::coerce(key, value).map(|flag| (key.clone(), flag)))
            .collect::<Result<BTreeMap<_, _>, BridgeError>>()?;
        Ok(Self { flags })
    }

    pub fn get(&self, key: &str) -> Option<FeatureFlag> {
        self.flags.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureFlag)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
