//! Configuration maps and typed argument access.
//!
//! On the wire a config map is a flat JSON object. A key that starts with
//! [`VARIADIC_MARKER`] holds an ordered sequence feeding the type's variadic
//! parameter (at most one per map). [`ConfigMap::arguments`] splits the wire
//! form into [`Arguments`], so factories never look at key prefixes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ArgumentError;

/// Prefix marking the variadic key of a config map.
pub const VARIADIC_MARKER: char = '*';

/// A config map exactly as it appears in a profile document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap(Map<String, Value>);

impl ConfigMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named parameter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Add the variadic sequence under `*name`.
    #[must_use]
    pub fn with_variadic(mut self, name: &str, values: Vec<Value>) -> Self {
        self.0
            .insert(format!("{VARIADIC_MARKER}{name}"), Value::Array(values));
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of the single variadic key, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MultipleVariadic`] when more than one key
    /// carries the variadic marker.
    pub fn variadic_key(&self) -> Result<Option<&str>, ArgumentError> {
        let mut found: Option<&str> = None;
        for key in self.0.keys() {
            if !key.starts_with(VARIADIC_MARKER) {
                continue;
            }
            if let Some(first) = found {
                return Err(ArgumentError::MultipleVariadic {
                    first: first.to_string(),
                    second: key.clone(),
                });
            }
            found = Some(key);
        }
        Ok(found)
    }

    /// Split into named parameters and the variadic sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MultipleVariadic`] for more than one
    /// variadic key, or [`ArgumentError::Invalid`] when the variadic value
    /// is not an array.
    pub fn arguments(&self) -> Result<Arguments, ArgumentError> {
        let variadic_key = self.variadic_key()?.map(str::to_string);
        let mut named = Map::new();
        let mut variadic = None;
        for (key, value) in &self.0 {
            if Some(key) == variadic_key.as_ref() {
                let Value::Array(values) = value else {
                    return Err(ArgumentError::Invalid {
                        name: key.clone(),
                        expected: "a sequence".to_string(),
                    });
                };
                variadic = Some(Variadic {
                    name: key.trim_start_matches(VARIADIC_MARKER).to_string(),
                    values: values.clone(),
                });
            } else {
                named.insert(key.clone(), value.clone());
            }
        }
        Ok(Arguments { named, variadic })
    }
}

/// The ordered positional sequence of a config map.
#[derive(Debug, Clone, PartialEq)]
pub struct Variadic {
    /// Parameter name without the marker.
    pub name: String,
    pub values: Vec<Value>,
}

/// Parameters handed to a registry factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    named: Map<String, Value>,
    variadic: Option<Variadic>,
}

impl Arguments {
    #[must_use]
    pub fn variadic(&self) -> Option<&Variadic> {
        self.variadic.as_ref()
    }

    /// Fetch and decode a required named parameter.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::Missing`] when absent, [`ArgumentError::Invalid`]
    /// when it does not decode as `T`.
    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        self.optional(name)?.ok_or_else(|| ArgumentError::Missing {
            name: name.to_string(),
        })
    }

    /// Fetch and decode an optional named parameter. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] when present but not decodable as `T`.
    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ArgumentError> {
        match self.named.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(name, value.clone()).map(Some),
        }
    }

    /// Decode all named parameters at once into a struct.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] when the named map does not decode as `T`.
    pub fn named_as<T: DeserializeOwned>(&self) -> Result<T, ArgumentError> {
        decode("config", Value::Object(self.named.clone()))
    }

    /// Decode every element of the variadic sequence; empty when absent.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::Invalid`] when an element does not decode as `T`.
    pub fn variadic_values<T: DeserializeOwned>(&self) -> Result<Vec<T>, ArgumentError> {
        let Some(variadic) = &self.variadic else {
            return Ok(Vec::new());
        };
        variadic
            .values
            .iter()
            .map(|value| decode(&variadic.name, value.clone()))
            .collect()
    }

    /// Reject named parameters outside `allowed`, and any variadic sequence
    /// unless `accepts_variadic`.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::Unexpected`] or [`ArgumentError::UnexpectedVariadic`].
    pub fn expect_only(&self, allowed: &[&str], accepts_variadic: bool) -> Result<(), ArgumentError> {
        if let Some(name) = self.named.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(ArgumentError::Unexpected { name: name.clone() });
        }
        match &self.variadic {
            Some(variadic) if !accepts_variadic => Err(ArgumentError::UnexpectedVariadic {
                name: variadic.name.clone(),
            }),
            _ => Ok(()),
        }
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: Value) -> Result<T, ArgumentError> {
    serde_json::from_value(value).map_err(|err| ArgumentError::Invalid {
        name: name.to_string(),
        expected: err.to_string(),
    })
}
