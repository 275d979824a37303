//! Query model
//!
//! A [`Query`] is the parameter set sent to a collection endpoint. Queries are
//! normalized against a resource's default table and serialized into a
//! [`QueryKey`], which indexes cached results and in-flight request state.
//!
//! # Module Structure
//!
//! - [`normalize`] - Default stripping and canonical key serialization

pub mod normalize;

pub use normalize::{normalize, serialize};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Parameter name that asks the API to embed linked resources
pub const EMBED_PARAM: &str = "_embed";

/// Filter/pagination parameters for a collection request.
///
/// Parameters are kept sorted by name, so two queries holding the same
/// parameters are equal no matter the order they were built in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, Value>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copy of this query with `_embed=true` merged in, as sent on the wire
    pub fn embedded(&self) -> Self {
        self.clone().with(EMBED_PARAM, true)
    }

    /// Parse `key=value` pairs as given on the command line.
    ///
    /// Values that look like integers or booleans are typed accordingly,
    /// everything else is kept as a string.
    pub fn from_pairs<I, S>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut query = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let Some((key, raw)) = pair.split_once('=') else {
                return Err(anyhow::anyhow!("Invalid query parameter '{}', expected key=value", pair));
            };
            if key.is_empty() {
                return Err(anyhow::anyhow!("Empty parameter name in '{}'", pair));
            }
            query.insert(key, parse_scalar(raw));
        }
        Ok(query)
    }
}

impl FromIterator<(String, Value)> for Query {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn parse_scalar(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Canonical cache key for a normalized query
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey(String);

impl QueryKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
