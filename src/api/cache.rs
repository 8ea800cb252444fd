//! Tag-indexed cache of query results.
//!
//! Results are stored as JSON values under a tag and a key derived from the
//! query parameters. Mutations invalidate whole tags, so every cached page of
//! a listing is dropped at once.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::error::Result;

/// Group of cached queries that are invalidated together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CacheTag {
    Blueprints,
    Repositories,
    Templates,
}

#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: HashMap<CacheTag, HashMap<String, serde_json::Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value, if present and still of the expected shape
    pub fn get<T: DeserializeOwned>(&self, tag: CacheTag, key: &str) -> Option<T> {
        let value = self.entries.get(&tag)?.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn insert<T: Serialize>(&mut self, tag: CacheTag, key: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.entries.entry(tag).or_default().insert(key.into(), value);
        Ok(())
    }

    /// Drop every entry under `tag`; returns how many were dropped
    pub fn invalidate(&mut self, tag: CacheTag) -> usize {
        let dropped = self.entries.remove(&tag).map_or(0, |entries| entries.len());
        debug!(%tag, dropped, "cache invalidated");
        dropped
    }

    pub fn len(&self, tag: CacheTag) -> usize {
        self.entries.get(&tag).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(HashMap::is_empty)
    }
}

/// Stable cache key for a list of query pairs
pub fn query_key(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}
