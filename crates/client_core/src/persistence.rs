//! Mirrors the address store into a [`KeyValueStore`].

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::domain::{Address, AddressId};
use storage::KeyValueStore;
use tracing::{debug, info};

/// Key under which the committed address list is persisted.
pub const ADDRESSES_KEY: &str = "addresses";

/// Outcome of [`AddressBookSync::persist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Written,
    /// The initial load has not completed, so nothing was written.
    SkippedBeforeLoad,
}

/// Loads the address list once and writes it back after every mutation.
///
/// # Invariants
/// - No write is issued before `load` has completed successfully, so an
///   empty in-memory list never overwrites durable state during startup.
pub struct AddressBookSync {
    store: Arc<dyn KeyValueStore>,
    key: String,
    loaded: bool,
}

impl AddressBookSync {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, ADDRESSES_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads the persisted list. A missing key loads as an empty list.
    ///
    /// Entries saved without an id get a fresh one; stored ids are kept.
    pub async fn load(&mut self) -> Result<Vec<Address>> {
        let value = self
            .store
            .get_item(&self.key)
            .await
            .with_context(|| format!("failed to read persisted '{}'", self.key))?;

        let addresses = match value {
            Some(value) => decode_addresses(value)
                .with_context(|| format!("persisted '{}' is not an address list", self.key))?,
            None => Vec::new(),
        };

        self.loaded = true;
        info!(key = %self.key, count = addresses.len(), "persisted addresses loaded");
        Ok(addresses)
    }

    /// Opens the write gate without reading, for callers that start fresh.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub async fn persist(&self, addresses: &[Address]) -> Result<PersistOutcome> {
        if !self.loaded {
            debug!(key = %self.key, "skipping persist before initial load");
            return Ok(PersistOutcome::SkippedBeforeLoad);
        }

        let value = serde_json::to_value(addresses).context("failed to encode addresses")?;
        self.store
            .set_item(&self.key, value)
            .await
            .with_context(|| format!("failed to write persisted '{}'", self.key))?;
        debug!(key = %self.key, count = addresses.len(), "addresses persisted");
        Ok(PersistOutcome::Written)
    }
}

fn decode_addresses(value: serde_json::Value) -> Result<Vec<Address>> {
    let entries: Vec<serde_json::Value> = serde_json::from_value(value)?;
    entries
        .into_iter()
        .map(|mut entry| {
            let missing_id = entry
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map_or(true, |id| id.trim().is_empty());
            if missing_id {
                if let Some(object) = entry.as_object_mut() {
                    object.insert(
                        "id".to_string(),
                        serde_json::Value::String(AddressId::generate().0),
                    );
                }
            }
            serde_json::from_value::<Address>(entry).map_err(anyhow::Error::from)
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
