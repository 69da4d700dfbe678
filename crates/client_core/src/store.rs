//! Address store: the committed list plus the last error message.

use shared::domain::{Address, AddressId};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Owned state container for committed addresses.
///
/// # Invariants
/// - No two entries share a normalized (first name, last name) pair.
/// - No two entries share an id.
/// - `error` describes the most recent mutation attempt only; every successful
///   mutation clears it.
#[derive(Debug, Clone, Default)]
pub struct AddressStore {
    addresses: Vec<Address>,
    error: Option<String>,
}

impl AddressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|address| &address.id == id)
    }

    /// Appends `candidate` unless it duplicates an existing person or id.
    ///
    /// On rejection the list is untouched and `error` carries the message.
    pub fn add_address(&mut self, candidate: Address) -> Result<(), StoreError> {
        if let Err(err) = self.check_candidate(&candidate) {
            warn!(id = %candidate.id, reason = ?err, "address rejected by store");
            self.error = Some(err.to_string());
            return Err(err);
        }

        debug!(id = %candidate.id, "address added");
        self.addresses.push(candidate);
        self.error = None;
        Ok(())
    }

    fn check_candidate(&self, candidate: &Address) -> Result<(), StoreError> {
        if !candidate.has_person() {
            return Err(StoreError::MissingPerson);
        }
        if self.get(&candidate.id).is_some() {
            return Err(StoreError::DuplicateId(candidate.id.clone()));
        }
        let key = candidate.person_key();
        if self
            .addresses
            .iter()
            .any(|existing| existing.person_key() == key)
        {
            return Err(StoreError::DuplicatePerson {
                first_name: candidate.first_name.clone(),
                last_name: candidate.last_name.clone(),
            });
        }
        Ok(())
    }

    /// Removes the entry with `id`.
    ///
    /// Returns `false` and leaves the store (error included) untouched when no
    /// entry matches.
    pub fn remove_address(&mut self, id: &AddressId) -> bool {
        let Some(index) = self.addresses.iter().position(|a| &a.id == id) else {
            return false;
        };
        self.addresses.remove(index);
        self.error = None;
        debug!(%id, "address removed");
        true
    }

    /// Replaces the whole list. Used when loading persisted state.
    ///
    /// Entries that would break the person or id uniqueness of the entries
    /// before them are dropped with a warning; the first occurrence wins.
    pub fn replace_all(&mut self, addresses: Vec<Address>) {
        self.addresses = Vec::with_capacity(addresses.len());
        self.error = None;
        for address in addresses {
            match self.check_candidate(&address) {
                Ok(()) => self.addresses.push(address),
                Err(err) => {
                    warn!(id = %address.id, reason = ?err, "dropping loaded address")
                }
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
