//! Two-step flow: find an address, attach a person, save to the address book.
//!
//! # Responsibility
//! - Own the transient search results, selection and form fields.
//! - Validate the person commit before handing it to the [`AddressStore`].
//! - Mirror every committed change through [`AddressBookSync`].
//!
//! # Invariants
//! - Only one error message is visible at a time: the store's error channel.
//! - A search response is applied only when it belongs to the newest search.
//! - Persistence failures never block the in-memory flow; they surface as a
//!   separate warning.

use shared::domain::{Address, AddressId, RawAddress};
use tracing::{debug, info, warn};

use crate::{
    error::{CommitError, FormFieldError, LookupError, SearchFieldsError},
    form_fields::FormFields,
    lookup::AddressLookup,
    normalizer::normalize_addresses,
    persistence::{AddressBookSync, PersistOutcome},
    store::AddressStore,
};

pub const POST_CODE_FIELD: &str = "postCode";
pub const HOUSE_NUMBER_FIELD: &str = "houseNumber";
pub const FIRST_NAME_FIELD: &str = "firstName";
pub const LAST_NAME_FIELD: &str = "lastName";

/// Handle for one in-flight address search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    post_code: String,
    house_number: String,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(usize),
    Failed,
    /// A newer search started before this one finished; its result was dropped.
    Superseded,
}

pub struct AddressBookController<L: AddressLookup> {
    lookup: L,
    sync: AddressBookSync,
    store: AddressStore,
    address_fields: FormFields,
    person_fields: FormFields,
    search_results: Vec<Address>,
    selected: Option<AddressId>,
    latest_search: u64,
    pending_search: Option<u64>,
    persistence_warning: Option<String>,
}

impl<L: AddressLookup> AddressBookController<L> {
    pub fn new(lookup: L, sync: AddressBookSync) -> Self {
        Self {
            lookup,
            sync,
            store: AddressStore::new(),
            address_fields: FormFields::empty(&[POST_CODE_FIELD, HOUSE_NUMBER_FIELD]),
            person_fields: FormFields::empty(&[FIRST_NAME_FIELD, LAST_NAME_FIELD]),
            search_results: Vec::new(),
            selected: None,
            latest_search: 0,
            pending_search: None,
            persistence_warning: None,
        }
    }

    pub fn store(&self) -> &AddressStore {
        &self.store
    }

    pub fn addresses(&self) -> &[Address] {
        self.store.addresses()
    }

    pub fn error(&self) -> Option<&str> {
        self.store.error()
    }

    pub fn persistence_warning(&self) -> Option<&str> {
        self.persistence_warning.as_deref()
    }

    pub fn search_results(&self) -> &[Address] {
        &self.search_results
    }

    pub fn selected(&self) -> Option<&AddressId> {
        self.selected.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.pending_search.is_some()
    }

    pub fn address_fields(&self) -> &FormFields {
        &self.address_fields
    }

    pub fn person_fields(&self) -> &FormFields {
        &self.person_fields
    }

    pub fn on_address_field_change(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), FormFieldError> {
        self.address_fields.on_change(name, value)
    }

    pub fn on_person_field_change(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), FormFieldError> {
        self.person_fields.on_change(name, value)
    }

    /// Loads persisted addresses into the store and opens the write gate.
    ///
    /// Entries committed before the load finished are appended after the
    /// loaded ones and written back; any that collide with a loaded entry are
    /// dropped and reported through the error message. On failure the store
    /// keeps its current list, the gate stays closed and the failure is
    /// reported as a persistence warning.
    pub async fn load_saved_addresses(&mut self) -> anyhow::Result<usize> {
        match self.sync.load().await {
            Ok(addresses) => {
                let committed_early = self.store.addresses().to_vec();
                self.store.replace_all(addresses);
                self.persistence_warning = None;

                let mut merged = 0;
                for address in committed_early {
                    let id = address.id.clone();
                    match self.store.add_address(address) {
                        Ok(()) => merged += 1,
                        Err(err) => {
                            warn!(%id, reason = ?err, "early commit collides with saved address")
                        }
                    }
                }
                if merged > 0 {
                    debug!(merged, "writing back addresses committed before load");
                    self.persist().await;
                }
                Ok(self.store.len())
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "loading persisted addresses failed");
                self.persistence_warning = Some(format!("Saved addresses unavailable: {err}"));
                Err(err)
            }
        }
    }

    pub fn select_address(&mut self, id: AddressId) {
        self.selected = Some(id);
    }

    /// Validates the search form and starts a new search generation.
    ///
    /// Results, selection and error are cleared before the lookup runs. Any
    /// ticket handed out earlier becomes stale.
    pub fn begin_address_search(&mut self) -> Result<SearchTicket, SearchFieldsError> {
        self.store.clear_error();
        self.search_results.clear();
        self.selected = None;
        self.latest_search += 1;
        self.pending_search = None;

        if !self.address_fields.are_all_filled() {
            let err = SearchFieldsError {
                missing: self.address_fields.missing_fields(),
            };
            self.store.set_error(err.to_string());
            return Err(err);
        }

        self.pending_search = Some(self.latest_search);
        Ok(SearchTicket {
            generation: self.latest_search,
            post_code: self.address_fields.trimmed(POST_CODE_FIELD).to_string(),
            house_number: self.address_fields.trimmed(HOUSE_NUMBER_FIELD).to_string(),
        })
    }

    /// Applies the outcome of the search identified by `ticket`.
    pub fn complete_address_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<RawAddress>, LookupError>,
    ) -> SearchOutcome {
        if ticket.generation != self.latest_search {
            debug!(
                generation = ticket.generation,
                latest = self.latest_search,
                "dropping superseded search result"
            );
            return SearchOutcome::Superseded;
        }

        self.pending_search = None;
        self.selected = None;
        match outcome {
            Ok(raw) => {
                self.search_results = normalize_addresses(&raw, &ticket.house_number);
                info!(count = self.search_results.len(), "address search completed");
                SearchOutcome::Found(self.search_results.len())
            }
            Err(err) => {
                warn!(error = %err, "address search failed");
                self.search_results.clear();
                self.store.set_error(err.user_message());
                SearchOutcome::Failed
            }
        }
    }

    /// Runs one full search against the configured lookup.
    pub async fn submit_address_search(&mut self) -> Result<SearchOutcome, SearchFieldsError> {
        let ticket = self.begin_address_search()?;
        let outcome = self
            .lookup
            .find_addresses(&ticket.post_code, &ticket.house_number)
            .await;
        Ok(self.complete_address_search(ticket, outcome))
    }

    /// Merges the selected search result with the person fields and commits it.
    ///
    /// On failure only the error message changes.
    pub async fn submit_person(&mut self) -> Result<AddressId, CommitError> {
        self.store.clear_error();

        let candidate = match self.person_candidate() {
            Ok(candidate) => candidate,
            Err(err) => {
                self.store.set_error(err.to_string());
                return Err(err);
            }
        };

        let id = candidate.id.clone();
        self.store.add_address(candidate)?;
        info!(%id, "person saved to address book");
        self.persist().await;
        Ok(id)
    }

    fn person_candidate(&self) -> Result<Address, CommitError> {
        if !self.person_fields.are_all_filled() {
            return Err(CommitError::MissingNames {
                missing: self.person_fields.missing_fields(),
            });
        }

        let selected = match &self.selected {
            Some(id) if !self.search_results.is_empty() => id,
            _ => return Err(CommitError::NoSelection),
        };

        let found = self
            .search_results
            .iter()
            .find(|address| &address.id == selected)
            .ok_or_else(|| CommitError::SelectionNotFound(selected.clone()))?;

        Ok(found.with_person(
            self.person_fields.get(FIRST_NAME_FIELD).unwrap_or_default(),
            self.person_fields.get(LAST_NAME_FIELD).unwrap_or_default(),
        ))
    }

    /// Removes a committed address; unknown ids change nothing.
    pub async fn remove_address(&mut self, id: &AddressId) -> bool {
        let removed = self.store.remove_address(id);
        if removed {
            self.persist().await;
        }
        removed
    }

    /// Resets both forms and drops results, selection and error.
    ///
    /// A search still in flight becomes stale. Committed addresses are kept.
    pub fn clear_all(&mut self) {
        self.latest_search += 1;
        self.pending_search = None;
        self.address_fields.reset();
        self.person_fields.reset();
        self.selected = None;
        self.search_results.clear();
        self.store.clear_error();
    }

    async fn persist(&mut self) {
        match self.sync.persist(self.store.addresses()).await {
            Ok(PersistOutcome::Written) => self.persistence_warning = None,
            Ok(PersistOutcome::SkippedBeforeLoad) => {}
            Err(err) => {
                warn!(error = %format!("{err:#}"), "persisting addresses failed");
                self.persistence_warning =
                    Some(format!("Address book could not be saved: {err}"));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
