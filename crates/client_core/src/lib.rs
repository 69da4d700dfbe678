//! Address book client: lookup, normalization, validation and persistence.

pub mod error;
pub mod form_fields;
pub mod lookup;
pub mod normalizer;
pub mod orchestration;
pub mod persistence;
pub mod store;

pub use error::{CommitError, FormFieldError, LookupError, SearchFieldsError, StoreError};
pub use form_fields::FormFields;
pub use lookup::{AddressLookup, HttpAddressLookup};
pub use normalizer::{normalize_address, normalize_addresses};
pub use orchestration::{AddressBookController, SearchOutcome, SearchTicket};
pub use persistence::{AddressBookSync, PersistOutcome, ADDRESSES_KEY};
pub use store::AddressStore;
