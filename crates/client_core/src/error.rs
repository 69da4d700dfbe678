//! Error types surfaced by the address book client.

use shared::domain::AddressId;
use thiserror::Error;

pub const MANDATORY_NAME_FIELDS_MESSAGE: &str = "First name and last name fields mandatory!";
pub const NO_ADDRESS_SELECTED_MESSAGE: &str =
    "No address selected, try to select an address or find one if you haven't";
pub const SELECTED_ADDRESS_NOT_FOUND_MESSAGE: &str = "Selected address not found";
pub const DUPLICATE_ENTRY_MESSAGE: &str = "Address already exists.";
pub const FETCH_ADDRESSES_FAILED_MESSAGE: &str = "Failed to fetch addresses";

/// Rejections from [`crate::store::AddressStore::add_address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{}", DUPLICATE_ENTRY_MESSAGE)]
    DuplicatePerson {
        first_name: String,
        last_name: String,
    },
    #[error("{}", DUPLICATE_ENTRY_MESSAGE)]
    DuplicateId(AddressId),
    #[error("{}", MANDATORY_NAME_FIELDS_MESSAGE)]
    MissingPerson,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormFieldError {
    #[error("unknown form field `{0}`")]
    UnknownField(String),
}

/// Failures of the address lookup endpoint.
///
/// Every variant is presented to the user as
/// [`FETCH_ADDRESSES_FAILED_MESSAGE`]; the variant only feeds the logs.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid lookup base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("lookup transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("lookup endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("lookup response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        FETCH_ADDRESSES_FAILED_MESSAGE
    }
}

/// Validation failures of the person commit step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("{}", MANDATORY_NAME_FIELDS_MESSAGE)]
    MissingNames { missing: Vec<String> },
    #[error("{}", NO_ADDRESS_SELECTED_MESSAGE)]
    NoSelection,
    #[error("{}", SELECTED_ADDRESS_NOT_FOUND_MESSAGE)]
    SelectionNotFound(AddressId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validation failure of the address search form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Post code and house number fields mandatory! Missing: {}", .missing.join(", "))]
pub struct SearchFieldsError {
    pub missing: Vec<String>,
}
