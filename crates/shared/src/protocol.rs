use serde::{Deserialize, Serialize};

use crate::domain::RawAddress;

pub const GET_ADDRESSES_ROUTE: &str = "/api/getAddresses";

/// Query string of the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLookupQuery {
    pub postcode: String,
    pub streetnumber: String,
}

/// Only successful bodies carry a status; failures use [`crate::error::ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    #[default]
    Ok,
}

/// Successful body of the lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressLookupResponse {
    #[serde(default)]
    pub status: LookupStatus,
    #[serde(default)]
    pub details: Vec<RawAddress>,
}

impl AddressLookupResponse {
    pub fn ok(details: Vec<RawAddress>) -> Self {
        Self {
            status: LookupStatus::Ok,
            details,
        }
    }
}
