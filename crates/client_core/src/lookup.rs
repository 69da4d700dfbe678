//! HTTP client for the address lookup endpoint.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::RawAddress,
    protocol::{AddressLookupQuery, AddressLookupResponse, GET_ADDRESSES_ROUTE},
};
use tracing::{debug, warn};
use url::Url;

use crate::error::LookupError;

/// Source of address candidates for a postal code and house number.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn find_addresses(
        &self,
        post_code: &str,
        house_number: &str,
    ) -> Result<Vec<RawAddress>, LookupError>;
}

#[derive(Clone)]
pub struct HttpAddressLookup {
    http: Client,
    endpoint: Url,
}

impl HttpAddressLookup {
    /// `base_url` is the service root; the lookup route is appended to it.
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, LookupError> {
        let endpoint = Url::parse(&format!(
            "{}{GET_ADDRESSES_ROUTE}",
            base_url.trim().trim_end_matches('/')
        ))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn find_addresses(
        &self,
        post_code: &str,
        house_number: &str,
    ) -> Result<Vec<RawAddress>, LookupError> {
        let query = AddressLookupQuery {
            postcode: post_code.to_string(),
            streetnumber: house_number.to_string(),
        };
        debug!(endpoint = %self.endpoint, postcode = %query.postcode, "requesting addresses");

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&query)
            .send()
            .await
            .map_err(LookupError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "address lookup returned non-success status");
            return Err(LookupError::Status(status));
        }

        let body: AddressLookupResponse = response.json().await.map_err(LookupError::Decode)?;
        debug!(count = body.details.len(), "address lookup succeeded");
        Ok(body.details)
    }
}

#[cfg(test)]
#[path = "tests/lookup_tests.rs"]
mod tests;
