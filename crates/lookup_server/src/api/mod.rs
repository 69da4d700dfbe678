//! Address directory served by the lookup stub.

use std::path::Path;

use anyhow::Context;
use shared::{domain::RawAddress, error::ApiError, protocol::AddressLookupQuery};

pub const NO_RESULTS_MESSAGE: &str = "No results found!";
const MIN_POSTCODE_CHARS: usize = 4;

/// In-memory set of addresses the stub answers from.
#[derive(Debug, Clone, Default)]
pub struct AddressDirectory {
    entries: Vec<RawAddress>,
}

impl AddressDirectory {
    pub fn new(entries: Vec<RawAddress>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        let entry = |street: &str, city: &str, postcode: &str, lat: f64, long: f64| RawAddress {
            street: street.into(),
            city: city.into(),
            postcode: postcode.into(),
            house_number: None,
            lat: Some(lat),
            long: Some(long),
        };
        Self::new(vec![
            entry("Damrak", "Amsterdam", "1012LG", 52.3745, 4.8970),
            entry("Rokin", "Amsterdam", "1012LG", 52.3702, 4.8930),
            entry("Coolsingel", "Rotterdam", "3011AD", 51.9225, 4.4792),
            entry("Rua Augusta", "Lisboa", "1100-048", 38.7100, -9.1366),
            entry("Rua de Santa Catarina", "Porto", "4000-447", 41.1496, -8.6060),
        ])
    }

    /// Reads a JSON array of addresses from `path`.
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read fixtures '{}'", path.display()))?;
        let entries: Vec<RawAddress> = serde_json::from_str(&raw)
            .with_context(|| format!("fixtures '{}' are not an address array", path.display()))?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Addresses in `query.postcode`, each stamped with the requested number.
    pub fn find(&self, query: &AddressLookupQuery) -> Result<Vec<RawAddress>, ApiError> {
        let postcode = validate_postcode(&query.postcode)?;
        let streetnumber = validate_streetnumber(&query.streetnumber)?;

        let matches: Vec<RawAddress> = self
            .entries
            .iter()
            .filter(|entry| canonical_postcode(&entry.postcode) == postcode)
            .map(|entry| RawAddress {
                house_number: Some(streetnumber.clone()),
                ..entry.clone()
            })
            .collect();

        if matches.is_empty() {
            return Err(ApiError::not_found(NO_RESULTS_MESSAGE));
        }
        Ok(matches)
    }
}

fn canonical_postcode(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

fn validate_postcode(raw: &str) -> Result<String, ApiError> {
    let postcode = canonical_postcode(raw);
    let significant = postcode.chars().filter(char::is_ascii_alphanumeric).count();
    if significant < MIN_POSTCODE_CHARS {
        return Err(ApiError::validation(format!(
            "Postcode must be at least {MIN_POSTCODE_CHARS} characters!"
        )));
    }
    if !postcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ApiError::validation("Postcode may only contain letters, digits and '-'!"));
    }
    Ok(postcode)
}

fn validate_streetnumber(raw: &str) -> Result<String, ApiError> {
    let number = raw.trim();
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation("Street Number must be a number!"));
    }
    Ok(number.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
