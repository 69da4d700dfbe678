//! Turns raw lookup records into addresses with their own identifier.

use shared::domain::{Address, AddressId, RawAddress};

/// Assigns a fresh id to `raw` and records the house number that was searched.
///
/// The house number from the query wins over any number the endpoint echoed
/// back. Person fields start empty.
pub fn normalize_address(raw: &RawAddress, house_number: &str) -> Address {
    Address {
        id: AddressId::generate(),
        post_code: raw.postcode.clone(),
        house_number: house_number.trim().to_string(),
        street: raw.street.clone(),
        city: raw.city.clone(),
        lat: raw.lat,
        long: raw.long,
        first_name: String::new(),
        last_name: String::new(),
    }
}

pub fn normalize_addresses(raw: &[RawAddress], house_number: &str) -> Vec<Address> {
    raw.iter()
        .map(|address| normalize_address(address, house_number))
        .collect()
}
