use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id_newtype!(AddressId);

impl AddressId {
    /// Fresh random identifier. Uniqueness is best effort.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

/// Address record as returned by the lookup endpoint, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, alias = "postCode")]
    pub postcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
}

/// Address with an assigned id and the person attached to it.
///
/// Before a commit the person fields are empty; entries held by the address
/// store always carry a non-blank first and last name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(alias = "postcode")]
    pub post_code: String,
    pub house_number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Address {
    /// Returns a copy of this address with the person fields replaced.
    pub fn with_person(&self, first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..self.clone()
        }
    }

    /// Case-insensitive, whitespace-trimmed (first, last) pair used for
    /// duplicate detection.
    pub fn person_key(&self) -> (String, String) {
        (
            normalize_name(&self.first_name),
            normalize_name(&self.last_name),
        )
    }

    pub fn has_person(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    /// One-line rendering: `street houseNumber, postcode, city`.
    pub fn summary(&self) -> String {
        let mut line = self.street.clone();
        if !self.house_number.is_empty() {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&self.house_number);
        }
        for part in [&self.post_code, &self.city] {
            if part.is_empty() {
                continue;
            }
            if !line.is_empty() {
                line.push_str(", ");
            }
            line.push_str(part);
        }
        line
    }
}

fn normalize_name(value: &str) -> String {
    value.trim().to_lowercase()
}
