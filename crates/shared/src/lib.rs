//! Types shared by the address book client, the lookup stub and the CLI.

pub mod domain;
pub mod error;
pub mod protocol;
