//! Officials roster to vCard contact records, grouped by district ZIP code.

pub mod address;
pub mod aggregate;
pub mod builder;
pub mod config;
pub mod contact;
pub mod error;
pub mod input;
pub mod metrics;
pub mod output;
pub mod party;
pub mod schema;
pub mod vcard;
