//! InfluxDB specifics: connection configuration, the HTTP query client, and
//! the live-schema loader that reshapes `SHOW …` results into a [`Snapshot`].
//!
//! [`Snapshot`]: crate::framework::core::schema::Snapshot

pub mod client;
pub mod config;
pub mod live_schema;
