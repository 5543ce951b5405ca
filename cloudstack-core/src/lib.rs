//! CloudStack Core
//!
//! Provider-agnostic building blocks for managing CloudStack resources:
//! the resource/state model, the provider contract, attribute schemas,
//! field-level and tag diffing, and data source filter matching.

pub mod differ;
pub mod filter;
pub mod provider;
pub mod resource;
pub mod schema;
