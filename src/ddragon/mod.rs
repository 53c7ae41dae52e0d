//! Data Dragon upstream access: versioned fetches and version resolution.

pub mod client;
pub mod version;

pub use client::{DataDragonApi, HttpDataDragon, HttpDataDragonConfig};
pub use version::{needs_sync, VersionResolver};
