//! photo-relay
//!
//! Watches a folder for new photos, optionally color-grades them with a
//! `.cube` table or an XMP tonal preset, and uploads them to a remote
//! endpoint with retry, deduplication and crash-safe state.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod presets;
pub mod rendering;
pub mod server;
pub mod services;
