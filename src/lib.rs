//! Mealdex - Recipe Browsing Core
//!
//! An in-process library for browsing a public recipe API with a locally
//! persisted list of favorites.

pub mod api;
pub mod cli;
pub mod context;
pub mod error;
pub mod favorites;
pub mod hydrate;
pub mod model;
pub mod settings;
pub mod store;
pub mod telemetry;
pub mod tracker;
pub mod transport;

pub use error::FetchError;
pub use tracker::{Outcome, RequestTracker};
