// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ytkit Core
//!
//! Core types shared by every ytkit crate:
//!
//! - [`ApiError`] - the error hierarchy surfaced by all API wrappers
//! - [`Table`] - the tabular result model returned by the clients
//! - [`Names`] - comma-list parameter handling
//!
//! ## Key Types
//!
//! ### Errors
//! - [`ApiError`] - maps HTTP status + Google error payload to variants
//!   like `QuotaExceeded`, `RateLimited`, or `NotAuthorized`
//!
//! ### Tabular results
//! - [`Table`] - ordered columns, rows of typed cells
//! - [`Column`] / [`ColumnType`] - declared column metadata
//! - [`Cell`] - a single scalar (or opaque JSON) value

pub mod error;
pub mod params;
pub mod table;

// Re-export error types
pub use error::ApiError;

// Re-export the tabular model
pub use table::{Cell, Column, ColumnType, Table};

// Re-export parameter helpers
pub use params::{invalid_argument, Names};
