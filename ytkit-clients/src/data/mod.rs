//! YouTube Data API (v3) client.

pub mod client;

pub use client::{DataClient, ListParams, Page, DATA_BASE_URL};
