//! HTTP client for the remote card catalog.
//!
//! This crate provides:
//! - HTTP client construction with default headers and timeouts
//! - Typed access to the card search, type and subtype endpoints
//! - Uniform error handling for every catalog request
//! - A mock client serving canned responses for tests and offline use
//!
//! ## Usage
//!
//! ```ignore
//! use spellbook_catalog::{CatalogClient, CatalogClientConfig, ClientTrait};
//! use spellbook_catalog::types::{CardQuery, FilterCriteria, PageSize};
//!
//! let client = CatalogClient::new(CatalogClientConfig::default())?;
//! let query = CardQuery::new(1.try_into()?, PageSize::default(), FilterCriteria::default());
//! let page = client.search_cards(&query).await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod types;

pub use client::{CatalogClient, Client, ClientTrait};
pub use config::{CatalogClientConfig, DEFAULT_CATALOG_URL};
pub use error::CatalogClientError;
pub use mock::{MockClient, MockDataError, Response, SPELLBOOK_CATALOG_MOCK_DATA_VAR};
pub use reqwest::StatusCode;
