//! # Sirene Search
//!
//! A client for the INSEE Sirene business-registry API, with single-record
//! lookup and paginated multi-criteria search.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`query`]: normalization and validation of the boolean `q` expression
//! - [`client`]: lookup, cursor pagination with retry on 429, result assembly
//! - [`transport`]: injectable page requester (reqwest in production, scripted in tests)
//! - [`models`]: endpoint kinds, search requests, response header, flat table
//! - [`config`]: credential and endpoint configuration
//! - [`utils`]: HTTP client, retry policy, and display helpers

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use client::SireneClient;
pub use config::Config;
pub use error::{QueryError, SireneError};
pub use models::{EndpointKind, ResponseHeader, SearchRequest, SearchResult, Table};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
