//! Core data models for Sirene search operations.

mod endpoint;
mod search;
mod table;

pub use endpoint::EndpointKind;
pub use search::{
    FetchOutcome, ResponseHeader, SearchRequest, SearchResult, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_DELAY, MAX_PAGE_SIZE, START_CURSOR,
};
pub use table::{cell_text, Table};
