//! Search request and response models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use super::{EndpointKind, Table};
use crate::error::SireneError;

/// Largest page the API will serve
pub const MAX_PAGE_SIZE: usize = 1000;

/// Cursor value requesting the first page
pub const START_CURSOR: &str = "*";

/// Default delay between 429 retries and between pages
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default number of attempts per page while rate limited
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Multi-criteria search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Search scope
    pub endpoint: EndpointKind,

    /// Boolean query (`q`), normalized and validated before sending
    pub q: Option<String>,

    /// Field selection (`champs`)
    pub fields: Option<String>,

    /// Sort expression (`tri`)
    pub sort: Option<String>,

    /// Page size (`nombre`), clamped to [`MAX_PAGE_SIZE`]
    pub page_size: usize,

    /// Total row cap across pages
    pub max_rows: Option<usize>,

    /// Wait after a 429 and between pages
    pub retry_delay: Duration,

    /// Attempts per page while the provider answers 429
    pub max_retries: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            endpoint: EndpointKind::default(),
            q: None,
            fields: None,
            sort: None,
            page_size: MAX_PAGE_SIZE,
            max_rows: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl SearchRequest {
    /// Create a request for the given scope
    pub fn new(endpoint: EndpointKind) -> Self {
        Self {
            endpoint,
            ..Default::default()
        }
    }

    /// Create a request from an endpoint name (`"siret"` or `"siren"`)
    pub fn parse(endpoint: &str) -> Result<Self, SireneError> {
        Ok(Self::new(endpoint.parse()?))
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn max_rows(mut self, max: usize) -> Self {
        self.max_rows = Some(max);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Page size actually sent, within `1..=MAX_PAGE_SIZE`
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Row cap, where zero means uncapped
    pub fn row_cap(&self) -> Option<usize> {
        self.max_rows.filter(|&max| max > 0)
    }

    /// Attempts made per page, at least one.
    ///
    /// `max_retries(0)` still sends one request rather than failing before
    /// any request is made.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Metadata block returned with every search page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statut: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Total number of matches reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debut: Option<u64>,

    /// Number of records in this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<u64>,

    /// Cursor used for this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curseur: Option<String>,

    /// Cursor for the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curseur_suivant: Option<String>,

    /// Any other provider field, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseHeader {
    /// True for the header of a search that never received a page
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Next cursor, if the provider sent a non-empty one
    pub fn next_cursor(&self) -> Option<&str> {
        self.curseur_suivant
            .as_deref()
            .filter(|cursor| !cursor.is_empty())
    }
}

/// Raw result of the paginated fetch
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Records in provider order, truncated to the row cap
    pub records: Vec<Value>,

    /// Header of the last successful page
    pub header: ResponseHeader,

    /// Number of pages received
    pub pages: usize,
}

/// Result of a multi-criteria search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub table: Table,
    pub header: ResponseHeader,
}

impl From<FetchOutcome> for SearchResult {
    fn from(outcome: FetchOutcome) -> Self {
        Self {
            table: Table::from_records(&outcome.records),
            header: outcome.header,
        }
    }
}
