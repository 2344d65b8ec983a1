//! Sirene API client.
//!
//! [`SireneClient`] offers the two operations of the API: single-record
//! lookup by SIRET/SIREN and the paginated multi-criteria search.
//!
//! ```rust,no_run
//! use sirene_search::client::SireneClient;
//! use sirene_search::config::Config;
//! use sirene_search::models::{EndpointKind, SearchRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SireneClient::new(&Config::from_env()?)?;
//! let request = SearchRequest::new(EndpointKind::Siren)
//!     .query("dateCreationUniteLegale:2021-02 AND etatAdministratifUniteLegale:A")
//!     .max_rows(50);
//! let result = client.search(&request).await?;
//! println!("{} rows out of {:?}", result.table.len(), result.header.total);
//! # Ok(())
//! # }
//! ```

mod pagination;

use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::error::SireneError;
use crate::models::{EndpointKind, SearchRequest, SearchResult};
use crate::transport::{ApiRequest, PageRequester, ReqwestTransport};

/// Client for the Sirene API
#[derive(Debug, Clone)]
pub struct SireneClient {
    transport: Arc<dyn PageRequester>,
}

impl SireneClient {
    /// Create a client talking HTTPS to the configured endpoint
    pub fn new(config: &Config) -> Result<Self, SireneError> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new(config)?)))
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn PageRequester>) -> Self {
        Self { transport }
    }

    /// Fetch one record by identifier (`GET {base}/{kind}/{id}`).
    ///
    /// Returns the decoded response object as sent by the provider.
    pub async fn lookup(&self, kind: EndpointKind, id: &str) -> Result<Value, SireneError> {
        let path = format!("{}/{}", kind.path(), urlencoding::encode(id.trim()));
        let request = ApiRequest::new(path);

        tracing::debug!("Looking up {} {}", kind, id);
        self.transport.get(&request).await?.error_for_status()?.json()
    }

    /// Run a multi-criteria search and flatten the records into a table
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, SireneError> {
        Ok(self.fetch(request).await?.into())
    }
}
