//! Cursor-based pagination over the search endpoints.

use serde_json::Value;
use tokio::time::sleep;

use super::SireneClient;
use crate::error::SireneError;
use crate::models::{EndpointKind, FetchOutcome, ResponseHeader, SearchRequest, START_CURSOR};
use crate::query;
use crate::transport::ApiRequest;
use crate::utils::RateLimitRetry;

impl SireneClient {
    /// Fetch every page of a search, one request at a time.
    ///
    /// The query is normalized and validated first; an invalid query fails
    /// before any request. Pages are requested with the `*` cursor and then
    /// with each `curseurSuivant` until one of:
    ///
    /// - the provider answers 404 (no more data, not an error);
    /// - the row cap is reached (records are truncated to it);
    /// - the header carries no next cursor, or repeats the current one.
    ///
    /// A 429 is retried after `retry_delay` up to `max_retries` attempts, and
    /// the same delay separates consecutive pages. Any other non-2xx status
    /// fails with [`SireneError::Http`]; records gathered so far are dropped.
    pub async fn fetch(&self, request: &SearchRequest) -> Result<FetchOutcome, SireneError> {
        let q = match request.q.as_deref() {
            Some(raw) => query::prepare(raw)?,
            None => None,
        };
        let page_size = request.effective_page_size();
        let row_cap = request.row_cap();
        let retry = RateLimitRetry::new(request.attempts(), request.retry_delay);

        let mut cursor = START_CURSOR.to_string();
        let mut outcome = FetchOutcome::default();

        loop {
            let page = page_request(request, q.as_deref(), page_size, &cursor);
            tracing::debug!(
                "Requesting {} page {} (cursor {})",
                request.endpoint,
                outcome.pages + 1,
                cursor
            );

            let response = retry.run(|| self.transport.get(&page)).await?;

            if response.is_not_found() {
                tracing::debug!("No (more) results for {}", request.endpoint);
                break;
            }
            let response = response.error_for_status()?;

            let (header, batch) = parse_page(&response.body, request.endpoint)?;
            outcome.pages += 1;
            outcome.header = header;
            outcome.records.extend(batch);

            if let Some(cap) = row_cap {
                if outcome.records.len() >= cap {
                    outcome.records.truncate(cap);
                    break;
                }
            }

            match outcome.header.next_cursor() {
                Some(next) if next != cursor => cursor = next.to_string(),
                _ => break,
            }

            sleep(request.retry_delay).await;
        }

        tracing::info!(
            "Search on {} returned {} records in {} pages (provider total: {:?})",
            request.endpoint,
            outcome.records.len(),
            outcome.pages,
            outcome.header.total
        );
        Ok(outcome)
    }
}

/// Parameters for one page; only values that are present are sent
fn page_request(
    request: &SearchRequest,
    q: Option<&str>,
    page_size: usize,
    cursor: &str,
) -> ApiRequest {
    let optional = [
        ("q", q),
        ("champs", request.fields.as_deref()),
        ("tri", request.sort.as_deref()),
    ];

    let mut page = ApiRequest::new(request.endpoint.path());
    for (name, value) in optional {
        if let Some(value) = value {
            page = page.with_param(name, value);
        }
    }
    page.with_param("nombre", page_size.to_string())
        .with_param("curseur", cursor)
}

/// Split a page body into its header and the records under the resource root
fn parse_page(
    body: &str,
    endpoint: EndpointKind,
) -> Result<(ResponseHeader, Vec<Value>), SireneError> {
    let mut data: Value = serde_json::from_str(body)?;

    let header = match data.get_mut("header").map(Value::take) {
        None | Some(Value::Null) => ResponseHeader::default(),
        Some(raw) => serde_json::from_value(raw)?,
    };

    let batch = match data.get_mut(endpoint.resource_root()).map(Value::take) {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    };

    Ok((header, batch))
}
