//! Utility modules supporting Sirene operations.
//!
//! - [`HttpClient`]: reqwest client built from the configuration
//! - [`RateLimitRetry`]: fixed-delay retry on `429 Too Many Requests`
//! - [`truncate_with_ellipsis`]: unicode-aware truncation for terminal tables
//!
//! # Retry on rate limiting
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sirene_search::transport::{ApiRequest, MockTransport, PageRequester};
//! use sirene_search::utils::RateLimitRetry;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = MockTransport::new();
//! let request = ApiRequest::new("siret");
//! let retry = RateLimitRetry::new(5, Duration::from_secs(1));
//! let response = retry.run(|| transport.get(&request)).await?;
//! # Ok(())
//! # }
//! ```

mod display;
mod http;
mod retry;

pub use display::{is_terminal, truncate_with_ellipsis, MAX_CELL_WIDTH};
pub use http::HttpClient;
pub use retry::RateLimitRetry;
