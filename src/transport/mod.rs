//! Page requester abstraction.
//!
//! The paginated fetcher never talks to the network directly: it hands an
//! [`ApiRequest`] (path relative to the API base plus query parameters) to a
//! [`PageRequester`] and gets back the raw status and body. Production code
//! uses [`ReqwestTransport`]; tests script responses with [`MockTransport`].

mod mock;
mod reqwest_transport;

pub use mock::MockTransport;
pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::SireneError;

/// GET request relative to the API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Path below the base URL, without leading slash (`siret`, `siren/123456789`)
    pub path: String,

    /// Query parameters in sending order
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Append a query parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Value of a query parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response: status and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response with a JSON body
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Turn a non-2xx response into [`SireneError::Http`]
    pub fn error_for_status(self) -> Result<Self, SireneError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SireneError::Http {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SireneError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Capability to issue one GET request against the API.
///
/// Implementations apply credentials and timeouts; a request that cannot
/// complete returns [`SireneError::Network`].
#[async_trait]
pub trait PageRequester: Send + Sync + std::fmt::Debug {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse, SireneError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_params() {
        let request = ApiRequest::new("siret")
            .with_param("q", "siren:1")
            .with_param("nombre", "20");
        assert_eq!(request.param("nombre"), Some("20"));
        assert_eq!(request.param("curseur"), None);
    }

    #[test]
    fn test_error_for_status() {
        let err = ApiResponse::new(StatusCode::BAD_REQUEST, "bad q")
            .error_for_status()
            .unwrap_err();
        match err {
            SireneError::Http { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad q");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(ApiResponse::ok_json("{}").error_for_status().is_ok());
    }

    #[test]
    fn test_status_helpers() {
        assert!(ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, "").is_rate_limited());
        assert!(ApiResponse::new(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(!ApiResponse::new(StatusCode::NOT_FOUND, "").is_success());
    }
}
