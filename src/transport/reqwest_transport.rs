//! HTTPS transport backed by reqwest.

use async_trait::async_trait;
use http::StatusCode;
use reqwest::header::ACCEPT;

use super::{ApiRequest, ApiResponse, PageRequester};
use crate::config::{Config, API_KEY_HEADER};
use crate::error::SireneError;
use crate::utils::HttpClient;

/// Production [`PageRequester`] sending the credential header and
/// `Accept: application/json` on every request
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, SireneError> {
        Ok(Self {
            http: HttpClient::from_config(config)?,
            base_url: config.base_url().to_string(),
            api_key: config.api_key().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PageRequester for ReqwestTransport {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse, SireneError> {
        let response = self
            .http
            .client()
            .get(self.url(&request.path))
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .query(&request.params)
            .send()
            .await?;

        tracing::debug!("URL sent: {}", response.url());

        let status: StatusCode = response.status();
        let body = response.text().await?;
        Ok(ApiResponse::new(status, body))
    }
}
