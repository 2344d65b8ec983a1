//! Scripted transport for testing purposes.

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ApiRequest, ApiResponse, PageRequester};
use crate::error::SireneError;

/// A transport that replays queued responses in order and records every
/// request it receives.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<ApiResponse, SireneError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Create an empty mock; requests fail until responses are queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push_response(&self, response: ApiResponse) -> &Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a response with the given status and JSON body.
    pub fn push_json(&self, status: StatusCode, body: &Value) -> &Self {
        self.push_response(ApiResponse::new(status, body.to_string()))
    }

    /// Queue an empty response with the given status.
    pub fn push_status(&self, status: StatusCode) -> &Self {
        self.push_response(ApiResponse::new(status, ""))
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: SireneError) -> &Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Copy of every request received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of queued responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl PageRequester for MockTransport {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse, SireneError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SireneError::Network("mock script exhausted".to_string())))
    }
}
