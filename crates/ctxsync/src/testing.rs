//! Test doubles for the API transport.

use async_trait::async_trait;
use ctxsync_core::{ApiRequest, ApiResponse, ApiTransport, SyncError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A transport that replays scripted responses in order and records every
/// request it receives.
///
/// Once the script runs out, further requests fail with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, SyncError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and JSON body.
    pub fn respond(self, status: u16, body: serde_json::Value) -> Self {
        self.respond_raw(status, body.to_string())
    }

    /// Queues a response with a raw body.
    pub fn respond_raw(self, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    /// Queues a failure to obtain any response.
    pub fn fail_with(self, error: SyncError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SyncError> {
        let path = request.path.clone();
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(SyncError::Transport {
                    endpoint: path,
                    details: "no scripted response left".to_string(),
                })
            })
    }
}
