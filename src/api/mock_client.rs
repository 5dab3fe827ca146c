use crate::api::client::{ByteStream, MockStreamProducer};
use crate::api::error::ClientError;
use crate::types::GenerateRequest;
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::sync::{Arc, Mutex};

/// Replays canned response bodies, one per `open_generation_stream` call.
///
/// Each chunk is sent verbatim, so tests control exactly where a frame is
/// split. With `hold_open`, the body never ends after the last chunk.
#[derive(Clone)]
pub struct MockApiClient {
    responses: Arc<Mutex<Vec<Vec<String>>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    hold_open: bool,
}

impl MockApiClient {
    pub fn new(responses: Vec<Vec<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
            hold_open: false,
        }
    }

    pub fn holding_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Terminate each frame with a newline, the way the backend writes them.
pub fn framed(frames: &[&str]) -> Vec<String> {
    frames.iter().map(|frame| format!("{frame}\n")).collect()
}

impl MockStreamProducer for MockApiClient {
    fn create_mock_stream(&self, request: &GenerateRequest) -> Result<ByteStream, ClientError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut responses_guard = self.responses.lock().unwrap();
        if responses_guard.is_empty() {
            return Err(ClientError::StartFailed {
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
        }
        let chunks = responses_guard.remove(0);

        let body = stream::iter(
            chunks
                .into_iter()
                .map(|chunk| Ok::<_, ClientError>(Bytes::from(chunk)))
                .collect::<Vec<_>>(),
        );

        if self.hold_open {
            Ok(Box::pin(body.chain(stream::pending())))
        } else {
            Ok(Box::pin(body))
        }
    }
}
