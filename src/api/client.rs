use super::error::ClientError;
use crate::config::Config;
use crate::logging::{debug_payload_enabled, emit_debug_payload};
use crate::types::{BlogResult, DownloadKind, GenerateRequest, PastBlog};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::CONTENT_DISPOSITION;
use serde::de::DeserializeOwned;
use std::pin::Pin;
#[cfg(test)]
use std::sync::Arc;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn create_mock_stream(&self, request: &GenerateRequest) -> Result<ByteStream, ClientError>;
}

/// A downloaded artifact and the file name the server suggested for it.
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: String,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_url)
    }

    pub fn with_base_url(api_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            #[cfg(test)]
            mock_stream_producer: None,
        }
    }

    #[cfg(test)]
    pub fn new_mock(mock_producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: "http://localhost:8000/api".to_string(),
            mock_stream_producer: Some(mock_producer),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// `POST /generate` and hand back the raw response body as it streams in.
    pub async fn open_generation_stream(
        &self,
        topic: &str,
        as_of: &str,
    ) -> Result<ByteStream, ClientError> {
        let payload = GenerateRequest {
            topic: topic.to_string(),
            as_of: as_of.to_string(),
        };

        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.create_mock_stream(&payload);
            }
        }

        let request_url = self.url("/generate");
        if debug_payload_enabled() {
            emit_debug_payload(&request_url, &payload);
        }
        tracing::info!(url = %request_url, topic, as_of, "starting generation");

        let response = self
            .http
            .post(&request_url)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|error| ClientError::from_reqwest(error, &request_url))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            return Err(ClientError::StartFailed {
                status: status.as_u16(),
                reason,
            });
        }

        let stream = response.bytes_stream().map(move |item| {
            item.map_err(|error| ClientError::from_reqwest(error, &request_url))
        });
        Ok(Box::pin(stream))
    }

    pub async fn fetch_blogs(&self) -> Result<Vec<PastBlog>, ClientError> {
        self.get_json(&self.url("/blogs")).await
    }

    pub async fn fetch_blog(&self, id: &str) -> Result<BlogResult, ClientError> {
        self.get_json(&self.url(&format!("/blogs/{id}"))).await
    }

    pub async fn download(&self, id: &str, kind: DownloadKind) -> Result<Download, ClientError> {
        let request_url = self.download_url(id, kind);
        let response = self
            .http
            .get(&request_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| ClientError::from_reqwest(error, &request_url))?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| kind.fallback_filename().to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|error| ClientError::from_reqwest(error, &request_url))?;

        tracing::debug!(url = %request_url, %filename, size = bytes.len(), "download finished");
        Ok(Download { filename, bytes })
    }

    pub fn download_url(&self, id: &str, kind: DownloadKind) -> String {
        self.url(&format!("/blogs/{id}/download/{}", kind.path_segment()))
    }

    pub fn image_url(&self, id: &str, filename: &str) -> String {
        self.url(&format!("/blogs/{id}/images/{filename}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, request_url: &str) -> Result<T, ClientError> {
        let body = self
            .http
            .get(request_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| ClientError::from_reqwest(error, request_url))?
            .bytes()
            .await
            .map_err(|error| ClientError::from_reqwest(error, request_url))?;

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            url: request_url.to_string(),
            source,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

/// Pull `name` out of `attachment; filename="name"`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=\"")?;
    let name = rest.split('"').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
