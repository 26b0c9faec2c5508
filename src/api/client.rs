use super::wire::{
    decode_ack, decode_generated, decode_list, error_text, ApiRequest, GenerateParams,
    ListParams, TaskListing,
};
use super::ApiError;
use crate::domain::{TaskDraft, TaskPatch, TaskRef};
use crate::persistence::Config;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Moves one request body to the server and returns the raw response body
pub trait Transport: Send {
    fn post(&self, request: &ApiRequest) -> Result<String, ApiError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn post(&self, request: &ApiRequest) -> Result<String, ApiError> {
        (**self).post(request)
    }
}

/// Blocking HTTP transport: JSON POST to a single endpoint
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            config.endpoint(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    fn post(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "task api responded");

        if !status.is_success() {
            let message = error_text(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(ApiError::Status {
                code: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

/// Typed operations of the task API on top of a transport
pub struct TaskClient<T: Transport> {
    transport: T,
}

impl<T: Transport> TaskClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn list(&self, params: ListParams) -> Result<TaskListing, ApiError> {
        let body = self.transport.post(&ApiRequest::List { list: params })?;
        decode_list(&body)
    }

    pub fn add(&self, draft: TaskDraft) -> Result<(), ApiError> {
        let body = self.transport.post(&ApiRequest::Add { task: draft })?;
        decode_ack(&body)
    }

    pub fn update(&self, patch: TaskPatch) -> Result<(), ApiError> {
        let body = self.transport.post(&ApiRequest::Update { task: patch })?;
        decode_ack(&body)
    }

    pub fn delete(&self, id: String) -> Result<(), ApiError> {
        let body = self.transport.post(&ApiRequest::Delete {
            task: TaskRef { id },
        })?;
        decode_ack(&body)
    }

    pub fn generate_from_summary(&self, meeting_id: String) -> Result<Vec<TaskDraft>, ApiError> {
        let body = self.transport.post(&ApiRequest::GenerateFromSummary {
            list: GenerateParams { meeting_id },
        })?;
        decode_generated(&body)
    }
}
