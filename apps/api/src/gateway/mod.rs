//! Backend Gateway — the single point of contact with the external analysis service.
//!
//! One invocation makes exactly one outbound call. Nothing is retried: transport
//! failures, failure statuses and malformed bodies are surfaced immediately as a
//! `GatewayError`.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart::Form, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::normalize_base_url;
use crate::models::{AnalysisResult, ReportReceipt};
use crate::request::{AnalysisRequest, ReportRequest};

pub mod normalize;

pub use normalize::{failure_message, GatewayError, NormalizedError, BACKEND_DOWN_MESSAGE};

/// The two operations the external service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Analyze,
    SendReport,
}

impl Operation {
    pub const fn path(self) -> &'static str {
        match self {
            Operation::Analyze => "/api/analyze",
            Operation::SendReport => "/api/send-report",
        }
    }

    /// Message used when a failed response carries no usable text.
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Operation::Analyze => "Analysis failed",
            Operation::SendReport => "Failed to send report",
        }
    }
}

/// An outbound request body.
pub enum Payload {
    Multipart(Form),
    Json(serde_json::Value),
}

/// A successful upstream response: the raw bytes, kept for pass-through,
/// next to the value they were validated as.
#[derive(Debug, Clone)]
pub struct Upstream<T> {
    pub body: Bytes,
    pub value: T,
}

/// The operations the proxy endpoints need from the external service.
///
/// Carried in `AppState` as `Arc<dyn AnalysisBackend>`.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Upstream<AnalysisResult>, GatewayError>;

    async fn send_report(
        &self,
        request: &ReportRequest,
    ) -> Result<Upstream<ReportReceipt>, GatewayError>;
}

/// HTTP implementation of `AnalysisBackend`.
#[derive(Clone)]
pub struct BackendGateway {
    client: Client,
    base_url: String,
}

impl BackendGateway {
    /// `timeout` bounds each call end to end; `None` leaves it to reqwest's defaults.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `payload` to the operation's path and validates the success body as `T`.
    pub async fn submit<T: DeserializeOwned>(
        &self,
        payload: Payload,
        operation: Operation,
    ) -> Result<Upstream<T>, GatewayError> {
        let url = format!("{}{}", self.base_url, operation.path());
        debug!("Calling backend {:?} at {url}", operation);

        let request = match payload {
            Payload::Multipart(form) => self.client.post(&url).multipart(form),
            Payload::Json(body) => self.client.post(&url).json(&body),
        };

        let response = request.send().await.map_err(|e| {
            let err = transport_failure(&e);
            warn!("Backend {:?} unreachable: {e}", operation);
            err
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("Backend {:?} body read failed: {e}", operation);
            transport_failure(&e)
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let message = failure_message(&text, operation.fallback_message());
            warn!("Backend {:?} returned {}: {}", operation, status, message);
            return Err(GatewayError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let value = serde_json::from_slice::<T>(&body).map_err(|e| {
            warn!("Backend {:?} returned a malformed body: {e}", operation);
            GatewayError::Protocol(e.to_string())
        })?;

        debug!("Backend {:?} succeeded ({} bytes)", operation, body.len());
        Ok(Upstream { body, value })
    }
}

#[async_trait]
impl AnalysisBackend for BackendGateway {
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Upstream<AnalysisResult>, GatewayError> {
        self.submit(Payload::Multipart(request.to_multipart()), Operation::Analyze)
            .await
    }

    async fn send_report(
        &self,
        request: &ReportRequest,
    ) -> Result<Upstream<ReportReceipt>, GatewayError> {
        let body = serde_json::to_value(request)
            .map_err(|e| GatewayError::Protocol(e.to_string()))?;
        self.submit(Payload::Json(body), Operation::SendReport).await
    }
}

/// Connection failures get the fixed "not running" message; anything more
/// specific (timeouts, TLS, DNS) keeps the transport's own text.
fn transport_failure(err: &reqwest::Error) -> GatewayError {
    if err.is_connect() {
        GatewayError::Unreachable(BACKEND_DOWN_MESSAGE.to_string())
    } else if err.is_timeout() {
        GatewayError::Unreachable(format!("Backend request timed out: {err}"))
    } else {
        GatewayError::Unreachable(err.to_string())
    }
}
