//! HTTP client for the proxy endpoints, as used by a session.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::normalize_base_url;
use crate::errors::ErrorBody;
use crate::gateway::{NormalizedError, Operation};
use crate::models::{AnalysisResult, ReportReceipt};
use crate::request::build_analysis_request;
use crate::session::{ProxyClient, SessionForm};

const ANALYZE_TRANSPORT_FALLBACK: &str = "Failed to analyze profile. Please try again.";
const REPORT_TRANSPORT_FALLBACK: &str =
    "Failed to send weekly report. Please check your credentials.";

#[derive(Clone)]
pub struct HttpProxyClient {
    client: Client,
    base_url: String,
}

impl HttpProxyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: normalize_base_url(base_url),
        })
    }

    async fn read<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        operation: Operation,
        transport_fallback: &str,
    ) -> Result<T, NormalizedError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("Reading proxy response failed: {e}");
            NormalizedError::new(transport_fallback)
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| operation.fallback_message().to_string());
            debug!("Proxy {:?} failed with {status}: {message}", operation);
            return Err(NormalizedError::new(message));
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!("Proxy {:?} returned an unexpected body: {e}", operation);
            NormalizedError::new(operation.fallback_message())
        })
    }
}

#[async_trait]
impl ProxyClient for HttpProxyClient {
    async fn analyze(&self, form: &SessionForm) -> Result<AnalysisResult, NormalizedError> {
        let request = build_analysis_request(
            Some(&form.github_username),
            Some(&form.email),
            form.resume_file.clone(),
        )
        .map_err(|e| NormalizedError::new(e.to_string()))?;

        let url = format!("{}{}", self.base_url, Operation::Analyze.path());
        let response = self
            .client
            .post(url)
            .multipart(request.to_multipart())
            .send()
            .await
            .map_err(|e| {
                warn!("Proxy unreachable: {e}");
                NormalizedError::new(ANALYZE_TRANSPORT_FALLBACK)
            })?;

        self.read(response, Operation::Analyze, ANALYZE_TRANSPORT_FALLBACK)
            .await
    }

    async fn send_report(&self, form: &SessionForm) -> Result<ReportReceipt, NormalizedError> {
        let url = format!("{}{}", self.base_url, Operation::SendReport.path());
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({
                "email": form.email.trim(),
                "githubUsername": form.github_username.trim(),
            }))
            .send()
            .await
            .map_err(|e| {
                warn!("Proxy unreachable: {e}");
                NormalizedError::new(REPORT_TRANSPORT_FALLBACK)
            })?;

        self.read(response, Operation::SendReport, REPORT_TRANSPORT_FALLBACK)
            .await
    }
}
