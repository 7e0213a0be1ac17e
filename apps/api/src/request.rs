//! Request Builder — turns raw user input into outbound payloads for the
//! external analysis service. Pure: no I/O happens here.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use thiserror::Error;

/// Multipart field names understood by the external service.
pub const FIELD_GITHUB_USERNAME: &str = "github_username";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_RESUME_FILE: &str = "resume_file";

const DEFAULT_RESUME_FILE_NAME: &str = "resume.pdf";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("GitHub username is required")]
    MissingUsername,

    #[error("Email and GitHub username are required")]
    MissingReportFields,
}

/// An uploaded résumé as received from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: Option<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// The declared filename, or a stand-in when the client sent none.
    pub fn declared_name(&self) -> &str {
        self.file_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_RESUME_FILE_NAME)
    }
}

/// Validated input for the profile-analysis operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub github_username: String,
    pub email: Option<String>,
    pub resume_file: Option<ResumeFile>,
}

/// Validated input for the weekly-report operation. Serialises to the
/// upstream JSON body `{email, github_username}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub email: String,
    pub github_username: String,
}

/// Builds an analysis request. The username is required and trimmed; a blank
/// email is dropped and a zero-byte file counts as no file. The email is not checked
/// for format, the external service does that.
pub fn build_analysis_request(
    username: Option<&str>,
    email: Option<&str>,
    file: Option<ResumeFile>,
) -> Result<AnalysisRequest, ValidationError> {
    let github_username = non_empty(username).ok_or(ValidationError::MissingUsername)?;

    Ok(AnalysisRequest {
        github_username: github_username.to_string(),
        email: email.filter(|e| !e.trim().is_empty()).map(str::to_string),
        resume_file: file.filter(|f| !f.bytes.is_empty()),
    })
}

/// Builds a report request. Both fields are required.
pub fn build_report_request(
    email: Option<&str>,
    username: Option<&str>,
) -> Result<ReportRequest, ValidationError> {
    match (non_empty(email), non_empty(username)) {
        (Some(email), Some(username)) => Ok(ReportRequest {
            email: email.to_string(),
            github_username: username.to_string(),
        }),
        _ => Err(ValidationError::MissingReportFields),
    }
}

impl AnalysisRequest {
    /// Encodes the request as the multipart form the external service expects.
    pub fn to_multipart(&self) -> Form {
        let mut form = Form::new().text(FIELD_GITHUB_USERNAME, self.github_username.clone());

        if let Some(email) = &self.email {
            form = form.text(FIELD_EMAIL, email.clone());
        }

        if let Some(file) = &self.resume_file {
            form = form.part(FIELD_RESUME_FILE, file_part(file));
        }

        form
    }
}

fn file_part(file: &ResumeFile) -> Part {
    let name = file.declared_name().to_string();
    let plain = || Part::bytes(file.bytes.to_vec()).file_name(name.clone());

    match &file.content_type {
        // mime_str consumes the part, so an unparseable type falls back to a fresh one
        Some(content_type) => plain().mime_str(content_type).unwrap_or_else(|_| plain()),
        None => plain(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
