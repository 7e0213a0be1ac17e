//! Decoding of inbound proxy bodies into raw, not yet validated, fields.

use axum::extract::multipart::{Multipart, MultipartError};
use serde::Deserialize;

use crate::errors::AppError;
use crate::request::ResumeFile;

/// Raw fields of an inbound analyze form. Both the snake_case names used by
/// the external service and the camelCase names browsers send are accepted.
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub github_username: Option<String>,
    pub email: Option<String>,
    pub resume_file: Option<ResumeFile>,
}

impl AnalyzeForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "github_username" | "githubUsername" => {
                    form.github_username = Some(field.text().await.map_err(malformed)?);
                }
                "email" => {
                    form.email = Some(field.text().await.map_err(malformed)?);
                }
                "resume_file" | "resumeFile" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    form.resume_file = Some(ResumeFile::new(file_name, content_type, bytes));
                }
                other => {
                    tracing::debug!("Ignoring unknown form field '{other}'");
                }
            }
        }

        Ok(form)
    }
}

fn malformed(err: MultipartError) -> AppError {
    AppError::Validation(err.body_text())
}

/// Raw fields of an inbound send-report body.
#[derive(Debug, Default, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "githubUsername", alias = "github_username")]
    pub github_username: Option<String>,
}

impl ReportForm {
    /// Lenient parse: a body that is not a JSON object with string fields
    /// yields no fields, which validation then rejects.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}
