//! Axum route handlers for the proxy endpoints.

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection,
        rejection::BytesRejection,
        Multipart, State,
    },
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::proxy::form::{AnalyzeForm, ReportForm};
use crate::request::{build_analysis_request, build_report_request};
use crate::state::AppState;

/// POST /api/analyze
///
/// Multipart input: `github_username` (required), `email`, `resume_file`.
/// Replies with the upstream analysis body unchanged.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let form = match multipart {
        Ok(multipart) => AnalyzeForm::read(multipart).await?,
        Err(rejection) => {
            debug!("Analyze body is not multipart: {rejection}");
            AnalyzeForm::default()
        }
    };

    let request = build_analysis_request(
        form.github_username.as_deref(),
        form.email.as_deref(),
        form.resume_file,
    )?;

    info!(
        username = %request.github_username,
        has_resume = request.resume_file.is_some(),
        "Forwarding profile analysis"
    );

    let upstream = state.backend.analyze(&request).await?;
    Ok(json_pass_through(upstream.body))
}

/// POST /api/send-report
///
/// JSON input: `{email, githubUsername}`. Replies with the upstream body unchanged.
pub async fn handle_send_report(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    // Oversized or unreadable bodies answer in the same JSON error shape.
    let body = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let form = ReportForm::parse(&body);
    let request = build_report_request(form.email.as_deref(), form.github_username.as_deref())?;

    info!(username = %request.github_username, "Forwarding weekly report");

    let upstream = state.backend.send_report(&request).await?;
    Ok(json_pass_through(upstream.body))
}

fn json_pass_through(body: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::errors::ErrorBody;
    use crate::gateway::{AnalysisBackend, GatewayError, Upstream, BACKEND_DOWN_MESSAGE};
    use crate::models::{AnalysisResult, ReportReceipt};
    use crate::request::{AnalysisRequest, ReportRequest};
    use crate::routes::build_router;
    use crate::state::AppState;

    // Deliberately odd spacing and key order: pass-through must keep it.
    const ANALYSIS_BODY: &str = r#"{ "advice":"Line one.\nLine two.", "github":{"total_stars":2,"repo_count":1,"languages":["go"],"readme_quality":"Basic"}, "resume":{"skills":[],"name":"Sample User","education":"BSc"} }"#;
    const BOUNDARY: &str = "careerwise-test-boundary";

    struct FakeBackend {
        calls: AtomicUsize,
        analysis: Result<Upstream<AnalysisResult>, GatewayError>,
        report: Result<Upstream<ReportReceipt>, GatewayError>,
        last_analysis: Mutex<Option<AnalysisRequest>>,
        last_report: Mutex<Option<ReportRequest>>,
    }

    impl FakeBackend {
        fn succeeding() -> Self {
            let report_body = r#"{"success":true,"message":"Weekly report sent successfully!"}"#;
            Self {
                calls: AtomicUsize::new(0),
                analysis: Ok(Upstream {
                    body: Bytes::from_static(ANALYSIS_BODY.as_bytes()),
                    value: serde_json::from_str(ANALYSIS_BODY).unwrap(),
                }),
                report: Ok(Upstream {
                    body: Bytes::from_static(report_body.as_bytes()),
                    value: serde_json::from_str(report_body).unwrap(),
                }),
                last_analysis: Mutex::new(None),
                last_report: Mutex::new(None),
            }
        }

        fn failing(err: GatewayError) -> Self {
            Self {
                analysis: Err(err.clone()),
                report: Err(err),
                ..Self::succeeding()
            }
        }
    }

    #[async_trait]
    impl AnalysisBackend for FakeBackend {
        async fn analyze(
            &self,
            request: &AnalysisRequest,
        ) -> Result<Upstream<AnalysisResult>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_analysis.lock().unwrap() = Some(request.clone());
            self.analysis.clone()
        }

        async fn send_report(
            &self,
            request: &ReportRequest,
        ) -> Result<Upstream<ReportReceipt>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_report.lock().unwrap() = Some(request.clone());
            self.report.clone()
        }
    }

    fn app(backend: Arc<FakeBackend>) -> Router {
        app_with(backend, Config::default())
    }

    fn app_with(backend: Arc<FakeBackend>, config: Config) -> Router {
        build_router(AppState { backend, config })
    }

    fn tight_limit() -> Config {
        Config {
            max_upload_bytes: 16,
            ..Config::default()
        }
    }

    enum Field<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_request(fields: &[Field<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for field in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match field {
                Field::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Field::File(name, file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn report_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/send-report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    async fn read_error(response: Response) -> String {
        let body: ErrorBody = serde_json::from_slice(&read_body(response).await).unwrap();
        body.error
    }

    #[tokio::test]
    async fn test_analyze_without_username_is_rejected_without_backend_call() {
        let backend = Arc::new(FakeBackend::succeeding());
        let response = app(backend.clone())
            .oneshot(multipart_request(&[Field::Text("email", "a@b.c")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_error(response).await, "GitHub username is required");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_with_blank_username_is_rejected() {
        let backend = Arc::new(FakeBackend::succeeding());
        let response = app(backend.clone())
            .oneshot(multipart_request(&[Field::Text("github_username", "  ")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_with_non_multipart_body_is_rejected_as_json() {
        let backend = Arc::new(FakeBackend::succeeding());
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("github_username=octocat"))
            .unwrap();
        let response = app(backend.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_error(response).await, "GitHub username is required");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_success_passes_body_through_unchanged() {
        let backend = Arc::new(FakeBackend::succeeding());
        let response = app(backend.clone())
            .oneshot(multipart_request(&[
                Field::Text("github_username", "octocat"),
                Field::Text("email", "a@b.c"),
                Field::File("resume_file", "cv.pdf", b"%PDF-1.4 test"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(&read_body(response).await[..], ANALYSIS_BODY.as_bytes());

        let forwarded = backend.last_analysis.lock().unwrap().clone().unwrap();
        assert_eq!(forwarded.github_username, "octocat");
        assert_eq!(forwarded.email.as_deref(), Some("a@b.c"));
        let file = forwarded.resume_file.unwrap();
        assert_eq!(file.declared_name(), "cv.pdf");
        assert_eq!(&file.bytes[..], b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_analyze_accepts_camel_case_fields_and_drops_empty_file() {
        let backend = Arc::new(FakeBackend::succeeding());
        let response = app(backend.clone())
            .oneshot(multipart_request(&[
                Field::Text("githubUsername", "octocat"),
                Field::File("resumeFile", "empty.pdf", b""),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let forwarded = backend.last_analysis.lock().unwrap().clone().unwrap();
        assert_eq!(forwarded.github_username, "octocat");
        assert!(forwarded.resume_file.is_none());
    }

    #[tokio::test]
    async fn test_analyze_backend_failure_is_500_with_message() {
        let backend = Arc::new(FakeBackend::failing(GatewayError::Http {
            status: 500,
            message: "rate limited".to_string(),
        }));
        let response = app(backend)
            .oneshot(multipart_request(&[Field::Text("github_username", "octocat")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_error(response).await, "rate limited");
    }

    #[tokio::test]
    async fn test_analyze_unreachable_backend_is_500() {
        let backend = Arc::new(FakeBackend::failing(GatewayError::Unreachable(
            BACKEND_DOWN_MESSAGE.to_string(),
        )));
        let response = app(backend)
            .oneshot(multipart_request(&[Field::Text("github_username", "octocat")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_error(response).await, BACKEND_DOWN_MESSAGE);
    }

    #[tokio::test]
    async fn test_send_report_requires_both_fields() {
        for body in [
            json!({"email": "a@b.c"}),
            json!({"githubUsername": "octocat"}),
            json!({"email": "", "githubUsername": "octocat"}),
        ] {
            let backend = Arc::new(FakeBackend::succeeding());
            let response = app(backend.clone())
                .oneshot(report_request(body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                read_error(response).await,
                "Email and GitHub username are required"
            );
            assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_send_report_with_invalid_json_is_rejected() {
        let backend = Arc::new(FakeBackend::succeeding());
        let request = Request::builder()
            .method("POST")
            .uri("/api/send-report")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(backend.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_report_success_forwards_and_passes_through() {
        let backend = Arc::new(FakeBackend::succeeding());
        let response = app(backend.clone())
            .oneshot(report_request(
                json!({"email": "a@b.c", "githubUsername": "octocat"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(body["message"], "Weekly report sent successfully!");

        let forwarded = backend.last_report.lock().unwrap().clone().unwrap();
        assert_eq!(forwarded.email, "a@b.c");
        assert_eq!(forwarded.github_username, "octocat");
    }

    #[tokio::test]
    async fn test_send_report_backend_failure_is_500() {
        let backend = Arc::new(FakeBackend::failing(GatewayError::Http {
            status: 500,
            message: "Failed to send report".to_string(),
        }));
        let response = app(backend)
            .oneshot(report_request(
                json!({"email": "a@b.c", "githubUsername": "octocat"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_error(response).await, "Failed to send report");
    }

    #[tokio::test]
    async fn test_oversized_report_body_is_json_error() {
        let backend = Arc::new(FakeBackend::succeeding());
        let response = app_with(backend.clone(), tight_limit())
            .oneshot(report_request(
                json!({"email": "someone@example.com", "githubUsername": "octocat"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(!read_error(response).await.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_analyze_body_is_json_error() {
        let backend = Arc::new(FakeBackend::succeeding());
        let response = app_with(backend.clone(), tight_limit())
            .oneshot(multipart_request(&[
                Field::Text("github_username", "octocat"),
                Field::File("resume_file", "cv.pdf", b"%PDF-1.4 a resume far beyond the limit"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(!read_error(response).await.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}
