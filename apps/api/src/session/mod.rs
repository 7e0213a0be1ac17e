//! Orchestration state machine for one user session.
//!
//! `Idle → Submitting → {Succeeded, Failed}`. The next action leaves a settled
//! state through `Idle` again. Every transition is published on a `watch`
//! channel so a presentation layer can disable its triggers while a request
//! is in flight. An action whose future is dropped mid-request falls back to
//! `Idle`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::gateway::NormalizedError;
use crate::models::{AnalysisResult, ReportReceipt};
use crate::request::ResumeFile;

pub mod client;

pub use client::HttpProxyClient;

pub const ANALYZE_VALIDATION_MESSAGE: &str = "Please enter your GitHub username";
pub const REPORT_VALIDATION_MESSAGE: &str = "Please enter both email and GitHub username";
pub const ANALYSIS_NOTICE: &str = "Analysis completed successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Analyze,
    SendReport,
}

/// What the session shows. Success and error can never be set together.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Ready for an action. `validation` holds a locally rejected action's message.
    Idle { validation: Option<String> },
    Submitting {
        action: Action,
    },
    Succeeded {
        action: Action,
        notice: String,
        finished_at: DateTime<Utc>,
    },
    Failed {
        action: Action,
        error: NormalizedError,
        finished_at: DateTime<Utc>,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle { validation: None }
    }
}

impl SessionState {
    /// False while a request is in flight; triggers must be disabled then.
    pub fn accepts_actions(&self) -> bool {
        !matches!(self, SessionState::Submitting { .. })
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            SessionState::Succeeded { notice, .. } => Some(notice),
            _ => None,
        }
    }

    /// Message to show as an error: a failure or a local validation rejection.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionState::Failed { error, .. } => Some(&error.message),
            SessionState::Idle { validation } => validation.as_deref(),
            _ => None,
        }
    }
}

/// Raw user input as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct SessionForm {
    pub github_username: String,
    pub email: String,
    pub resume_file: Option<ResumeFile>,
}

/// The calls a session makes against the proxy endpoints.
#[async_trait]
pub trait ProxyClient: Send + Sync {
    async fn analyze(&self, form: &SessionForm) -> Result<AnalysisResult, NormalizedError>;

    async fn send_report(&self, form: &SessionForm) -> Result<ReportReceipt, NormalizedError>;
}

pub struct Session<C> {
    id: Uuid,
    client: C,
    form: SessionForm,
    state: watch::Sender<SessionState>,
    analysis: Option<Arc<AnalysisResult>>,
}

impl<C: ProxyClient> Session<C> {
    pub fn new(client: C) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            id: Uuid::new_v4(),
            client,
            form: SessionForm::default(),
            state,
            analysis: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn form(&self) -> &SessionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SessionForm {
        &mut self.form
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The latest successful analysis. Kept across later failures and reports;
    /// replaced only by the next successful analysis.
    pub fn analysis(&self) -> Option<Arc<AnalysisResult>> {
        self.analysis.clone()
    }

    pub async fn analyze(&mut self) -> SessionState {
        self.begin();
        if self.form.github_username.trim().is_empty() {
            return self.reject(ANALYZE_VALIDATION_MESSAGE);
        }

        let in_flight = InFlight::start(&self.state, Action::Analyze);
        let span = info_span!("analyze", session = %self.id);
        let outcome = self.client.analyze(&self.form).instrument(span).await;
        in_flight.finish();

        let next = match outcome {
            Ok(result) => {
                self.analysis = Some(Arc::new(result));
                succeeded(Action::Analyze, ANALYSIS_NOTICE.to_string())
            }
            Err(error) => failed(Action::Analyze, error),
        };
        self.settle(next)
    }

    pub async fn send_report(&mut self) -> SessionState {
        self.begin();
        if self.form.github_username.trim().is_empty() || self.form.email.trim().is_empty() {
            return self.reject(REPORT_VALIDATION_MESSAGE);
        }

        let in_flight = InFlight::start(&self.state, Action::SendReport);
        let span = info_span!("send_report", session = %self.id);
        let outcome = self.client.send_report(&self.form).instrument(span).await;
        in_flight.finish();

        let next = match outcome {
            Ok(receipt) => succeeded(Action::SendReport, receipt.notice().to_string()),
            Err(error) => failed(Action::SendReport, error),
        };
        self.settle(next)
    }

    /// Leaves a settled state for `Idle`, clearing the previous notice or error.
    fn begin(&mut self) {
        self.publish(SessionState::default());
    }

    fn reject(&mut self, message: &str) -> SessionState {
        info!(session = %self.id, "Action rejected locally: {message}");
        self.settle(SessionState::Idle {
            validation: Some(message.to_string()),
        })
    }

    fn settle(&mut self, next: SessionState) -> SessionState {
        self.publish(next.clone());
        next
    }

    fn publish(&self, next: SessionState) {
        self.state.send_replace(next);
    }
}

/// Holds the session in `Submitting` for the duration of one request. If the
/// request future is dropped before `finish`, the session returns to `Idle`.
struct InFlight<'a> {
    state: &'a watch::Sender<SessionState>,
    action: Action,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a watch::Sender<SessionState>, action: Action) -> Self {
        state.send_replace(SessionState::Submitting { action });
        Self {
            state,
            action,
            done: false,
        }
    }

    fn finish(mut self) {
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            warn!(action = ?self.action, "Request abandoned before completion");
            self.state.send_replace(SessionState::default());
        }
    }
}

fn succeeded(action: Action, notice: String) -> SessionState {
    SessionState::Succeeded {
        action,
        notice,
        finished_at: Utc::now(),
    }
}

fn failed(action: Action, error: NormalizedError) -> SessionState {
    SessionState::Failed {
        action,
        error,
        finished_at: Utc::now(),
    }
}
