use serde::{Deserialize, Serialize};

pub const DEFAULT_REPORT_NOTICE: &str = "Weekly report sent successfully!";

/// Acknowledgement returned by the external service after dispatching a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReceipt {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl ReportReceipt {
    /// The message to show the user, falling back to a fixed notice.
    pub fn notice(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_REPORT_NOTICE)
    }
}
