pub mod analysis;
pub mod report;

pub use analysis::{AnalysisResult, GitHubFacts, ResumeFacts};
pub use report::ReportReceipt;
