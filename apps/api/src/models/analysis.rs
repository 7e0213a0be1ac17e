//! Result Model — the aggregated analysis returned by the external service.
//!
//! Shapes are validated on deserialisation. When a section carries `error`, its
//! other fields are placeholders and presentation shows the error instead, so they
//! default when absent. Without `error` every non-optional field must be present.

use serde::{Deserialize, Serialize};

/// Résumé facts extracted by the external service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResumeFacts")]
pub struct ResumeFacts {
    pub name: String,
    pub education: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GitHub profile facts gathered by the external service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGitHubFacts")]
pub struct GitHubFacts {
    pub repo_count: u64,
    pub languages: Vec<String>,
    pub total_stars: u64,
    pub readme_quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One completed analysis. Never mutated; a new analysis replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub resume: ResumeFacts,
    pub github: GitHubFacts,
    /// Newline-delimited paragraphs.
    pub advice: String,
}

impl ResumeFacts {
    /// False when the service reported an error; the other fields are placeholders then.
    pub fn is_reliable(&self) -> bool {
        self.error.is_none()
    }

    pub fn warnings(&self) -> &[String] {
        self.warnings.as_deref().unwrap_or_default()
    }
}

impl GitHubFacts {
    pub fn is_reliable(&self) -> bool {
        self.error.is_none()
    }
}

impl AnalysisResult {
    /// Non-empty advice lines in order.
    pub fn advice_paragraphs(&self) -> impl Iterator<Item = &str> {
        self.advice
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

#[derive(Deserialize)]
struct RawResumeFacts {
    name: Option<String>,
    education: Option<String>,
    skills: Option<Vec<String>>,
    warnings: Option<Vec<String>>,
    error: Option<String>,
}

impl TryFrom<RawResumeFacts> for ResumeFacts {
    type Error = String;

    fn try_from(raw: RawResumeFacts) -> Result<Self, Self::Error> {
        if raw.error.is_some() {
            return Ok(ResumeFacts {
                name: raw.name.unwrap_or_default(),
                education: raw.education.unwrap_or_default(),
                skills: raw.skills.unwrap_or_default(),
                warnings: raw.warnings,
                error: raw.error,
            });
        }

        Ok(ResumeFacts {
            name: raw.name.ok_or_else(|| missing("resume", "name"))?,
            education: raw.education.ok_or_else(|| missing("resume", "education"))?,
            skills: raw.skills.ok_or_else(|| missing("resume", "skills"))?,
            warnings: raw.warnings,
            error: None,
        })
    }
}

#[derive(Deserialize)]
struct RawGitHubFacts {
    repo_count: Option<u64>,
    languages: Option<Vec<String>>,
    total_stars: Option<u64>,
    readme_quality: Option<String>,
    commit_frequency: Option<f64>,
    error: Option<String>,
}

impl TryFrom<RawGitHubFacts> for GitHubFacts {
    type Error = String;

    fn try_from(raw: RawGitHubFacts) -> Result<Self, Self::Error> {
        if raw.error.is_some() {
            return Ok(GitHubFacts {
                repo_count: raw.repo_count.unwrap_or_default(),
                languages: raw.languages.unwrap_or_default(),
                total_stars: raw.total_stars.unwrap_or_default(),
                readme_quality: raw.readme_quality.unwrap_or_default(),
                commit_frequency: raw.commit_frequency,
                error: raw.error,
            });
        }

        Ok(GitHubFacts {
            repo_count: raw.repo_count.ok_or_else(|| missing("github", "repo_count"))?,
            languages: raw.languages.ok_or_else(|| missing("github", "languages"))?,
            total_stars: raw.total_stars.ok_or_else(|| missing("github", "total_stars"))?,
            readme_quality: raw
                .readme_quality
                .ok_or_else(|| missing("github", "readme_quality"))?,
            commit_frequency: raw.commit_frequency,
            error: None,
        })
    }
}

fn missing(section: &str, field: &str) -> String {
    format!("{section} section is missing `{field}`")
}
