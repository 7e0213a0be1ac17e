//! Plain-text presentation of an `AnalysisResult`.

use std::fmt;

use crate::models::{AnalysisResult, GitHubFacts, ResumeFacts};

/// Display adapter printing the résumé, GitHub and advice sections.
pub struct AnalysisReport<'a>(pub &'a AnalysisResult);

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        write_resume(f, &result.resume)?;
        writeln!(f)?;
        write_github(f, &result.github)?;
        writeln!(f)?;

        writeln!(f, "Career Recommendations")?;
        for paragraph in result.advice_paragraphs() {
            writeln!(f, "  {paragraph}")?;
        }
        Ok(())
    }
}

pub fn render_analysis(result: &AnalysisResult) -> String {
    AnalysisReport(result).to_string()
}

fn write_resume(f: &mut fmt::Formatter<'_>, resume: &ResumeFacts) -> fmt::Result {
    writeln!(f, "Resume Analysis")?;
    // An error makes the remaining fields placeholders.
    if let Some(error) = &resume.error {
        return writeln!(f, "  ! {error}");
    }

    writeln!(f, "  Name:      {}", resume.name)?;
    writeln!(f, "  Education: {}", resume.education)?;
    if resume.skills.is_empty() {
        writeln!(f, "  Skills:    none detected")?;
    } else {
        writeln!(f, "  Skills:    {}", resume.skills.join(", "))?;
    }
    for warning in resume.warnings() {
        writeln!(f, "  warning: {warning}")?;
    }
    Ok(())
}

fn write_github(f: &mut fmt::Formatter<'_>, github: &GitHubFacts) -> fmt::Result {
    writeln!(f, "GitHub Analysis")?;
    if let Some(error) = &github.error {
        return writeln!(f, "  ! {error}");
    }

    writeln!(f, "  Repositories:   {}", github.repo_count)?;
    writeln!(f, "  Total stars:    {}", github.total_stars)?;
    writeln!(f, "  README quality: {}", github.readme_quality)?;
    if let Some(frequency) = github.commit_frequency {
        writeln!(f, "  Commits/repo:   {frequency:.1}")?;
    }
    if !github.languages.is_empty() {
        writeln!(f, "  Languages:      {}", github.languages.join(", "))?;
    }
    Ok(())
}
