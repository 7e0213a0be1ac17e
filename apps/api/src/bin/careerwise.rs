//! Terminal client for a running CareerWise proxy.
//!
//!   careerwise analyze --username octocat --resume cv.pdf
//!   careerwise send-report --username octocat --email me@example.com

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use careerwise_api::render::render_analysis;
use careerwise_api::request::ResumeFile;
use careerwise_api::session::{HttpProxyClient, Session, SessionState};

#[derive(Parser, Debug)]
#[command(name = "careerwise")]
#[command(about = "Analyze a résumé and GitHub profile through the CareerWise proxy")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Base URL of the CareerWise proxy.
    #[arg(long, env = "CAREERWISE_PROXY_URL", default_value = "http://localhost:3000")]
    proxy_url: String,

    /// Log level (trace/debug/info/warn/error).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a profile analysis and print the report.
    Analyze {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        /// Résumé PDF to upload.
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Email the weekly report.
    SendReport {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::new(format!("careerwise_api={0},careerwise={0}", args.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = HttpProxyClient::new(&args.proxy_url)?;
    let mut session = Session::new(client);

    let state = match args.cmd {
        Command::Analyze {
            username,
            email,
            resume,
        } => {
            let form = session.form_mut();
            form.github_username = username;
            form.email = email.unwrap_or_default();
            form.resume_file = match resume {
                Some(path) => Some(load_resume(&path).await?),
                None => None,
            };
            session.analyze().await
        }
        Command::SendReport { username, email } => {
            let form = session.form_mut();
            form.github_username = username;
            form.email = email;
            session.send_report().await
        }
    };

    if let Some(message) = state.error_message() {
        error!("{message}");
        std::process::exit(1);
    }

    if let SessionState::Succeeded { notice, .. } = &state {
        eprintln!("{notice}");
    }
    if let Some(analysis) = session.analysis() {
        print!("{}", render_analysis(&analysis));
    }

    Ok(())
}

async fn load_resume(path: &Path) -> Result<ResumeFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read résumé at {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let content_type = path
        .extension()
        .filter(|ext| ext.eq_ignore_ascii_case("pdf"))
        .map(|_| "application/pdf".to_string());

    Ok(ResumeFile::new(file_name, content_type, Bytes::from(bytes)))
}
