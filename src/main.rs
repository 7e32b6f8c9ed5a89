use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use miette::Result;
use tracing::{info, Level};

use steward_core::{RepoId, StewardConfig};
use steward_review::applier::CommentApplier;
use steward_review::generator::ReviewGenerator;
use steward_review::github::GitHubClient;
use steward_review::host::{DryRun, PullRequestHost};
use steward_review::llm::GeminiClient;

#[derive(Parser)]
#[command(
    name = "steward",
    version,
    about = "Review a pull request against a standards document with Gemini",
    long_about = "Review a pull request against a standards document with Gemini.\n\n\
                   Fetches the pull request diff, asks the model for line-level findings,\n\
                   posts them as review comments and assigns a human reviewer when the\n\
                   model signals the change is ready.\n\n\
                   Environment:\n  \
                     GITHUB_TOKEN     GitHub token (GH_TOKEN is also accepted)\n  \
                     GEMINI_API_KEY   Gemini API key\n  \
                     HUMAN_REVIEWER   Login assigned on handoff\n\n\
                   Examples:\n  \
                     steward 1234                  Review PR #1234\n  \
                     steward 1234 --dry-run        Show what would be posted\n  \
                     steward 1234 --repo me/fork   Review a PR on another repository"
)]
struct Cli {
    /// Pull request number to review
    pr_number: u64,

    /// Path to configuration file (default: .steward.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Standards document to review against
    #[arg(long)]
    standards: Option<PathBuf>,

    /// Repository to review (format: owner/name)
    #[arg(long)]
    repo: Option<RepoId>,

    /// Fetch and review, but only log the comments instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<StewardConfig> {
    let config = match &cli.config {
        Some(path) => StewardConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".steward.toml");
            if default_path.exists() {
                StewardConfig::from_file(default_path)?
            } else {
                StewardConfig::default()
            }
        }
    };

    let mut config = config.apply_env(|key| std::env::var(key).ok());
    if let Some(repo) = &cli.repo {
        config.github.repository = repo.clone();
    }
    if let Some(standards) = &cli.standards {
        config.review.standards_path = standards.clone();
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = load_config(&cli)?;
    let token = config.github_token()?;
    let api_key = config.llm_api_key()?;
    let reviewer = config.reviewer()?;
    let pr_ref = format!("{}#{}", config.github.repository, cli.pr_number);

    let github = GitHubClient::new(
        token,
        config.github.repository.clone(),
        config.github.api_base.as_deref(),
    )?;
    let host: Box<dyn PullRequestHost> = if cli.dry_run {
        info!("dry run: nothing will be posted to {pr_ref}");
        Box::new(DryRun::new(github))
    } else {
        Box::new(github)
    };
    let model = GeminiClient::new(&config.llm, api_key)?;

    let generator = ReviewGenerator::new(host.as_ref(), &model, &config.review);
    let prepared = generator.prepare(cli.pr_number).await?;

    let spinner = if std::io::stderr().is_terminal() {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                .unwrap(),
        );
        pb.set_message(format!(
            "Reviewing {} changed files with {}...",
            prepared.files_changed, config.llm.model
        ));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let review = generator.complete(prepared).await.inspect_err(|_e| {
        if let Some(pb) = &spinner {
            pb.finish_with_message("Failed");
        }
    })?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = CommentApplier::new(host.as_ref(), cli.pr_number, reviewer)
        .apply(&review)
        .await?;

    println!("{pr_ref}: {report}");

    Ok(())
}
