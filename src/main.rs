//! aicommits - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aicommits::commit::get_staged_diff;
use aicommits::config::{Config, ConfigOverrides};
use aicommits::git::{PROMPT_TITLE_FILE, Workspace, commit, stage_tracked};
use aicommits::llm::{VendorKind, connect};
use aicommits::session::{DialoguerPrompter, Prompter, RefinementSession, final_edit};
use aicommits::CommitError;

/// Draft a commit message for the staged changes with an LLM.
#[derive(Parser, Debug)]
#[command(name = "aicommits")]
#[command(about = "Draft git commit messages with an LLM")]
#[command(version)]
struct Cli {
    /// Number of messages to generate (1-30)
    #[arg(short = 'g', long)]
    generate: Option<String>,

    /// Maximum commit message length in characters (at least 20)
    #[arg(long)]
    max_length: Option<String>,

    /// Files to exclude from the diff (pathspec glob, repeatable)
    #[arg(short = 'x', long)]
    exclude: Vec<String>,

    /// Stage changes to tracked files before generating
    #[arg(short = 'a', long)]
    all: bool,

    /// Preferred conventional commit type, e.g. fix or feat
    #[arg(short = 't', long = "type")]
    commit_type: Option<String>,

    /// LLM vendor: openai, gemini, anthropic, or ollama
    #[arg(long)]
    vendor: Option<String>,

    /// Model tier: high, middle, or low
    #[arg(long)]
    tier: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Extra arguments passed to `git commit`
    #[arg(last = true)]
    git_args: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err
                .downcast_ref::<CommitError>()
                .is_some_and(CommitError::is_cancelled)
            {
                eprintln!("Commit cancelled");
                return ExitCode::SUCCESS;
            }
            eprintln!("✖ {err}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "aicommits=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // Step 1: Validate configuration before touching the repository
    let config = Config::resolve(&ConfigOverrides {
        generate: cli.generate,
        max_length: cli.max_length,
        vendor: cli.vendor,
        tier: cli.tier,
    })
    .map_err(CommitError::from)?;

    // Step 2: Locate the repository
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let workspace = Workspace::discover(&cwd).map_err(CommitError::from)?;

    let mut prompter = DialoguerPrompter::new();

    // Step 3: Repository-level prompt inputs
    let project_signals = workspace.detect_signals();
    for signal in &project_signals {
        prompter.note(&format!("🚀 {signal} project detected"));
    }

    let additional_instruction = workspace.read_prompt_file(PROMPT_TITLE_FILE);
    if additional_instruction.is_some() {
        prompter.note(&format!(
            "📝 Using additional instruction from .git/{PROMPT_TITLE_FILE}"
        ));
    }

    // Step 4: Collect the staged diff
    if cli.all {
        stage_tracked(workspace.root()).map_err(CommitError::from)?;
    }

    let diff = get_staged_diff(workspace.root(), &cli.exclude)
        .map_err(CommitError::from)?
        .ok_or(CommitError::NoStagedChanges)?;

    prompter.note(&diff.detected_message());
    for file in diff.files() {
        prompter.note(&format!("     {file}"));
    }

    // Step 5: Connect to the vendor
    let kind = match config.vendor {
        Some(kind) => kind,
        None => pick_vendor(&mut prompter)?,
    };
    let settings = config.vendor_settings(kind).map_err(CommitError::from)?;
    info!("Using {} model {}", settings.kind, settings.model);
    let vendor = connect(settings, reqwest::Client::new());

    // Step 6: Gather the optional hint and run the session
    let hint = prompter.input("Any hint for the commit message? (Enter to skip)", "")?;
    let hint = Some(hint.trim().to_string()).filter(|h| !h.is_empty());

    let mut constraints = config.constraints();
    constraints.hint = hint;
    constraints.commit_type = cli.commit_type;
    constraints.additional_instruction = additional_instruction;
    constraints.project_signals = project_signals;

    let accepted = {
        let mut session =
            RefinementSession::new(vendor.as_ref(), &mut prompter, Arc::new(diff), constraints)
                .with_cancellation(cancel_on_ctrl_c());
        session.run().await?
    };

    // Step 7: Final edit and commit
    let message = final_edit(&mut prompter, &accepted)?;
    commit(workspace.root(), &message, &cli.git_args).map_err(CommitError::from)?;

    println!("✔ Successfully committed!");
    Ok(())
}

/// Token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });
    token
}

fn pick_vendor<P: Prompter>(prompter: &mut P) -> Result<VendorKind, CommitError> {
    let items: Vec<String> = VendorKind::ALL.iter().map(|k| k.to_string()).collect();
    let choice = prompter.select("Which vendor should draft the message?", &items, 0)?;
    VendorKind::ALL
        .get(choice)
        .copied()
        .ok_or(CommitError::Cancelled)
}
