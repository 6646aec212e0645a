//! CLI binary for edgequake-legaldoc.
//!
//! A thin shim over the library crate: maps flags to `ToolConfig`, drives one
//! `SessionController` per invocation and prints the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_legaldoc::present::{to_html, to_text};
use edgequake_legaldoc::{
    Collaborators, InputSlot, LegalDocError, OperationResult, PipelineProgressCallback,
    ProgressCallback, SessionController, Stage, TemplateKind, Tool, ToolConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner whose message follows the current pipeline stage.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Instant,
}

impl CliProgressCallback {
    fn new(tool: Tool) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix(tool.to_string());
        bar.set_message("starting…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Instant::now(),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage) {
        if matches!(stage, Stage::Decode | Stage::Invoke) {
            self.bar.println(format!(
                "  {} {}  {}",
                green("✓"),
                stage,
                dim(&format!("{:.1}s", self.started.elapsed().as_secs_f64()))
            ));
        }
    }

    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.bar.println(format!("  {} {}", red("✗"), stage));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract clauses from a contract
  legaldoc extract nda.pdf

  # Compare two versions, HTML output
  legaldoc compare msa-v1.docx msa-v2.docx --html -o diff.html

  # Draft a statement of work from a details file
  legaldoc generate --template sow --details project.txt -o sow.txt

  # Draft an NDA from inline details
  legaldoc generate --text "Parties: Innovate Corp and Data Solutions LLC"

SUPPORTED INPUTS:
  .txt    read as UTF-8
  .pdf    text layer via pdfium (pass --pdfium-lib if it is not on the library path)
  .docx   document body text
  Each input is limited to 100,000 characters after decoding.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY   Google Gemini API key
  RUST_LOG         Log filter override (e.g. edgequake_legaldoc=debug)
"#;

/// Extract clauses, compare versions, and draft contracts with Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "legaldoc",
    version,
    about = "Extract clauses, compare versions, and draft contracts with Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Gemini API key.
    #[arg(long, env = edgequake_legaldoc::config::API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, global = true, default_value = edgequake_legaldoc::config::DEFAULT_MODEL)]
    model: String,

    /// API root of the generation service.
    #[arg(long, global = true, default_value = edgequake_legaldoc::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds (default: wait indefinitely).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to libpdfium.
    #[arg(long, global = true)]
    pdfium_lib: Option<PathBuf>,

    /// Output the result as JSON.
    #[arg(long, global = true, conflicts_with = "html")]
    json: bool,

    /// Output the result as an HTML fragment.
    #[arg(long, global = true)]
    html: bool,

    /// Write the result to this file instead of stdout.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify key clauses in a contract.
    Extract {
        /// Contract file (.txt, .pdf, .docx).
        file: PathBuf,
    },
    /// Show the differences between two versions of a contract.
    Compare {
        /// Version A (original).
        before: PathBuf,
        /// Version B (revised).
        after: PathBuf,
    },
    /// Draft a contract from a template and free-form details.
    Generate {
        /// Contract template.
        #[arg(long, value_enum, default_value = "nda")]
        template: TemplateArg,

        /// File with the contract details (.txt, .pdf, .docx).
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        details: Option<PathBuf>,

        /// Contract details given inline.
        #[arg(long)]
        text: Option<String>,
    },
}

impl Command {
    fn tool(&self) -> Tool {
        match self {
            Command::Extract { .. } => Tool::ClauseExtractor,
            Command::Compare { .. } => Tool::VersionComparer,
            Command::Generate { .. } => Tool::DraftGenerator,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TemplateArg {
    Nda,
    Sow,
    Msa,
}

impl From<TemplateArg> for TemplateKind {
    fn from(v: TemplateArg) -> Self {
        match v {
            TemplateArg::Nda => TemplateKind::Nda,
            TemplateArg::Sow => TemplateKind::Sow,
            TemplateArg::Msa => TemplateKind::Msa,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs; -v always wins.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let tool = cli.command.tool();
    let spinner = show_progress.then(|| CliProgressCallback::new(tool));
    let progress: Option<ProgressCallback> = spinner
        .clone()
        .map(|cb| cb as Arc<dyn PipelineProgressCallback>);

    let config = build_config(&cli, progress)?;

    // A missing pdfium only matters for .pdf inputs, which then fail with
    // "library not loaded".
    if Collaborators::global().load(&config).await.is_err() {
        tracing::debug!("Continuing without PDF support");
    }

    let session = SessionController::new(tool, &config).context("Failed to create session")?;

    let outcome = run(&cli.command, &session).await;
    if let Some(ref cb) = spinner {
        cb.finish();
    }

    let result = match outcome {
        Ok(Some(result)) => result,
        Ok(None) => anyhow::bail!("run was superseded"),
        Err(e) => {
            eprintln!("{} {}", red("✘"), bold(&e.user_message(tool.action())));
            if !cli.quiet {
                eprintln!("  {}", dim(&e.to_string()));
            }
            std::process::exit(1);
        }
    };

    write_result(&cli, &result).await?;

    if !cli.quiet {
        eprintln!("{} {}", green("✔"), summary(&result));
    }
    Ok(())
}

/// Load the inputs into the session and submit.
async fn run(
    command: &Command,
    session: &SessionController,
) -> Result<Option<OperationResult>, LegalDocError> {
    match command {
        Command::Extract { file } => {
            session.select_path(InputSlot::Primary, file).await?;
        }
        Command::Compare { before, after } => {
            futures::try_join!(
                session.select_path(InputSlot::Primary, before),
                session.select_path(InputSlot::Secondary, after),
            )?;
        }
        Command::Generate {
            template,
            details,
            text,
        } => {
            session.set_template((*template).into());
            match (details, text) {
                (Some(path), _) => {
                    session.select_path(InputSlot::Primary, path).await?;
                }
                (None, Some(text)) => session.set_text(InputSlot::Primary, text.as_str())?,
                (None, None) => {}
            }
        }
    }
    session.submit().await
}

/// Map CLI args to `ToolConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ToolConfig> {
    let mut builder = ToolConfig::builder()
        .model(cli.model.as_str())
        .base_url(cli.base_url.as_str());

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.as_str());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn write_result(cli: &Cli, result: &OperationResult) -> Result<()> {
    let rendered = if cli.json {
        let mut json = serde_json::to_string_pretty(result).context("Failed to serialise result")?;
        json.push('\n');
        json
    } else if cli.html {
        to_html(result)
    } else {
        to_text(result)
    };

    match cli.output {
        Some(ref path) => {
            tokio::fs::write(path, rendered.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!("{} wrote {}", cyan("◆"), bold(&path.display().to_string()));
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn summary(result: &OperationResult) -> String {
    match result {
        OperationResult::Extraction(r) => format!("{} clauses identified", r.len()),
        OperationResult::Comparison(r) => format!(
            "{} removed, {} added",
            r.count(edgequake_legaldoc::DiffKind::Removed),
            r.count(edgequake_legaldoc::DiffKind::Added)
        ),
        OperationResult::Generation(r) => format!("draft of {} characters", r.as_str().chars().count()),
    }
}
