//! songbook - merge Google Drive song sheets into one set-list PDF.
//!
//! A thin driver around the library pipeline: collect references, run the
//! merge, write `<output-dir>/<next-sunday>.pdf`, and report skips.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use songbook::config::PipelineConfig;
use songbook::drive::{AccessToken, DriveClient};
use songbook::pipeline::MergePipeline;
use songbook::PipelineError;

#[derive(Parser, Debug)]
#[command(name = "songbook", version, about, arg_required_else_help = true)]
struct Cli {
    /// Drive sharing links or bare file IDs, in output order.
    references: Vec<String>,

    /// Read additional references from a file, one per line, appended
    /// after the positional references. Blank lines and lines starting
    /// with '#' are ignored.
    #[arg(long, value_name = "FILE")]
    input_list: Option<PathBuf>,

    /// OAuth access token for the Drive API (needs drive.readonly scope).
    #[arg(long, env = "DRIVE_ACCESS_TOKEN", hide_env_values = true)]
    token: String,

    /// Directory to write the merged PDF into.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// How many downloads may be in flight at once.
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Show per-entry progress and skip details.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "songbook=debug" } else { "songbook=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<PipelineError>()
            .map(PipelineError::exit_code)
            .unwrap_or(1);
        process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut selection = cli.references.clone();
    if let Some(path) = &cli.input_list {
        selection.extend(read_input_list(path).await?);
    }

    let config = PipelineConfig {
        jobs: cli.jobs,
        request_timeout: Duration::from_secs(cli.timeout),
    };
    config.validate()?;

    let client = DriveClient::new(&config).context("failed to build HTTP client")?;
    let pipeline = MergePipeline::new(&client, &config);
    let token = AccessToken::new(cli.token);

    println!("Merging {} song sheet(s)...", selection.len());
    let output = pipeline.merge(&selection, &token).await?;

    let path = cli.output_dir.join(&output.filename);
    tokio::fs::write(&path, &output.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    for skip in &output.report.skipped {
        eprintln!(
            "Warning: skipped entry {} ({}): {}",
            skip.index + 1,
            skip.reference,
            skip.reason
        );
    }

    println!(
        "✓ Merged {} of {} song sheet(s), {} page(s) -> {}",
        output.report.merged,
        output.report.attempted,
        output.report.total_pages,
        path.display()
    );

    Ok(())
}

/// Read references from a list file, one per line.
async fn read_input_list(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read input list {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
