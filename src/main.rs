use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use inspire_atom::feed::{self, Batch, ProcessOptions};

#[derive(Parser, Debug)]
#[command(
    name = "inspire-atom",
    about = "Generate INSPIRE Download Service Atom feeds from a feed configuration"
)]
struct Args {
    /// Configuration file describing the feeds (YAML, TOML or JSON)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: PathBuf,

    /// Directory the Atom files are written to
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Timeout in seconds for each link metadata probe
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    probe_timeout: u64,

    /// Number of feeds whose links are probed concurrently
    #[arg(long, value_name = "N", default_value_t = feed::processor::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if !args.output.is_dir() {
        anyhow::bail!(
            "Output directory '{}' does not exist",
            args.output.display()
        );
    }

    let batch = Batch::load(&args.file)
        .with_context(|| format!("Failed to load configuration '{}'", args.file.display()))?;
    if batch.feeds.is_empty() {
        tracing::warn!(path = %args.file.display(), "Configuration contains no feeds");
    }

    let options = ProcessOptions {
        probe_timeout: Duration::from_secs(args.probe_timeout),
        concurrency: args.concurrency,
    };
    let client = reqwest::Client::builder()
        .timeout(options.probe_timeout)
        .user_agent(concat!("inspire-atom/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let processed = feed::process_batch(&client, &batch, &options)
        .await
        .context("Failed to process feeds")?;

    // Render everything before writing anything, so a failing feed leaves
    // the output directory untouched.
    let rendered = feed::render_batch(&processed)?;
    for feed in &rendered {
        for warning in &feed.warnings {
            tracing::warn!(feed = %feed.id, "{}", warning);
        }
    }

    for feed in &rendered {
        let path = feed::write_to_file(&feed.bytes, &args.output, &feed.file_name)
            .with_context(|| format!("ATOM feed with id `{}` could not be written", feed.id))?;
        tracing::debug!(feed = %feed.id, path = %path.display(), "Wrote feed");
    }

    tracing::info!(
        count = rendered.len(),
        output = %args.output.display(),
        "ATOM feeds generated"
    );
    Ok(())
}
