use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fninvoke::cli::{ConfigAction, handle_config, run_invocations};
use fninvoke::config::Config;
use fninvoke::consts::{DEFAULT_TIMEOUT, USER_AGENT, default_db_path};
use fninvoke::invoker::FunctionInvoker;
use fninvoke::spinner::Spinner;

#[derive(Parser)]
#[command(
    name = "fninvoke",
    version,
    about = "Invoke a cloud function over HTTP and print what it says."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Function URL (overrides stored config and FNINVOKE_FUNCTION_URL)
    #[arg(long)]
    url: Option<String>,

    /// Function access key, sent as the `code` query parameter
    /// (overrides stored config and FNINVOKE_FUNCTION_KEY)
    #[arg(long)]
    key: Option<String>,

    /// SQLite database for stored config (default: ~/.fninvoke/fninvoke.db)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// HTTP client timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Number of invocations to issue concurrently
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Print each result as a JSON object
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Manage stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config = open_config(cli.db.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    if let Some(Command::Config { action }) = &cli.command {
        handle_config(
            &config,
            action,
            cli.url.clone(),
            cli.key.clone(),
            |name| std::env::var(name).ok(),
            &mut stdout,
        )?;
        return Ok(ExitCode::SUCCESS);
    }

    let endpoint = config.endpoint_settings(cli.url, cli.key)?.endpoint()?;
    if !endpoint.has_key() {
        tracing::warn!(endpoint = %endpoint, "no access key configured");
    }

    // The caller owns the client; the invoker only borrows its transport.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;
    let invoker = FunctionInvoker::new(client, endpoint);

    let spinner = Spinner::start_if_tty("invoking", cli.count);
    let report = run_invocations(&invoker, cli.count, cli.json, spinner.as_ref(), &mut stdout).await;
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    Ok(report?.exit_code())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_config(db: Option<&Path>) -> Result<Config> {
    let path = match db {
        Some(path) => path.to_path_buf(),
        None => default_db_path()?,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Config::open(&path)
}
