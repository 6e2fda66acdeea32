//! What the `fninvoke` binary does once its arguments are parsed: run a
//! batch of invocations and report them, or act on the config store.
//! Output goes to a caller-supplied writer.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{Subcommand, ValueEnum};

use crate::config::Config;
use crate::consts::{KEY_CONFIG_KEY, URL_CONFIG_KEY, mask_secret};
use crate::invoker::{Endpoint, FunctionInvoker, Transport, redact_url};
use crate::spinner::Spinner;

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Print a stored value (secrets are masked)
    Get { setting: Setting },
    /// Store a value
    Set { setting: Setting, value: String },
    /// Remove a stored value
    Unset { setting: Setting },
    /// Print the endpoint that would be invoked
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Setting {
    Url,
    Key,
}

impl Setting {
    pub fn config_key(self) -> &'static str {
        match self {
            Setting::Url => URL_CONFIG_KEY,
            Setting::Key => KEY_CONFIG_KEY,
        }
    }

    /// A stored URL may embed a key or password, so both settings are masked.
    pub fn display(self, value: &str) -> String {
        match self {
            Setting::Url => redact_url(value),
            Setting::Key => mask_secret(value),
        }
    }
}

/// Tally of one batch of invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub total: usize,
    pub succeeded: usize,
}

impl Report {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.all_succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Issue `count` invocations concurrently and write one line per result, in
/// call order: the rendered text, or a JSON object with `json`.
pub async fn run_invocations<T: Transport>(
    invoker: &FunctionInvoker<T>,
    count: usize,
    json: bool,
    progress: Option<&Spinner>,
    out: &mut impl Write,
) -> Result<Report> {
    if count == 0 {
        bail!("--count must be at least 1");
    }

    let calls = (0..count).map(move |_| async move {
        let result = invoker.invoke().await;
        if let Some(progress) = progress {
            progress.finish_one();
        }
        result
    });
    let results = futures::future::join_all(calls).await;

    let mut succeeded = 0;
    for result in &results {
        if result.is_success() {
            succeeded += 1;
        }
        if json {
            writeln!(out, "{}", serde_json::to_string(result)?)?;
        } else {
            writeln!(out, "{result}")?;
        }
    }

    Ok(Report {
        total: count,
        succeeded,
    })
}

/// Run a `config` subcommand. `env` reads environment variables, for the
/// endpoint resolution `show` performs.
pub fn handle_config(
    config: &Config,
    action: &ConfigAction,
    url_flag: Option<String>,
    key_flag: Option<String>,
    env: impl Fn(&str) -> Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    match action {
        ConfigAction::Get { setting } => match config.get(setting.config_key())? {
            Some(value) => writeln!(out, "{}", setting.display(&value))?,
            None => writeln!(out, "(not set)")?,
        },
        ConfigAction::Set { setting, value } => {
            if let Setting::Url = setting {
                // Reject bad URLs now rather than on the next invocation.
                Endpoint::new(value, None)?;
            }
            config.set(setting.config_key(), value)?;
            writeln!(out, "✓ {} saved.", setting.config_key())?;
        }
        ConfigAction::Unset { setting } => {
            config.remove(setting.config_key())?;
            writeln!(out, "✓ {} removed.", setting.config_key())?;
        }
        ConfigAction::Show => {
            let endpoint = config
                .endpoint_settings_with(url_flag, key_flag, env)?
                .endpoint()?;
            writeln!(out, "endpoint  {endpoint}")?;
            writeln!(
                out,
                "key       {}",
                if endpoint.has_key() { "set" } else { "not set" }
            )?;
        }
    }
    Ok(())
}
