//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Function endpoint used when nothing else is configured. Carries no key.
pub const DEFAULT_FUNCTION_URL: &str = "https://myfunctionforblazor.azurewebsites.net/api/Function1";

/// Query parameter the function host reads the access key from.
pub const KEY_QUERY_PARAM: &str = "code";

pub const URL_ENV_VAR: &str = "FNINVOKE_FUNCTION_URL";
pub const KEY_ENV_VAR: &str = "FNINVOKE_FUNCTION_KEY";

/// Config store keys.
pub const URL_CONFIG_KEY: &str = "function_url";
pub const KEY_CONFIG_KEY: &str = "function_key";

/// Client timeout applied by the CLI when it builds the HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const USER_AGENT: &str = concat!("fninvoke/", env!("CARGO_PKG_VERSION"));

/// Default database path: `~/.fninvoke/fninvoke.db`.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".fninvoke").join("fninvoke.db"))
}

/// Mask a secret for display. Secrets shorter than 12 characters are fully
/// masked; longer ones reveal at most a quarter of their tail, capped at 4.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    let shown = if count < 12 { 0 } else { (count / 4).min(4) };
    let tail: String = secret.chars().skip(count - shown).collect();
    format!("{}{}", "*".repeat(count - shown), tail)
}
