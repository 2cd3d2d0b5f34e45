//! Access token resolution.
//!
//! `--token #ENV` reads `GH_TOKEN`; any other value is a path to a file whose
//! first line is the token.

use std::fs;
use std::path::Path;

use crate::error::{ClonehubError, Result};

/// Token argument meaning "read it from the environment"
pub const ENV_TOKEN_SENTINEL: &str = "#ENV";

/// Environment variable holding the token
pub const TOKEN_ENV_VAR: &str = "GH_TOKEN";

/// Resolve the token argument using the process environment.
pub fn resolve_token(arg: Option<&str>) -> Result<Option<String>> {
    resolve_token_with(arg, |name| std::env::var(name).ok())
}

/// Resolve the token argument with an explicit environment lookup.
///
/// Empty tokens count as no token at all.
pub fn resolve_token_with<F>(arg: Option<&str>, env: F) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let token = match arg {
        None => None,
        Some(ENV_TOKEN_SENTINEL) => env(TOKEN_ENV_VAR),
        Some(path) => Some(read_token_file(Path::new(path))?),
    };

    Ok(token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
}

fn read_token_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ClonehubError::TokenFileMissing(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    log::debug!("Read token from {}", path.display());
    Ok(content.lines().next().unwrap_or_default().to_string())
}
