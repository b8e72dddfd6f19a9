//! Provider credential resolution.
//!
//! Each credential is looked up in a named environment variable. When the
//! variable is unset an interactive prompt is attempted once; in a
//! non-interactive environment the credential is treated as permanently
//! absent for the process lifetime. There is no retry.

use std::io::{self, BufRead, Write};

use tracing::{info, warn};

/// Resolve an API key for a provider.
///
/// Returns `None` when neither the environment nor the operator supplies a
/// key; the corresponding backend then serves deterministic mock output.
pub fn resolve_api_key(env_var: &str, provider: &str) -> Option<String> {
    if let Ok(key) = std::env::var(env_var) {
        if !key.is_empty() {
            info!("Found API key for {} in {}", provider, env_var);
            return Some(key);
        }
    }

    warn!("Environment variable {} for {} not set", env_var, provider);
    match prompt_for_key(provider) {
        Some(key) => {
            info!("API key for {} provided interactively", provider);
            Some(key)
        }
        None => {
            warn!(
                "No API key for {}; backend will serve mock responses",
                provider
            );
            None
        }
    }
}

fn prompt_for_key(provider: &str) -> Option<String> {
    let mut stdout = io::stdout();
    if write!(
        stdout,
        "Enter {} API key (or press Enter to skip): ",
        provider
    )
    .and_then(|_| stdout.flush())
    .is_err()
    {
        return None;
    }

    let mut line = String::new();
    // EOF or a read error means a non-interactive environment.
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let key = line.trim();
            if key.is_empty() {
                None
            } else {
                Some(key.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_wins() {
        std::env::set_var("CHRONICLE_TEST_KEY", "sk-test-123");
        let key = resolve_api_key("CHRONICLE_TEST_KEY", "Test");
        assert_eq!(key.as_deref(), Some("sk-test-123"));
        std::env::remove_var("CHRONICLE_TEST_KEY");
    }
}
