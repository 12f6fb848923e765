//! Configuration resolution from flags and environment.

use std::time::Duration;

use wac_core::{ConfigResult, Credentials, DetectionRules, ScanConfig};

use crate::args::Cli;

pub const COOKIE_ENV: &str = "WAC_COOKIE";
pub const AUTH_ENV: &str = "WAC_AUTH";

/// Resolve a secret: explicit flag > environment variable.
pub fn resolve_secret(explicit: Option<&str>, env_var: &str) -> Option<String> {
    if let Some(value) = explicit {
        return Some(value.to_string());
    }
    std::env::var(env_var).ok().filter(|v| !v.is_empty())
}

/// Build and validate the scan configuration from parsed arguments.
pub fn scan_config(cli: &Cli) -> ConfigResult<ScanConfig> {
    scan_config_with(
        cli,
        resolve_secret(cli.cookie.as_deref(), COOKIE_ENV),
        resolve_secret(cli.auth.as_deref(), AUTH_ENV),
    )
}

fn scan_config_with(
    cli: &Cli,
    cookie: Option<String>,
    auth: Option<String>,
) -> ConfigResult<ScanConfig> {
    let mut rules = DetectionRules::new();
    if let Some(code) = cli.status {
        rules = rules.with_status(code);
    }
    if let Some(location) = &cli.redirect {
        rules = rules.with_redirect(location.as_str());
    }
    if let Some(needle) = &cli.body {
        rules = rules.with_body(needle.as_str());
    }

    let mut config = ScanConfig::new(rules)
        .with_workers(cli.threads)
        .with_wait(Duration::from_secs(cli.wait));

    if let Some(cookie) = cookie {
        config = config.with_cookie(cookie);
    }
    if let Some(auth) = auth.filter(|a| !a.is_empty()) {
        config = config.with_credentials(auth.parse::<Credentials>()?);
    }

    config.validate()?;
    Ok(config)
}
