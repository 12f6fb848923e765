//! Command-line arguments.

use clap::Parser;

use wac_core::{DEFAULT_WAIT_SECS, DEFAULT_WORKERS};

#[derive(Parser, Debug)]
#[command(
    name = "wac",
    about = "Web access checker — check URLs and report which ones grant access",
    version,
    after_help = "At least one of --status, --redirect or --body is required.\n\
                  Cookie and auth may also be given via WAC_COOKIE and WAC_AUTH."
)]
pub struct Cli {
    /// Number of request threads (1-100)
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub threads: usize,

    /// Cookie to use for requests
    #[arg(short, long)]
    pub cookie: Option<String>,

    /// Authorization to use for requests in format username:password
    #[arg(short, long)]
    pub auth: Option<String>,

    /// Number of seconds to wait before timing out a request (1-900)
    #[arg(short, long, default_value_t = DEFAULT_WAIT_SECS)]
    pub wait: u64,

    /// Deny when this status code is returned, e.g. 401
    #[arg(short, long)]
    pub status: Option<u16>,

    /// Deny when a redirect to exactly this Location is returned
    #[arg(short, long)]
    pub redirect: Option<String>,

    /// Deny when the body contains this text, e.g. 'login is invalid'
    #[arg(short, long)]
    pub body: Option<String>,

    /// Emit findings as JSON lines instead of text
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// File with URLs on separate lines. Stdin is used when - is provided
    #[arg(value_name = "URL_FILE")]
    pub urls: String,
}
