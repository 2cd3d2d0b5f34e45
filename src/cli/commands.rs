//! CLI definition using clap.
//!
//! Every clone setting is optional on the command line so the config file
//! can supply it; built-in defaults live in `Config`.

use clap::Parser;
use std::path::PathBuf;

use clonehub::listing::ENV_TOKEN_SENTINEL;

/// Clonehub - clone all public repos of a GitHub user
#[derive(Parser, Debug)]
#[command(name = "clonehub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// GitHub username to clone repos from
    #[arg(short, long)]
    pub username: Option<String>,

    /// Directory to clone repos into (must not exist) [default: ./repos]
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Number of clones to run in parallel [default: 5]
    #[arg(short, long, visible_alias = "n-threads")]
    pub workers: Option<usize>,

    /// Clone attempts per repository; 0 skips cloning [default: 5]
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Seconds to wait between attempts [default: 5]
    #[arg(long)]
    pub retry_delay_secs: Option<u64>,

    /// Give up on a single attempt after this many seconds
    #[arg(long)]
    pub attempt_timeout_secs: Option<u64>,

    /// Show a progress bar
    #[arg(short = 'p', long)]
    pub show_progress: bool,

    /// File containing a GitHub personal access token; #ENV reads GH_TOKEN
    #[arg(long, default_value = ENV_TOKEN_SENTINEL)]
    pub token: String,

    /// Also clone repositories that are forks
    #[arg(long)]
    pub include_forks: bool,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
