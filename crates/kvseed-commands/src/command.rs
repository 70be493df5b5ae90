use std::{convert::Infallible, fmt, path::PathBuf, str::FromStr};

use clap::{Command, CommandFactory, Parser};
use kvseed_config::LogFilter;
use kvseed_consul::Scheme;

pub const TOKEN_ENV_VAR: &str = "CONSUL_TOKEN";
pub const ADDR_ENV_VAR: &str = "CONSUL_URL";
pub const CONFIG_ENV_VAR: &str = "KVSEED_CONFIG";
pub const STDIN_MARKER: &str = "-";

/// Where the properties are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl FromStr for Input {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == STDIN_MARKER {
            Ok(Self::Stdin)
        } else {
            Ok(Self::File(s.into()))
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Publish a properties file into the key-value store under
/// config/<env>/<project>/<userenv>, replacing whatever was there.
#[derive(Debug, Parser)]
#[command(name = "kvseed", version, about)]
pub struct Cli {
    /// Store access token
    #[arg(short, long, env = TOKEN_ENV_VAR, hide_env_values = true)]
    pub token: Option<String>,
    /// Store address, as host:port or a full URL
    #[arg(long, env = ADDR_ENV_VAR)]
    pub addr: Option<String>,
    /// Scheme used when the address has none
    #[arg(long, value_enum)]
    pub scheme: Option<Scheme>,
    /// Datacenter to write to
    #[arg(long)]
    pub datacenter: Option<String>,
    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
    /// Main environment [default: dev]
    #[arg(short, long)]
    pub env: Option<String>,
    /// Project name
    #[arg(short, long)]
    pub project: Option<String>,
    /// User environment
    #[arg(short, long)]
    pub userenv: Option<String>,
    /// Properties file, or - for stdin
    #[arg(short, long, default_value = STDIN_MARKER)]
    pub file: Input,
    /// Config file with defaults for the options above
    #[arg(long, env = CONFIG_ENV_VAR)]
    pub config_file: Option<PathBuf>,
    /// Parse and report without touching the store
    #[arg(long)]
    pub dry_run: bool,
    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,
    /// Log level for stderr and the log file
    #[arg(long, value_enum)]
    pub log_level: Option<LogFilter>,
    /// Directory for a rolling log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

pub fn build_cli() -> Command {
    Cli::command()
}
