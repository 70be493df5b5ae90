use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use kvseed_consul::Scheme;
use kvseed_core::APP_NAME;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

pub const CONFIG_FILE_NAME: &str = "config.toml";

const SYSTEM_CONFIG_DIRS: [&str; 2] = ["/etc", "/usr/lib"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub scheme: Option<Scheme>,
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub env: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub userenv: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<LogFilter>,
}

impl Config {
    /// Load the config file at `path`, or probe the system locations.
    ///
    /// A missing file at a system location is not an error; an explicitly
    /// given path has to exist. Nothing is logged here since this runs before
    /// logging is set up; call [`Loaded::log`] once it is.
    pub fn load(path: Option<impl AsRef<Path>>) -> anyhow::Result<Loaded> {
        if let Some(path) = path {
            let path = path.as_ref();
            let config = toml::from_str(&std::fs::read_to_string(path)?)?;

            Ok(Loaded {
                config,
                source: Some(path.to_path_buf()),
                unreadable: Vec::new(),
            })
        } else {
            Self::probe(SYSTEM_CONFIG_DIRS.into_iter().map(Path::new))
        }
    }

    fn probe<'a>(base_paths: impl IntoIterator<Item = &'a Path>) -> anyhow::Result<Loaded> {
        let mut unreadable = Vec::new();

        for base_path in base_paths {
            let path = base_path.join(APP_NAME).join(CONFIG_FILE_NAME);
            match std::fs::read_to_string(&path) {
                Ok(s) => {
                    return Ok(Loaded {
                        config: toml::from_str(&s)?,
                        source: Some(path),
                        unreadable,
                    });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => unreadable.push((path, e)),
            }
        }

        Ok(Loaded {
            unreadable,
            ..Loaded::default()
        })
    }
}

/// A loaded [`Config`] together with where it came from.
#[derive(Debug, Default)]
pub struct Loaded {
    pub config: Config,
    /// The file the config was read from, `None` when defaults are used.
    pub source: Option<PathBuf>,
    /// System config files that exist but could not be read.
    pub unreadable: Vec<(PathBuf, std::io::Error)>,
}

impl Loaded {
    pub fn log(&self) {
        for (path, error) in &self.unreadable {
            tracing::warn!(path = %path.display(), %error, "Skipping unreadable config file");
        }

        match &self.source {
            Some(path) => tracing::debug!("Loaded config file from {}", path.display()),
            None => tracing::debug!("No config file found, using defaults"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFilter {
    None,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogFilter> for LevelFilter {
    fn from(value: LogFilter) -> Self {
        match value {
            LogFilter::None => Self::OFF,
            LogFilter::Error => Self::ERROR,
            LogFilter::Warn => Self::WARN,
            LogFilter::Info => Self::INFO,
            LogFilter::Debug => Self::DEBUG,
            LogFilter::Trace => Self::TRACE,
        }
    }
}
