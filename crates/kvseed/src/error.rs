use miette::Diagnostic;
use thiserror::Error;

/// The error type for kvseed with miette diagnostic reporting
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Error, Diagnostic)]
pub enum KvseedError {
    /// I/O error
    #[error("I/O error")]
    #[diagnostic(code(kvseed::io))]
    Io(#[from] std::io::Error),

    /// The properties could not be read
    #[error("Could not read properties from {input}")]
    #[diagnostic(
        code(kvseed::input),
        help("pass an existing file with --file, or - to read from stdin")
    )]
    Input {
        input: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be loaded
    #[error("Could not load config file: {0:#}")]
    #[diagnostic(code(kvseed::config))]
    Config(anyhow::Error),

    /// A setting that has no default was not given
    #[error("No {name} given")]
    #[diagnostic(
        code(kvseed::missing_setting),
        help("pass --{name} or set `{name}` in the config file")
    )]
    MissingSetting { name: &'static str },

    /// Error from the store client
    #[error("Error from the key-value store")]
    #[diagnostic(code(kvseed::store))]
    Store(#[from] kvseed_consul::Error),
}

pub type KvseedResult<T> = Result<T, KvseedError>;
