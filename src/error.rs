use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Kind;

/// Error returned by a finalize callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CmdError {
    #[error("Unsupported kind '{kind}' for flag '{name}'")]
    UnsupportedKind { name: String, kind: Kind },

    #[error("Duplicate config key '{0}'")]
    DuplicateKey(String),

    #[error("Flag '--{0}' is reserved")]
    ReservedFlag(String),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("invalid argument \"{value}\" for \"--{flag}\" flag: {reason}")]
    InvalidArgument {
        value: String,
        flag: String,
        reason: String,
    },

    #[error("required flag(s) {} not set", quote_list(.0))]
    MissingRequired(Vec<String>),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<CmdError>),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid value \"{value}\" in ${var}: {reason}")]
    InvalidEnv {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Failed to unmarshal config: {0}")]
    Unmarshal(#[source] toml::de::Error),

    #[error("{0}")]
    Finalize(#[source] BoxError),

    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("\"{n}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
