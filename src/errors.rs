use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("external command failed: {command}")]
    ToolFailure { command: String },

    #[error("failed to run {command}: {source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid zone name: {0:?}")]
    InvalidZoneName(String),

    #[error("zone file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("zone not found: {0}")]
    ZoneNotFound(String),

    #[error("domain not found: {0}")]
    DomainNotFound(String),

    #[error("zone {0} is already frozen")]
    AlreadyFrozen(String),

    #[error("zone {0} is not frozen")]
    NotFrozen(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
