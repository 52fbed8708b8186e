use std::path::PathBuf;
use thiserror::Error;

use crate::model::Service;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid client name '{0}': must not contain path separators")]
    InvalidClientName(String),

    #[error("Invalid area '{0}': expected IMPORTAÇÃO or EXPORTAÇÃO")]
    InvalidArea(String),

    #[error("Invalid service '{0}': expected Aéreo, Rodoviário or Marítimo")]
    InvalidService(String),

    #[error("Invalid process number '{0}': must be exactly 6 digits")]
    InvalidNumberFormat(String),

    #[error("Invalid year '{0}': must be exactly 2 digits")]
    InvalidYearFormat(String),

    #[error("Invalid reference '{reference}': characters {offending:?} are not allowed (letters, digits, space, '.', '-', '+')")]
    InvalidReferenceCharacters {
        reference: String,
        offending: Vec<char>,
    },

    #[error("Process {number} already exists with year '{existing}', got '{requested}'")]
    YearConflict {
        number: String,
        existing: String,
        requested: String,
    },

    #[error("Process {number} already exists with service '{existing}', got '{requested}'")]
    ServiceConflict {
        number: String,
        existing: Service,
        requested: Service,
    },

    #[error("Process {number} already exists with reference '{existing}', got '{requested}'")]
    ReferenceConflict {
        number: String,
        existing: String,
        requested: String,
    },

    #[error("Could not create folder {}: {source}", path.display())]
    FolderCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("Could not open {} in the file explorer: {source}", path.display())]
    ExplorerLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Client '{0}' is already registered")]
    ClientAlreadyExists(String),

    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Failure of a single file inside a placement batch. Never aborts the batch.
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Blocked file extension '{0}'")]
    BlockedExtension(String),

    #[error("File name '{0}' is empty after removing invalid characters")]
    InvalidFileName(String),

    #[error("Timestamped name '{0}' is also taken")]
    RenameCollision(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
