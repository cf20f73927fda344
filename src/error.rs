use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoadError>;

/// Failures while reading the catalog or member files.
///
/// Bad values inside otherwise valid files are not errors; the loader drops
/// them with a warning.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Cannot determine format for: {}", .0.display())]
    UnknownFormat(PathBuf),

    #[error("Invalid path or glob pattern: {0}")]
    Pattern(String),

    #[error("No files found matching: {0}")]
    NoMatches(String),
}
