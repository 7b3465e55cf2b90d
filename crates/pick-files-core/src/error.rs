use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid selection policy: {0}")]
    InvalidPolicy(String),

    #[error("Source folder {} does not exist or is not a directory", .0.display())]
    MissingFolder(PathBuf),

    #[error("History store {} is corrupt: {source}", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("History store schema {found} is newer than supported schema {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("History store {} already exists; reset requires force", .0.display())]
    StoreExists(PathBuf),

    #[error("Destination folder {} already exists and is not empty", .0.display())]
    DestinationNotEmpty(PathBuf),

    #[error("Destination file {} already exists", .0.display())]
    NameCollision(PathBuf),

    #[error("{} is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    #[error("Error copying {} to {}: {source}", src.display(), dst.display())]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output file {} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error("Export error: {0}")]
    Export(String),
}

impl Error {
    /// True for errors raised while validating inputs, before anything on
    /// disk was touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::InvalidPolicy(_) | Error::MissingFolder(_)
        )
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Export(err.to_string())
    }
}
