use std::{io, path::PathBuf};

use thiserror::Error;

/**
    Errors that may occur when scanning a script for imports
*/
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read script '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse script '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

pub type ScanResult<T, E = ScanError> = std::result::Result<T, E>;
