use std::{io, path::PathBuf};

use thiserror::Error;

use crate::scan::ImportName;

/**
    Errors that may occur when assembling a standalone executable
*/
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid build mode '{0}', expected one of: -con, -win")]
    InvalidTarget(String),
    #[error("output path cannot be the same as the script path")]
    OutputIsInput,
    #[error("failed to read script '{}'", path.display())]
    ReadScript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read base launcher '{}'", path.display())]
    ReadLauncher {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create scratch directory")]
    Scratch(#[source] io::Error),
    #[error("failed to stage module {name} from '{}'", path.display())]
    StageModule {
        name: ImportName,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write executable '{}'", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a packaged executable, the embedded files marker is missing")]
    MissingMarker,
    #[error("embedded script of {script_len} bytes is not followed by its terminating lines")]
    MissingTerminator { script_len: usize },
}

pub type BuildResult<T, E = BuildError> = std::result::Result<T, E>;
