use thiserror::Error;

use crate::scan::ImportName;

/**
    Errors that may occur when resolving an import name to a file.

    None of these are fatal to the packaging pipeline, a name that
    fails to resolve is reported and then left out of the artifact.
*/
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Module {name} not found.")]
    NotFound { name: ImportName },
    #[error("Module {name} not found: '{parent}' is not a package.")]
    NotAPackage {
        name: ImportName,
        parent: ImportName,
    },
    #[error("Module {name} not found: relative import climbs above the filesystem root.")]
    BeyondTopLevel { name: ImportName },
}

impl ResolveError {
    /**
        Returns the import name that failed to resolve.
    */
    #[must_use]
    pub fn name(&self) -> &ImportName {
        match self {
            Self::NotFound { name }
            | Self::NotAPackage { name, .. }
            | Self::BeyondTopLevel { name } => name,
        }
    }
}

/**
    Errors that may occur when asking the host interpreter for its search paths
*/
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("failed to run python interpreter '{python}'")]
    Spawn {
        python: String,
        #[source]
        source: std::io::Error,
    },
    #[error("python interpreter '{python}' exited with {status}: {stderr}")]
    Failed {
        python: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("python interpreter '{python}' returned invalid search paths")]
    InvalidOutput {
        python: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ResolveResult<T, E = ResolveError> = std::result::Result<T, E>;
