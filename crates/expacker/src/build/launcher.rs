use std::{borrow::Cow, fmt, fs, path::PathBuf};

use super::result::{BuildError, BuildResult};

/**
    Where the bytes of a base launcher come from.

    Launchers are opaque prebuilt executables, ExPacker only ever
    reads their bytes and places them at the start of an artifact.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseLauncher {
    /// A launcher binary on disk, read when an artifact is assembled.
    File(PathBuf),
    /// A launcher already held in memory.
    Bytes(Vec<u8>),
}

impl BaseLauncher {
    /**
        Reads the full contents of this launcher.

        # Errors

        If the launcher is a file that can not be read.
    */
    pub fn read(&self) -> BuildResult<Cow<'_, [u8]>> {
        match self {
            Self::File(path) => fs::read(path)
                .map(Cow::Owned)
                .map_err(|source| BuildError::ReadLauncher {
                    path: path.clone(),
                    source,
                }),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl fmt::Display for BaseLauncher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<PathBuf> for BaseLauncher {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<Vec<u8>> for BaseLauncher {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}
