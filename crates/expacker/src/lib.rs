#![allow(clippy::cargo_common_metadata)]

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::instrument;

use expacker_utils::path::parent_dir;

pub mod build;
pub mod config;
pub mod resolve;
pub mod scan;

#[cfg(test)]
mod tests;

pub use crate::build::{
    default_output_path, Artifact, Assembler, BaseLauncher, BuildError, BuildTarget,
    EmbeddedPayload,
};
pub use crate::config::{ConfigError, PackerConfig};
pub use crate::resolve::{ModuleKind, ModuleResolver, Resolution, ResolveError, SearchPaths};
pub use crate::scan::{scan_script, scan_source, ImportName, ImportSet, ScanError};

/**
    Errors that may stop a script from being packaged
*/
#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("failed to locate script directory '{}'", path.display())]
    ScriptDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
}

pub type PackResult<T, E = PackError> = std::result::Result<T, E>;

/**
    Everything produced while packaging a script.
*/
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub imports: ImportSet,
    pub resolution: Resolution,
    pub artifact: Artifact,
}

/**
    Packages a script into a standalone executable.

    Runs the import scanner, the module resolver and the
    artifact assembler, one after the other, in a single pass.

    ```rs
    use expacker::{BuildTarget, Packer, SearchPaths};

    let outcome = Packer::new(BuildTarget::Console.default_launcher_path())
        .with_search_paths(SearchPaths::query_interpreter("python3")?)
        .pack("demo.py")?;

    println!("Executable created as {}", outcome.artifact.path().display());
    ```
*/
#[derive(Debug, Clone)]
pub struct Packer {
    launcher: BaseLauncher,
    search: SearchPaths,
    output: Option<PathBuf>,
}

impl Packer {
    /**
        Creates a new packer using the given base launcher,
        with no search roots other than the script's own directory.
    */
    #[must_use]
    pub fn new(launcher: impl Into<BaseLauncher>) -> Self {
        Self {
            launcher: launcher.into(),
            search: SearchPaths::default(),
            output: None,
        }
    }

    #[must_use]
    pub fn with_search_paths(mut self, search: SearchPaths) -> Self {
        self.search = search;
        self
    }

    /**
        Sets the path to write the executable to, instead of
        the script's stem with an `.exe` suffix in the working directory.
    */
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /**
        Returns the path the executable for the given script will be written to.
    */
    #[must_use]
    pub fn output_for(&self, script: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(script))
    }

    /**
        Scans, resolves and assembles the given script.

        Names that can not be resolved are left out of the executable
        and returned as misses in the outcome's resolution.

        # Errors

        - If the script can not be read or parsed.
        - If the executable can not be assembled or written.
    */
    #[instrument(level = "debug", name = "Packer::pack", skip_all, fields(script = %script.as_ref().display()))]
    pub fn pack(&self, script: impl AsRef<Path>) -> PackResult<PackOutcome> {
        let script = script.as_ref();
        let imports = scan_script(script)?;

        let dir = parent_dir(script);
        let script_dir = dunce::canonicalize(&dir)
            .map_err(|source| PackError::ScriptDir { path: dir, source })?;

        let resolver = ModuleResolver::new(self.search.clone(), script_dir);
        let resolution = resolver.resolve_all(&imports);

        let assembler = Assembler::new(self.launcher.clone(), self.output_for(script));
        let artifact = assembler.assemble(script, &resolution)?;

        Ok(PackOutcome {
            imports,
            resolution,
            artifact,
        })
    }
}
