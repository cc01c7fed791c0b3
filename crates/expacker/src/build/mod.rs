use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, instrument};

use crate::resolve::Resolution;

mod artifact;
mod files;
mod launcher;
mod result;
mod target;

pub use self::artifact::{
    patch_launcher, transform_script, Artifact, EmbeddedPayload, MARKER, SCRIPT_TERMINATOR,
};
pub use self::files::{
    default_output_path, write_executable_file_to, StagingArea, EXECUTABLE_MODE,
    EXECUTABLE_SUFFIX,
};
pub use self::launcher::BaseLauncher;
pub use self::result::{BuildError, BuildResult};
pub use self::target::{BuildTarget, LAUNCHER_DIR};

/**
    Assembles a script and its resolved modules into a standalone executable.

    The executable is the base launcher followed by the embedded files marker,
    the transformed script, and finally the contents of every resolved module
    file in mapping order. See [`EmbeddedPayload`] for reading it back.
*/
#[derive(Debug, Clone)]
pub struct Assembler {
    launcher: BaseLauncher,
    output: PathBuf,
}

impl Assembler {
    /**
        Creates a new assembler writing to the given output path.
    */
    #[must_use]
    pub fn new(launcher: impl Into<BaseLauncher>, output: impl Into<PathBuf>) -> Self {
        Self {
            launcher: launcher.into(),
            output: output.into(),
        }
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /**
        Assembles the executable and writes it to the output path,
        replacing any file that already exists there.

        Modules with no backing file contribute nothing. Nothing is
        written to the output path unless assembly fully succeeds.

        # Errors

        - If the output path is the script path.
        - If the script, the base launcher or a module can not be read.
        - If the executable can not be written.
    */
    #[instrument(level = "debug", name = "Assembler::assemble", skip_all, fields(output = %self.output.display()))]
    pub fn assemble(&self, script: impl AsRef<Path>, resolution: &Resolution) -> BuildResult<Artifact> {
        let script = script.as_ref();
        if is_same_file(script, &self.output) {
            return Err(BuildError::OutputIsInput);
        }

        let source = fs::read(script).map_err(|source| BuildError::ReadScript {
            path: script.to_path_buf(),
            source,
        })?;
        let transformed = transform_script(&source);

        let mut staging = StagingArea::new()?;
        for (name, path) in resolution.files() {
            let staged = staging.stage(name, path)?;
            debug!(%name, staged = %staged.display(), "staged module");
        }

        let mut modules = Vec::with_capacity(staging.staged().len());
        for (staged, (name, path)) in staging.staged().iter().zip(resolution.files()) {
            let bytes = fs::read(staged).map_err(|source| BuildError::StageModule {
                name: name.clone(),
                path: path.to_path_buf(),
                source,
            })?;
            modules.push(bytes);
        }

        let launcher = self.launcher.read()?;
        let patched = patch_launcher(launcher, &transformed, modules.iter().map(Vec::as_slice));

        write_executable_file_to(&self.output, &patched).map_err(|source| {
            BuildError::WriteOutput {
                path: self.output.clone(),
                source,
            }
        })?;

        info!(size = patched.len(), modules = modules.len(), "wrote executable");

        Ok(Artifact {
            path: self.output.clone(),
            size: patched.len(),
            embedded_modules: modules.len(),
        })
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
