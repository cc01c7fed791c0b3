use std::{
    ffi::OsStr,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use expacker_utils::path::{append_suffix, parent_dir};
use tempfile::TempDir;

use crate::scan::ImportName;

use super::result::{BuildError, BuildResult};

/// Suffix given to every packaged executable.
pub const EXECUTABLE_SUFFIX: &str = ".exe";

/// Read, write & execute for owner and group, read & execute for others.
pub const EXECUTABLE_MODE: u32 = 0o775;

/**
    Derives the default executable name for a script: the script's
    file stem with the executable suffix, in the current directory.

    `scripts/demo.py` becomes `demo.exe`.
*/
#[must_use]
pub fn default_output_path(script: &Path) -> PathBuf {
    let stem = script.file_stem().unwrap_or_else(|| OsStr::new("script"));
    append_suffix(stem, EXECUTABLE_SUFFIX)
}

/**
    Writes the given bytes to a file at the specified path,
    and makes sure it has permissions to be executed.

    The bytes are first written to a temporary file next to the target,
    which is then renamed over the target. If anything fails the temporary
    file is removed and any existing file at the target is left untouched.
*/
pub fn write_executable_file_to(path: impl AsRef<Path>, bytes: impl AsRef<[u8]>) -> io::Result<()> {
    let path = path.as_ref();
    let dir = parent_dir(path);

    let mut file = tempfile::Builder::new()
        .prefix(".expacker-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    file.write_all(bytes.as_ref())?;
    file.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(EXECUTABLE_MODE))?;
    }

    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;

    Ok(())
}

/**
    A scratch directory holding copies of every module being embedded.

    Each copy keeps its file name and lives in a directory named after the
    import name it was resolved for, so modules that share a file name
    (every package's `__init__.py`, for example) never overwrite each other.

    The directory and everything in it is removed when this is dropped.
*/
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    staged: Vec<PathBuf>,
}

impl StagingArea {
    /**
        Creates a new, empty staging area in the system temporary directory.
    */
    pub fn new() -> BuildResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("expacker-")
            .tempdir()
            .map_err(BuildError::Scratch)?;
        Ok(Self {
            dir,
            staged: Vec::new(),
        })
    }

    /**
        Copies a module file into the staging area.

        Returns the path of the copy.
    */
    pub fn stage(&mut self, name: &ImportName, path: &Path) -> BuildResult<PathBuf> {
        let stage_err = |source| BuildError::StageModule {
            name: name.clone(),
            path: path.to_path_buf(),
            source,
        };

        let file_name = path.file_name().ok_or_else(|| {
            stage_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "module path has no file name",
            ))
        })?;

        let target_dir = self.dir.path().join(name.to_string());
        fs::create_dir_all(&target_dir).map_err(stage_err)?;

        let target = target_dir.join(file_name);
        fs::copy(path, &target).map_err(stage_err)?;

        self.staged.push(target.clone());
        Ok(target)
    }

    /**
        Paths of all staged copies, in the order they were staged.
    */
    #[must_use]
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn default_output_uses_the_script_stem() {
        assert_eq!(default_output_path(Path::new("demo.py")), Path::new("demo.exe"));
        assert_eq!(
            default_output_path(Path::new("scripts/tool.v2.py")),
            Path::new("tool.v2.exe")
        );
        assert_eq!(default_output_path(Path::new("noext")), Path::new("noext.exe"));
    }

    #[test]
    fn executables_are_written_and_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("demo.exe");

        write_executable_file_to(&path, b"first").unwrap();
        write_executable_file_to(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        // Only the executable itself should be left behind
        let entries = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn executables_are_group_writable_and_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("demo.exe");
        write_executable_file_to(&path, b"bytes").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o775);
    }

    #[test]
    fn failed_writes_leave_nothing_behind() {
        let temp = TempDir::new().unwrap();
        // A directory can never be replaced by a file
        let path = temp.path().join("taken.exe");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"").unwrap();

        assert!(write_executable_file_to(&path, b"bytes").is_err());
        assert!(path.join("keep").exists());

        let entries = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn modules_sharing_a_file_name_are_staged_separately() {
        let source = TempDir::new().unwrap();
        let json = source.path().join("json").join("__init__.py");
        let collections = source.path().join("collections").join("__init__.py");
        fs::create_dir_all(json.parent().unwrap()).unwrap();
        fs::create_dir_all(collections.parent().unwrap()).unwrap();
        fs::write(&json, b"json").unwrap();
        fs::write(&collections, b"collections").unwrap();

        let mut staging = StagingArea::new().unwrap();
        let staged_json = staging.stage(&ImportName::absolute("json"), &json).unwrap();
        let staged_collections = staging
            .stage(&ImportName::absolute("collections"), &collections)
            .unwrap();

        assert_ne!(staged_json, staged_collections);
        assert_eq!(fs::read(&staged_json).unwrap(), b"json");
        assert_eq!(fs::read(&staged_collections).unwrap(), b"collections");
        assert_eq!(staging.staged().len(), 2);
    }

    #[test]
    fn staging_area_is_removed_on_drop() {
        let staging = StagingArea::new().unwrap();
        let path = staging.path().to_path_buf();
        assert!(path.is_dir());
        drop(staging);
        assert!(!path.exists());
    }
}
