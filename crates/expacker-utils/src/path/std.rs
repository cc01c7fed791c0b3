/*!
    Utilities for working with Rust standard library paths.
*/

use std::{
    env::current_dir,
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};

use path_clean::PathClean;

/**
    Gets the current working directory as an absolute path.

    This absolute path is canonicalized and does not contain any `.` or `..`
    components, and it is also in a friendly (non-UNC) format.

    # Errors

    If the current working directory is missing or not accessible.
*/
pub fn get_current_dir() -> io::Result<PathBuf> {
    dunce::canonicalize(current_dir()?)
}

/**
    Makes a path absolute, if it is relative, and then cleans it.

    Relative paths are resolved against the given base directory.
*/
#[must_use]
pub fn clean_path_relative_to(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_relative() {
        base.as_ref().join(path).clean()
    } else {
        path.clean()
    }
}

/**
    Returns the directory containing the given file path.

    A bare file name such as `demo.py` has an empty parent,
    in which case the current directory (`.`) is returned.
*/
#[must_use]
pub fn parent_dir(path: impl AsRef<Path>) -> PathBuf {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/**
    Appends the given suffix to the final component of a path.

    Unlike [`Path::with_extension`] this never replaces anything,
    and the suffix is appended verbatim, including any leading dot.
*/
#[must_use]
pub fn append_suffix(path: impl AsRef<Path>, suffix: impl AsRef<OsStr>) -> PathBuf {
    let mut joined = path.as_ref().as_os_str().to_os_string();
    joined.push(suffix);
    PathBuf::from(joined)
}
