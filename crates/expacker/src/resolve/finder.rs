use std::path::{Path, PathBuf};

use expacker_utils::path::{append_suffix, constants::FILE_NAME_INIT};

/**
    What a single module name was found to be on the filesystem.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ModuleSpec {
    /// Compiled into the interpreter, no file.
    Builtin,
    /// A dotted name the interpreter already loaded under another name.
    Alias(Option<PathBuf>),
    /// A plain module file: source, bytecode or native extension.
    Module(PathBuf),
    /// A directory with an `__init__` file.
    Package { init: PathBuf, dirs: Vec<PathBuf> },
    /// One or more directories without an `__init__` file.
    Namespace { dirs: Vec<PathBuf> },
}

impl ModuleSpec {
    /**
        The file backing this module, if any.
    */
    pub fn origin(&self) -> Option<&Path> {
        match self {
            Self::Module(path) | Self::Package { init: path, .. } => Some(path),
            Self::Alias(origin) => origin.as_deref(),
            Self::Builtin | Self::Namespace { .. } => None,
        }
    }

    /**
        Directories that submodules of this module are searched in.

        Returns `None` for anything that is not a package.
    */
    pub fn submodule_dirs(&self) -> Option<&[PathBuf]> {
        match self {
            Self::Package { dirs, .. } | Self::Namespace { dirs } => Some(dirs),
            Self::Builtin | Self::Alias(_) | Self::Module(_) => None,
        }
    }
}

/**
    Searches the given directories, in order, for a module named `segment`.

    For every directory `dir` these are tried, where `SUFFIX`
    takes on each of the given suffixes in order:

    - `dir/segment/__init__SUFFIX` - a regular package
    - `dir/segment SUFFIX` - a module file

    The first regular package or module file found anywhere wins.

    A `dir/segment` directory with no `__init__` file is a namespace portion.
    Portions from all directories are collected and only returned, as a
    namespace package, when no regular package or module file exists.
*/
pub(crate) fn find_in(dirs: &[PathBuf], segment: &str, suffixes: &[&str]) -> Option<ModuleSpec> {
    let mut portions = Vec::new();

    for dir in dirs {
        let candidate = dir.join(segment);

        if candidate.is_dir() {
            if let Some(init) = find_file(&candidate.join(FILE_NAME_INIT), suffixes) {
                return Some(ModuleSpec::Package {
                    init,
                    dirs: vec![candidate],
                });
            }
            portions.push(candidate.clone());
        }

        if let Some(file) = find_file(&candidate, suffixes) {
            return Some(ModuleSpec::Module(file));
        }
    }

    if portions.is_empty() {
        None
    } else {
        Some(ModuleSpec::Namespace { dirs: portions })
    }
}

fn find_file(stem: &Path, suffixes: &[&str]) -> Option<PathBuf> {
    suffixes
        .iter()
        .map(|suffix| append_suffix(stem, suffix))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const SUFFIXES: [&str; 3] = [".so", ".py", ".pyc"];

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn module_files_are_found() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("helpers.py"));

        let spec = find_in(&[temp.path().to_path_buf()], "helpers", &SUFFIXES).unwrap();
        assert_eq!(spec, ModuleSpec::Module(temp.path().join("helpers.py")));
        assert_eq!(spec.submodule_dirs(), None);
    }

    #[test]
    fn packages_win_over_modules_in_the_same_directory() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("pkg.py"));
        touch(&temp.path().join("pkg").join("__init__.py"));

        let spec = find_in(&[temp.path().to_path_buf()], "pkg", &SUFFIXES).unwrap();
        assert_eq!(spec.origin(), Some(temp.path().join("pkg/__init__.py").as_path()));
        assert_eq!(spec.submodule_dirs(), Some([temp.path().join("pkg")].as_slice()));
    }

    #[test]
    fn extensions_win_over_source_files() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("fast.py"));
        touch(&temp.path().join("fast.so"));

        let spec = find_in(&[temp.path().to_path_buf()], "fast", &SUFFIXES).unwrap();
        assert_eq!(spec, ModuleSpec::Module(temp.path().join("fast.so")));
    }

    #[test]
    fn earlier_directories_win() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(&first.path().join("dup.py"));
        touch(&second.path().join("dup.py"));

        let dirs = [first.path().to_path_buf(), second.path().to_path_buf()];
        let spec = find_in(&dirs, "dup", &SUFFIXES).unwrap();
        assert_eq!(spec, ModuleSpec::Module(first.path().join("dup.py")));
    }

    #[test]
    fn namespace_portions_are_merged_but_lose_to_real_modules() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::create_dir_all(first.path().join("ns")).unwrap();
        fs::create_dir_all(second.path().join("ns")).unwrap();

        let dirs = [first.path().to_path_buf(), second.path().to_path_buf()];
        let spec = find_in(&dirs, "ns", &SUFFIXES).unwrap();
        assert_eq!(spec.origin(), None);
        assert_eq!(spec, ModuleSpec::Namespace {
            dirs: vec![first.path().join("ns"), second.path().join("ns")],
        });

        touch(&second.path().join("ns.py"));
        let spec = find_in(&dirs, "ns", &SUFFIXES).unwrap();
        assert_eq!(spec, ModuleSpec::Module(second.path().join("ns.py")));
    }

    #[test]
    fn missing_modules_are_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_in(&[temp.path().to_path_buf()], "nope", &SUFFIXES), None);
    }
}
