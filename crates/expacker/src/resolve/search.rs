use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    process::Command,
};

use expacker_utils::path::constants::{BYTECODE_SUFFIX, DEFAULT_EXTENSION_SUFFIXES, SOURCE_SUFFIX};
use serde::Deserialize;

use super::result::InterpreterError;

/*
    Prints everything the resolver needs to know about the host
    interpreter as a single line of json. The first entry of `sys.path`
    is the working directory of the probe and is filtered out later,
    scripts get their own directory prepended by the resolver instead.

    Dotted names loaded during startup, such as `os.path`, are aliases
    that never exist as files under their own name, so they are listed
    together with the origin of the module they point to.
*/
const INTERPRETER_PROBE: &str = "\
import importlib.machinery, json, sys
print(json.dumps({
    'path': sys.path[1:],
    'builtins': sorted(sys.builtin_module_names),
    'extension_suffixes': importlib.machinery.EXTENSION_SUFFIXES,
    'aliases': {
        name: getattr(getattr(module, '__spec__', None), 'origin', None)
        for name, module in list(sys.modules.items())
        if '.' in name
    },
}))";

#[derive(Debug, Deserialize)]
struct InterpreterProbe {
    path: Vec<PathBuf>,
    builtins: Vec<String>,
    extension_suffixes: Vec<String>,
    #[serde(default)]
    aliases: BTreeMap<String, Option<String>>,
}

/**
    Where and how modules are searched for on the packaging host.

    Holds the ordered list of search roots (the equivalent of `sys.path`),
    the names of modules compiled into the interpreter, the dotted names
    the interpreter has already loaded under another name, and the file
    suffixes that identify native extension modules.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPaths {
    roots: Vec<PathBuf>,
    builtins: BTreeSet<String>,
    aliases: BTreeMap<String, Option<PathBuf>>,
    extension_suffixes: Vec<String>,
}

impl Default for SearchPaths {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

impl SearchPaths {
    /**
        Creates search paths from the given roots, with no
        built-in modules and the default extension suffixes.
    */
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            builtins: BTreeSet::new(),
            aliases: BTreeMap::new(),
            extension_suffixes: DEFAULT_EXTENSION_SUFFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /**
        Asks the given python interpreter for its module search roots,
        built-in module names, already loaded aliases and native
        extension suffixes.

        # Errors

        - If the interpreter can not be started.
        - If the interpreter exits unsuccessfully.
        - If the interpreter output can not be understood.
    */
    pub fn query_interpreter(python: &str) -> Result<Self, InterpreterError> {
        let output = Command::new(python)
            .args(["-c", INTERPRETER_PROBE])
            .output()
            .map_err(|source| InterpreterError::Spawn {
                python: python.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(InterpreterError::Failed {
                python: python.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Self::from_probe_output(python, &output.stdout)
    }

    /*
        Builds search paths from the json printed by the interpreter probe.

        Roots that do not exist as directories on disk (zipped standard
        libraries, for example) are left out, and alias origins that are
        not files (`frozen`, `built-in`) become aliases without a file.
    */
    fn from_probe_output(python: &str, stdout: &[u8]) -> Result<Self, InterpreterError> {
        let probe: InterpreterProbe =
            serde_json::from_slice(stdout).map_err(|source| InterpreterError::InvalidOutput {
                python: python.to_string(),
                source,
            })?;

        let roots = probe
            .path
            .into_iter()
            .filter(|root| !root.as_os_str().is_empty() && root.is_dir());

        let aliases = probe.aliases.into_iter().map(|(name, origin)| {
            let origin = origin.map(PathBuf::from).filter(|path| path.is_file());
            (name, origin)
        });

        Ok(Self::new(roots)
            .with_builtins(probe.builtins)
            .with_aliases(aliases)
            .with_extension_suffixes(probe.extension_suffixes))
    }

    #[must_use]
    pub fn with_builtins(mut self, builtins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.builtins = builtins.into_iter().map(Into::into).collect();
        self
    }

    /**
        Sets the dotted names that resolve to an already loaded module,
        along with the file backing that module, if it has one.
    */
    #[must_use]
    pub fn with_aliases<N: Into<String>>(
        mut self,
        aliases: impl IntoIterator<Item = (N, Option<PathBuf>)>,
    ) -> Self {
        self.aliases = aliases
            .into_iter()
            .map(|(name, origin)| (name.into(), origin))
            .collect();
        self
    }

    #[must_use]
    pub fn with_extension_suffixes(
        mut self,
        suffixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.extension_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /**
        Inserts roots before all existing ones, keeping their given order.
    */
    #[must_use]
    pub fn with_leading_roots(mut self, roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut leading = roots.into_iter().map(Into::into).collect::<Vec<_>>();
        leading.append(&mut self.roots);
        self.roots = leading;
        self
    }

    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }

    /**
        Looks up a dotted name among the aliases.

        Returns `None` if the name is not an alias, and `Some(None)`
        if it is an alias for a module with no file, such as a frozen one.
    */
    #[must_use]
    pub fn alias(&self, dotted: &str) -> Option<Option<&Path>> {
        self.aliases.get(dotted).map(Option::as_deref)
    }

    /**
        Returns all file suffixes that identify a module, in the order
        they should be tried: native extensions, then source, then bytecode.
    */
    #[must_use]
    pub fn module_suffixes(&self) -> Vec<&str> {
        self.extension_suffixes
            .iter()
            .map(String::as_str)
            .chain([SOURCE_SUFFIX, BYTECODE_SUFFIX])
            .collect()
    }

    #[must_use]
    pub fn contains_root(&self, root: &Path) -> bool {
        self.roots.iter().any(|r| r == root)
    }
}
