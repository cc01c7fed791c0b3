use std::{
    fmt,
    path::{Path, PathBuf},
};

use tracing::{debug, info, instrument, warn};

use crate::scan::ImportName;

mod finder;
mod result;
mod search;

pub use self::result::{InterpreterError, ResolveError, ResolveResult};
pub use self::search::SearchPaths;

use self::finder::{find_in, ModuleSpec};

/**
    The kind of thing an import name resolved to.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Compiled into the interpreter.
    Builtin,
    /// Already loaded by the interpreter under another name,
    /// such as `os.path`.
    Alias,
    /// A single module file.
    Module,
    /// A package, backed by its `__init__` file.
    Package,
    /// A package made of directories only.
    Namespace,
    /// A name inside an existing package that is not a module
    /// of its own, such as `collections.OrderedDict`.
    Attribute,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "built-in module"),
            Self::Alias => write!(f, "module alias"),
            Self::Module => write!(f, "module"),
            Self::Package => write!(f, "package"),
            Self::Namespace => write!(f, "namespace package"),
            Self::Attribute => write!(f, "package attribute"),
        }
    }
}

/**
    An import name paired with the file that backs it, if there is one.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    name: ImportName,
    kind: ModuleKind,
    path: Option<PathBuf>,
}

impl ResolvedModule {
    #[must_use]
    pub fn name(&self) -> &ImportName {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /**
        The absolute path of the file backing this module.

        `None` for built-in modules, namespace packages and package
        attributes, none of which contribute bytes to an artifact.
    */
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/**
    The result of resolving every name in a script's import set.

    Modules are kept in the order their names were given,
    which becomes the order they are embedded in an artifact.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    modules: Vec<ResolvedModule>,
    misses: Vec<ResolveError>,
}

impl Resolution {
    /**
        All names that were found, with or without a backing file.
    */
    #[must_use]
    pub fn modules(&self) -> &[ResolvedModule] {
        &self.modules
    }

    /**
        All names that could not be found and were left out.
    */
    #[must_use]
    pub fn misses(&self) -> &[ResolveError] {
        &self.misses
    }

    /**
        Iterates over modules backed by a file that exists on disk, in mapping order.
    */
    pub fn files(&self) -> impl Iterator<Item = (&ImportName, &Path)> {
        self.modules.iter().filter_map(|module| match module.path() {
            Some(path) if path.is_file() => Some((module.name(), path)),
            _ => None,
        })
    }

    /**
        Iterates over modules that were found but have no file to embed.
    */
    pub fn without_files(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules
            .iter()
            .filter(|module| !module.path().is_some_and(Path::is_file))
    }

    #[must_use]
    pub fn get(&self, name: &ImportName) -> Option<&ResolvedModule> {
        self.modules.iter().find(|module| &module.name == name)
    }
}

/**
    Resolves import names to files, one level deep.

    Absolute names are searched for in the directory of the script being
    packaged, then in each of the configured [`SearchPaths`] roots.
    Relative names are searched for relative to the script's directory.

    Resolved modules are never scanned for imports of their own.
*/
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    search: SearchPaths,
    script_dir: PathBuf,
}

impl ModuleResolver {
    /**
        Creates a new resolver for a script living in `script_dir`.

        The script directory is searched before any other root, the
        same way the interpreter puts it first when running the script.
    */
    #[must_use]
    pub fn new(search: SearchPaths, script_dir: impl Into<PathBuf>) -> Self {
        let script_dir = script_dir.into();
        let search = if search.contains_root(&script_dir) {
            search
        } else {
            search.with_leading_roots([script_dir.clone()])
        };
        Self { search, script_dir }
    }

    #[must_use]
    pub fn search_paths(&self) -> &SearchPaths {
        &self.search
    }

    /**
        Resolves a single import name.

        A name that exists but has no file of its own, such as a built-in module,
        a frozen alias, a namespace package or an attribute of a package,
        resolves successfully with no path.

        # Errors

        - If the first segment of the name can not be found.
        - If a parent segment of the name can not be found.
        - If a parent segment is a module and not a package.
        - If a relative name climbs above the filesystem root.
    */
    pub fn resolve(&self, name: &ImportName) -> ResolveResult<ResolvedModule> {
        let (kind, origin) = match self.find(name)? {
            Some(spec) => {
                let kind = match &spec {
                    ModuleSpec::Builtin => ModuleKind::Builtin,
                    ModuleSpec::Alias(_) => ModuleKind::Alias,
                    ModuleSpec::Module(_) => ModuleKind::Module,
                    ModuleSpec::Package { .. } => ModuleKind::Package,
                    ModuleSpec::Namespace { .. } => ModuleKind::Namespace,
                };
                (kind, spec.origin().map(Path::to_path_buf))
            }
            None => (ModuleKind::Attribute, None),
        };

        let path = origin.map(|path| dunce::canonicalize(&path).unwrap_or(path));

        Ok(ResolvedModule {
            name: name.clone(),
            kind,
            path,
        })
    }

    /**
        Resolves every given name, in order.

        Names that fail to resolve are logged and collected as misses,
        they never stop the remaining names from being resolved.
    */
    #[instrument(level = "debug", name = "ModuleResolver::resolve_all", skip_all)]
    pub fn resolve_all<'a>(&self, names: impl IntoIterator<Item = &'a ImportName>) -> Resolution {
        let mut resolution = Resolution::default();
        for name in names {
            match self.resolve(name) {
                Ok(module) => {
                    match module.path() {
                        Some(path) => debug!(%name, path = %path.display(), "resolved"),
                        None => info!(%name, kind = %module.kind(), "unresolved, nothing to embed"),
                    }
                    resolution.modules.push(module);
                }
                Err(err) => {
                    warn!(%name, "{err}");
                    resolution.misses.push(err);
                }
            }
        }
        resolution
    }

    /*
        Walks the name one segment at a time, the same way the interpreter
        imports every parent package before searching for a submodule.
        Dotted names the interpreter has already loaded are returned as is.

        Returns `Ok(None)` when everything up to the final segment exists
        but the final segment is not a module inside its parent package.
    */
    fn find(&self, name: &ImportName) -> ResolveResult<Option<ModuleSpec>> {
        let suffixes = self.search.module_suffixes();
        let segments = name.segments();
        let Some((first, rest)) = segments.split_first() else {
            return Err(ResolveError::NotFound { name: name.clone() });
        };

        if !name.is_relative() && !rest.is_empty() {
            if let Some(origin) = self.search.alias(&name.to_string()) {
                return Ok(Some(ModuleSpec::Alias(origin.map(Path::to_path_buf))));
            }
        }

        let top_level = if name.is_relative() {
            let base = self.relative_base(name)?;
            find_in(&[base], first, &suffixes)
        } else if self.search.is_builtin(first) {
            Some(ModuleSpec::Builtin)
        } else {
            find_in(self.search.roots(), first, &suffixes)
        };

        let mut spec = top_level.ok_or_else(|| ResolveError::NotFound { name: name.clone() })?;

        for (index, segment) in rest.iter().enumerate() {
            let parent_len = index + 1;
            let Some(dirs) = spec.submodule_dirs() else {
                return Err(ResolveError::NotAPackage {
                    name: name.clone(),
                    parent: name.prefix(parent_len).unwrap_or_else(|| name.clone()),
                });
            };
            spec = match find_in(dirs, segment, &suffixes) {
                Some(child) => child,
                None if parent_len == rest.len() => return Ok(None),
                None => return Err(ResolveError::NotFound { name: name.clone() }),
            };
        }

        Ok(Some(spec))
    }

    fn relative_base(&self, name: &ImportName) -> ResolveResult<PathBuf> {
        let mut base = self.script_dir.clone();
        for _ in 1..name.level() {
            if !base.pop() {
                return Err(ResolveError::BeyondTopLevel { name: name.clone() });
            }
        }
        Ok(base)
    }
}
