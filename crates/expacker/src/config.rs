use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use expacker_utils::path::{clean_path_relative_to, parent_dir};

use crate::{
    build::{BaseLauncher, BuildTarget},
    resolve::SearchPaths,
};

pub const CONFIG_FILE_NAME: &str = "expacker.toml";

pub const ENV_CONFIG: &str = "EXPACKER_CONFIG";
pub const ENV_PYTHON: &str = "EXPACKER_PYTHON";

const DEFAULT_PYTHON: &str = "python3";

/**
    Errors that may occur when loading an `expacker.toml` file
*/
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T, E = ConfigError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct LauncherPaths {
    con: Option<PathBuf>,
    win: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PackerConfigFile {
    python: Option<String>,
    query_interpreter: Option<bool>,
    #[serde(default)]
    search_paths: Vec<PathBuf>,
    #[serde(default)]
    launchers: LauncherPaths,
}

/**
    A deserialized `expacker.toml` file.

    Every key is optional, an empty file is the same as no file at all:

    ```toml
    python = "python3.11"
    query-interpreter = true
    search-paths = ["vendor", "/opt/shared/python"]

    [launchers]
    con = "structure/_con.exe"
    win = "structure/_win.exe"
    ```

    Relative paths are relative to the directory containing the file.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackerConfig {
    dir: PathBuf,
    config: PackerConfigFile,
}

impl PackerConfig {
    /**
        Creates a default configuration with paths relative to the given directory.
    */
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            config: PackerConfigFile::default(),
        }
    }

    /**
        Parses configuration from a string, with paths relative to the given directory.

        # Errors

        If the string is not a valid configuration.
    */
    pub fn from_toml_str(contents: &str, dir: impl Into<PathBuf>) -> Result<Self, toml::de::Error> {
        Ok(Self {
            dir: dir.into(),
            config: toml::from_str(contents)?,
        })
    }

    /**
        Reads an `expacker.toml` file from the given path.

        # Errors

        - If the file can not be read.
        - If the file is not a valid configuration.
    */
    pub fn read(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, parent_dir(path)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /**
        Finds and reads the configuration to use, in order of preference:

        1. The explicitly given path, which must exist
        2. The path in the `EXPACKER_CONFIG` environment variable, which must exist
        3. An `expacker.toml` file in the given directory, if there is one

        Falls back to the default configuration if none of these apply.

        # Errors

        If a configuration file was found or given, but could not be read.
    */
    pub fn discover(explicit: Option<&Path>, dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let dir = dir.as_ref();
        if let Some(path) = explicit {
            return Self::read(path);
        }
        if let Some(path) = env::var_os(ENV_CONFIG).filter(|p| !p.is_empty()) {
            return Self::read(PathBuf::from(path));
        }
        let default_path = dir.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            Self::read(default_path)
        } else {
            Ok(Self::new(dir))
        }
    }

    /**
        The python interpreter used to discover module search paths.

        The `EXPACKER_PYTHON` environment variable takes precedence over the file.
    */
    #[must_use]
    pub fn python(&self) -> String {
        env::var(ENV_PYTHON)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| self.config.python.clone())
            .unwrap_or_else(|| DEFAULT_PYTHON.to_string())
    }

    #[must_use]
    pub fn query_interpreter(&self) -> bool {
        self.config.query_interpreter.unwrap_or(true)
    }

    /**
        Extra module search roots, made absolute.
    */
    #[must_use]
    pub fn extra_search_paths(&self) -> Vec<PathBuf> {
        self.config
            .search_paths
            .iter()
            .map(|path| clean_path_relative_to(path, &self.dir))
            .collect()
    }

    /**
        Builds the module search paths to resolve imports with.

        Extra search roots come first, followed by the roots of the host
        interpreter. If the interpreter can not be queried a warning is
        logged and only the extra search roots are used.
    */
    #[must_use]
    pub fn search_paths(&self) -> SearchPaths {
        let extra = self.extra_search_paths();
        if !self.query_interpreter() {
            return SearchPaths::new(extra);
        }
        let python = self.python();
        match SearchPaths::query_interpreter(&python) {
            Ok(search) => search.with_leading_roots(extra),
            Err(err) => {
                warn!(%python, "{err}, falling back to configured search paths");
                SearchPaths::new(extra)
            }
        }
    }

    /**
        The base launcher for the given target.

        Uses the path from the `[launchers]` table if there is one,
        otherwise the target's default path in the `structure` directory.
    */
    #[must_use]
    pub fn launcher(&self, target: BuildTarget) -> BaseLauncher {
        let configured = match target {
            BuildTarget::Console => self.config.launchers.con.as_ref(),
            BuildTarget::Windowed => self.config.launchers.win.as_ref(),
        };
        match configured {
            Some(path) => BaseLauncher::File(clean_path_relative_to(path, &self.dir)),
            None => BaseLauncher::File(target.default_launcher_path()),
        }
    }
}
