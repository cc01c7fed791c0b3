use std::{fmt, path::PathBuf, str::FromStr};

use super::result::BuildError;

/// Directory holding the prebuilt base launchers, relative to the working directory
pub const LAUNCHER_DIR: &str = "structure";

/**
    A base launcher flavor that ExPacker can build against.

    Parsed from the mode flag given on the command line:

    - `-con` - a console launcher, the script gets a terminal window
    - `-win` - a windowed launcher, no terminal window is shown

    The leading dash is optional.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    Console,
    Windowed,
}

impl BuildTarget {
    pub const ALL: [Self; 2] = [Self::Console, Self::Windowed];

    /**
        The short name of this target, used in flags and configuration keys.
    */
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Console => "con",
            Self::Windowed => "win",
        }
    }

    #[must_use]
    pub fn flag(self) -> String {
        format!("-{}", self.name())
    }

    /**
        The path of the prebuilt launcher used when nothing else is configured,
        such as `structure/_con.exe`.
    */
    #[must_use]
    pub fn default_launcher_path(self) -> PathBuf {
        PathBuf::from(LAUNCHER_DIR).join(format!("_{}.exe", self.name()))
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::Windowed => write!(f, "windowed"),
        }
    }
}

impl FromStr for BuildTarget {
    type Err = BuildError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_prefix('-').unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|target| target.name() == name)
            .ok_or_else(|| BuildError::InvalidTarget(s.to_string()))
    }
}
