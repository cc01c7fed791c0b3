use std::{collections::BTreeSet, fmt, str::FromStr};

use expacker_utils::path::constants::PACKAGE_SEPARATOR;

/**
    The set of distinct names imported by a single script.

    Kept sorted so that resolution, and therefore the
    layout of an assembled artifact, is deterministic.
*/
pub type ImportSet = BTreeSet<ImportName>;

/**
    A dotted module name taken verbatim from an import statement,
    such as `os`, `collections.OrderedDict` or `.helpers.parse`.

    Relative imports keep the number of leading dots as their `level`,
    absolute imports have a level of zero.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportName {
    level: u32,
    segments: Vec<String>,
}

impl ImportName {
    /**
        Creates a new absolute import name from a dotted module path.
    */
    #[must_use]
    pub fn absolute(dotted: &str) -> Self {
        Self::relative(0, dotted)
    }

    /**
        Creates a new import name with the given number of leading dots.
    */
    #[must_use]
    pub fn relative(level: u32, dotted: &str) -> Self {
        let segments = dotted
            .split(PACKAGE_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { level, segments }
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /**
        Returns the submodule-qualified name `self.child`.
    */
    #[must_use]
    pub fn child(&self, child: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(child.to_string());
        Self {
            level: self.level,
            segments,
        }
    }

    /**
        Returns the first `len` segments of this name, keeping its level.

        Returns `None` if `len` is zero or longer than the name itself.
    */
    #[must_use]
    pub fn prefix(&self, len: usize) -> Option<Self> {
        if len == 0 || len > self.segments.len() {
            return None;
        }
        Some(Self {
            level: self.level,
            segments: self.segments[..len].to_vec(),
        })
    }
}

impl fmt::Display for ImportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.level {
            write!(f, "{PACKAGE_SEPARATOR}")?;
        }
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for ImportName {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let dotted = s.trim_start_matches(PACKAGE_SEPARATOR);
        let level = u32::try_from(s.len() - dotted.len()).map_err(|_| "too many leading dots")?;
        let name = Self::relative(level, dotted);
        if name.is_empty() {
            Err("import name must contain at least one module segment")
        } else {
            Ok(name)
        }
    }
}
