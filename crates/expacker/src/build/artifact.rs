use std::path::{Path, PathBuf};

use super::result::{BuildError, BuildResult};

/// Separates the base launcher from everything embedded after it.
pub const MARKER: &[u8] = b"# Start embedded files\n";

/// Appended to every embedded script so it can never run into the module bytes after it.
pub const SCRIPT_TERMINATOR: &[u8] = b"\nexit()\n#";

/**
    Returns the script as it is embedded: the original text
    followed by a forced exit and an empty comment line.
*/
#[must_use]
pub fn transform_script(source: &[u8]) -> Vec<u8> {
    let mut transformed = Vec::with_capacity(source.len() + SCRIPT_TERMINATOR.len());
    transformed.extend_from_slice(source);
    transformed.extend_from_slice(SCRIPT_TERMINATOR);
    transformed
}

/**
    Appends the marker, the transformed script and all module
    contents, in the given order, to the end of a base launcher.
*/
pub fn patch_launcher<'a>(
    launcher: impl Into<Vec<u8>>,
    transformed_script: &[u8],
    modules: impl IntoIterator<Item = &'a [u8]>,
) -> Vec<u8> {
    let mut patched = launcher.into();
    patched.extend_from_slice(MARKER);
    patched.extend_from_slice(transformed_script);
    for module in modules {
        patched.extend_from_slice(module);
    }
    patched
}

/**
    A view into an assembled executable, split at the embedded files marker.

    The layout has no lengths or index, so the boundary between the embedded
    script and the module bytes after it is a guess: the end of the first
    `\nexit()\n#` sequence. A script that contains that sequence itself is cut
    short, callers that know the length of the original script should use
    [`EmbeddedPayload::with_script_len`] to place the boundary exactly.
    The modules themselves can never be told apart.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedPayload<'a> {
    launcher: &'a [u8],
    embedded: &'a [u8],
    script_end: Option<usize>,
}

impl<'a> EmbeddedPayload<'a> {
    /**
        Splits an assembled executable at the first embedded files marker.

        Launchers that contain the marker text themselves should
        be split using [`EmbeddedPayload::split_at_launcher`].

        # Errors

        If the bytes do not contain the marker.
    */
    pub fn split(bytes: &'a [u8]) -> BuildResult<Self> {
        let start = find(bytes, MARKER).ok_or(BuildError::MissingMarker)?;
        Ok(Self::new(&bytes[..start], &bytes[start + MARKER.len()..]))
    }

    /**
        Splits an assembled executable built from a launcher of a known length.

        # Errors

        If the marker does not directly follow the launcher bytes.
    */
    pub fn split_at_launcher(bytes: &'a [u8], launcher_len: usize) -> BuildResult<Self> {
        let rest = bytes.get(launcher_len..).ok_or(BuildError::MissingMarker)?;
        let embedded = rest.strip_prefix(MARKER).ok_or(BuildError::MissingMarker)?;
        Ok(Self::new(&bytes[..launcher_len], embedded))
    }

    fn new(launcher: &'a [u8], embedded: &'a [u8]) -> Self {
        let script_end =
            find(embedded, SCRIPT_TERMINATOR).map(|start| start + SCRIPT_TERMINATOR.len());
        Self {
            launcher,
            embedded,
            script_end,
        }
    }

    /**
        Places the end of the embedded script right after an original
        script of `script_len` bytes and its terminating lines.

        # Errors

        If the terminating lines do not follow the first `script_len` embedded bytes.
    */
    pub fn with_script_len(self, script_len: usize) -> BuildResult<Self> {
        let end = script_len + SCRIPT_TERMINATOR.len();
        match self.embedded.get(script_len..end) {
            Some(terminator) if terminator == SCRIPT_TERMINATOR => Ok(Self {
                script_end: Some(end),
                ..self
            }),
            _ => Err(BuildError::MissingTerminator { script_len }),
        }
    }

    #[must_use]
    pub fn launcher(&self) -> &'a [u8] {
        self.launcher
    }

    /**
        Everything after the marker: the transformed script and all module bytes.
    */
    #[must_use]
    pub fn embedded(&self) -> &'a [u8] {
        self.embedded
    }

    /**
        The embedded bytes up to and including the script's terminating lines.

        Without a known script length this ends at the first terminator found,
        see the type level docs. Returns `None` if no terminator was found.
    */
    #[must_use]
    pub fn script(&self) -> Option<&'a [u8]> {
        self.script_end.map(|end| &self.embedded[..end])
    }

    /**
        The concatenated module bytes following the embedded script.
    */
    #[must_use]
    pub fn modules(&self) -> &'a [u8] {
        match self.script_end {
            Some(end) => &self.embedded[end..],
            None => &[],
        }
    }
}

/**
    Information about an executable that was written to disk.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub(crate) path: PathBuf,
    pub(crate) size: usize,
    pub(crate) embedded_modules: usize,
}

impl Artifact {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /**
        Total size of the executable, in bytes.
    */
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /**
        Number of module files embedded after the script.
    */
    #[must_use]
    pub fn embedded_modules(&self) -> usize {
        self.embedded_modules
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
