/*!
    Constants for working with Python module paths.
*/

pub const FILE_NAME_INIT: &str = "__init__";
pub const SOURCE_SUFFIX: &str = ".py";
pub const BYTECODE_SUFFIX: &str = ".pyc";

/// Used when the host interpreter cannot tell us its own list.
pub const DEFAULT_EXTENSION_SUFFIXES: [&str; 2] = [".so", ".pyd"];

pub const PACKAGE_SEPARATOR: char = '.';
