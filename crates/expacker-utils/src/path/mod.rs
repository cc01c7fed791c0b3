mod std;

pub mod constants;

pub use self::std::{append_suffix, clean_path_relative_to, get_current_dir, parent_dir};
