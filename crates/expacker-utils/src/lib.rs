#![allow(clippy::cargo_common_metadata)]

pub mod fmt;
pub mod path;
