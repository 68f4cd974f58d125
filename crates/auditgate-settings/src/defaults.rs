//! Defaults applied when neither the config file nor the CLI set a value.

pub const LANGUAGE: &str = "Rust";
pub const WORK_DIR: &str = "work";
pub const CARGO: &str = "cargo";
pub const API_URL: &str = "https://api.github.com";
pub const FAIL_ON_UNUSED_EXCEPTIONS: bool = false;
