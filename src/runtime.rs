//! Environment-driven configuration shared by the library and binaries.
//!
//! Centralizes the variable names and parsing rules so helpers read
//! configuration the same way instead of re-implementing lookups.

use std::env;
use std::path::PathBuf;

/// Directory of extra section documents loaded after the built-ins.
pub const CATALOG_DIR_ENV: &str = "FLATWIRE_CATALOG_DIR";
/// Log filter (EnvFilter syntax) used by the binaries.
pub const LOG_ENV: &str = "FLATWIRE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// `FLATWIRE_CATALOG_DIR`, when set to a non-blank value.
pub fn catalog_dir_from_env() -> Option<PathBuf> {
    env::var_os(CATALOG_DIR_ENV)
        .filter(|value| !value.to_string_lossy().trim().is_empty())
        .map(PathBuf::from)
}

/// Log filter directive, falling back to `warn`.
pub fn log_filter_from_env() -> String {
    env::var(LOG_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
