//! Runtime settings: CLI flags, then environment, then defaults.

use chrono::{Datelike, Local};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const APP_NAME: &str = "neovate-wrapped";

/// Overrides the session log root.
pub const DATA_DIR_ENV: &str = "NEOVATE_DATA_DIR";

static HOME_DIR: OnceLock<String> = OnceLock::new();

#[inline]
fn get_home() -> &'static str {
    HOME_DIR.get_or_init(|| env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_root: PathBuf,
    pub cache_dir: PathBuf,
    pub year: i32,
    /// Skip the models.dev lookup entirely
    pub offline: bool,
    pub json: bool,
}

impl Settings {
    pub fn resolve(data_dir: Option<PathBuf>, year: Option<i32>, offline: bool, json: bool) -> Self {
        Self {
            data_root: resolve_data_root(data_dir, env::var_os(DATA_DIR_ENV), get_home()),
            cache_dir: resolve_cache_dir(env::var_os("XDG_CACHE_HOME"), get_home()),
            year: year.unwrap_or_else(|| Local::now().year()),
            offline,
            json,
        }
    }
}

pub fn resolve_data_root(flag: Option<PathBuf>, env_value: Option<OsString>, home: &str) -> PathBuf {
    flag.or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(home).join(".neovate").join("projects"))
}

pub fn resolve_cache_dir(xdg_cache: Option<OsString>, home: &str) -> PathBuf {
    xdg_cache
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(home).join(".cache"))
        .join(APP_NAME)
}
