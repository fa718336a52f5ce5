// ReadFocus paths on Linux, following the XDG base directory layout.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "readfocus";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$name` if set and absolute, otherwise `~/<fallback>`.
fn xdg_dir(name: &str, fallback: &[&str]) -> PathBuf {
    match env::var(name) {
        Ok(dir) if PathBuf::from(&dir).is_absolute() => PathBuf::from(dir),
        _ => fallback.iter().fold(home_dir(), |path, part| path.join(part)),
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR)
}

pub fn get_data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"]).join(APP_DIR)
}

pub fn get_download_dir() -> PathBuf {
    xdg_dir("XDG_DOWNLOAD_DIR", &["Downloads"])
}
