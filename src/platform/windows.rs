// ReadFocus paths on Windows
// Config: %APPDATA%/ReadFocus (roams)
// Data:   %LOCALAPPDATA%/ReadFocus

use std::env;
use std::path::PathBuf;

fn env_dir(name: &str, fallback: &str) -> PathBuf {
    PathBuf::from(env::var(name).unwrap_or_else(|_| String::from(fallback)))
}

pub fn get_config_dir() -> PathBuf {
    env_dir("APPDATA", "C:\\Users\\Default\\AppData\\Roaming").join("ReadFocus")
}

pub fn get_data_dir() -> PathBuf {
    env_dir("LOCALAPPDATA", "C:\\Users\\Default\\AppData\\Local").join("ReadFocus")
}

pub fn get_download_dir() -> PathBuf {
    env_dir("USERPROFILE", "C:\\Users\\Default").join("Downloads")
}
