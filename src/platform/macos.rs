// ReadFocus paths on macOS
// Config and data share ~/Library/Application Support/ReadFocus.

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn support_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("ReadFocus")
}

pub fn get_config_dir() -> PathBuf {
    support_dir()
}

pub fn get_data_dir() -> PathBuf {
    support_dir()
}

pub fn get_download_dir() -> PathBuf {
    home_dir().join("Downloads")
}
