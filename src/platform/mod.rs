// ReadFocus platform paths
// Where configuration, stored state and exported articles live on each OS.
//
// The implementation is picked at compile time with `cfg(target_os)`.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as os;

#[cfg(target_os = "macos")]
use macos as os;

#[cfg(target_os = "windows")]
use windows as os;

/// Directory holding `config.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/readfocus` or `~/.config/readfocus`
/// - **macOS**: `~/Library/Application Support/ReadFocus`
/// - **Windows**: `%APPDATA%/ReadFocus`
pub fn get_config_dir() -> PathBuf {
    os::get_config_dir()
}

/// Directory holding the file-backed storage area.
///
/// - **Linux**: `$XDG_DATA_HOME/readfocus` or `~/.local/share/readfocus`
/// - **macOS**: `~/Library/Application Support/ReadFocus`
/// - **Windows**: `%LOCALAPPDATA%/ReadFocus`
pub fn get_data_dir() -> PathBuf {
    os::get_data_dir()
}

/// Default destination for exported articles: the user's downloads folder.
pub fn get_download_dir() -> PathBuf {
    os::get_download_dir()
}
