//! XDG Base Directory paths for pluma.
//!
//! The host and its plugins live under XDG paths on every platform, so a
//! plugin tree copied between machines keeps the same layout.

use std::path::PathBuf;

const APP_DIR: &str = "pluma";

/// Get the pluma config directory.
///
/// Returns `$XDG_CONFIG_HOME/pluma` if set, otherwise `~/.config/pluma`.
/// User configuration and the default plugin search root live here.
///
/// # Examples
///
/// ```
/// use pluma_paths::config_dir;
///
/// let plugins = config_dir().join("plugins");
/// assert!(plugins.ends_with("pluma/plugins"));
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Get the pluma data directory.
///
/// Returns `$XDG_DATA_HOME/pluma` if set, otherwise `~/.local/share/pluma`.
/// The persisted registry state is kept here.
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

/// Default search root for plugins of the built-in `plugin` type.
pub fn plugin_dir() -> PathBuf {
    config_dir().join("plugins")
}

/// Default location of the persisted registry state.
pub fn state_file() -> PathBuf {
    data_dir().join("state.toml")
}

fn xdg_dir(env_key: &str, home_relative: &str) -> PathBuf {
    if let Ok(base) = std::env::var(env_key) {
        PathBuf::from(base).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(home_relative).join(APP_DIR)
    } else {
        PathBuf::from(home_relative).join(APP_DIR)
    }
}
