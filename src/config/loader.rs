use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "chainview";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Load the config from `path`, or from the default location when `None`.
///
/// A missing file yields the defaults. A file that exists but fails to parse
/// is an error.
pub fn load(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let path = match path.map(Path::to_path_buf).or_else(config_path) {
        Some(p) => p,
        None => {
            debug!("No config directory found, using defaults");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        debug!("Config file not found at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("chainview-does-not-exist.toml");
        let config = load(Some(&path)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let path = std::env::temp_dir().join(format!("chainview-{}.toml", std::process::id()));
        fs::write(&path, "[retry]\nmax_attempts = 6\ndelay_ms = 250\n").unwrap();

        let config = load(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.retry.max_attempts, 6);
        assert_eq!(config.retry.delay_ms, 250);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("chainview-bad-{}.toml", std::process::id()));
        fs::write(&path, "[retry]\nmax_attempts = \"many\"\n").unwrap();

        let result = load(Some(&path));
        fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
