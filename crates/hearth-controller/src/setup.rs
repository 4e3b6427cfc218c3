//! Config loading and on-disk locations.

use std::path::PathBuf;

use hearth_types::AlarmCode;
use tracing::info;

use crate::config::Config;
use crate::error::ControllerError;
use crate::store::FileCodeStore;

/// Load configuration from the given path, or the default location, and
/// validate it.
pub fn load_config(path: Option<&str>) -> Result<Config, ControllerError> {
    let config_path = match path {
        Some(p) => PathBuf::from(p),
        None => default_config_path(),
    };

    let config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ControllerError::Config(format!("failed to read config: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ControllerError::Config(format!("failed to parse config: {e}")))?;
        info!(path = %config_path.display(), "loaded config");
        config
    } else if path.is_some() {
        return Err(ControllerError::Config(format!(
            "config file not found: {}",
            config_path.display()
        )));
    } else {
        info!("no config file found, using defaults");
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// Get the default config directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("hearth")
}

/// Get the default config file path.
fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where the alarm code is kept: `alarm.code_file`, or `alarm-code` in
/// the config directory.
pub fn code_file_path(config: &Config) -> PathBuf {
    config
        .alarm
        .code_file
        .clone()
        .unwrap_or_else(|| config_dir().join("alarm-code"))
}

/// File-backed code store seeded with `alarm.default_code`.
pub fn code_store(config: &Config) -> Result<FileCodeStore, ControllerError> {
    let seed = AlarmCode::parse(&config.alarm.default_code)?;
    Ok(FileCodeStore::new(code_file_path(config), seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(path.to_str()),
            Err(ControllerError::Config(_))
        ));
    }

    #[test]
    fn loads_and_validates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth.toml");
        std::fs::write(
            &path,
            "[alarm]\nactivation_delay_secs = 3\n[sensors.gas]\nthreshold = 250\n",
        )
        .unwrap();
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.alarm.activation_delay_secs, 3);
        assert_eq!(config.sensors.gas.threshold, Some(250));

        std::fs::write(&path, "[alarm]\ndefault_code = \"12\"\n").unwrap();
        assert!(load_config(path.to_str()).is_err());
    }

    #[test]
    fn code_file_override() {
        let mut config = Config::default();
        assert!(code_file_path(&config).ends_with("hearth/alarm-code"));
        config.alarm.code_file = Some(PathBuf::from("/var/lib/hearth/code"));
        assert_eq!(
            code_file_path(&config),
            PathBuf::from("/var/lib/hearth/code")
        );
    }
}
