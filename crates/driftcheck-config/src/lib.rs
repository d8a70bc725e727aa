pub mod error;
pub mod provider;

pub use error::*;
pub use provider::{ConfigProvider, ENV_PREFIX, EnvConfig, FileConfig, LayeredConfig};

use std::path::PathBuf;

const CONFIG_DIR_NAME: &str = "driftcheck";
const GLOBAL_CONFIG_FILE: &str = "driftcheck.yaml";
const CANDIDATES: [&str; 4] = [
    "driftcheck.local.yaml",
    ".driftcheck.local.yaml",
    "driftcheck.yaml",
    ".driftcheck.yaml",
];

/// Locate the project's config file
///
/// Search order:
/// 1. `DRIFTCHECK_CONFIG_PATH` (direct path)
/// 2. current directory: driftcheck.local.yaml, .driftcheck.local.yaml, driftcheck.yaml, .driftcheck.yaml
/// 3. `./.driftcheck/` with the same order
/// 4. `~/.config/driftcheck/driftcheck.yaml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("DRIFTCHECK_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "DRIFTCHECK_CONFIG_PATH points at a missing file: {}",
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(".driftcheck");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join(CONFIG_DIR_NAME).join(GLOBAL_CONFIG_FILE);
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Environment variables layered over the discovered config file
///
/// A missing config file is not an error; only the environment layer is used then.
pub fn load_default() -> Result<LayeredConfig> {
    let config = LayeredConfig::new().with_layer(EnvConfig);

    match find_config_file() {
        Ok(path) => Ok(config.with_layer(FileConfig::load(&path)?)),
        Err(ConfigError::ConfigFileNotFound) => {
            tracing::debug!("No config file found, using environment only");
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("driftcheck.yaml"), "environment: dev").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        assert!(result.is_ok());
        assert!(result.unwrap().ends_with("driftcheck.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("driftcheck.yaml"), "environment: a").unwrap();
        fs::write(temp_dir.path().join("driftcheck.local.yaml"), "environment: b").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file().unwrap();
        assert!(result.ends_with("driftcheck.local.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let project_dir = temp_dir.path().join(".driftcheck");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("driftcheck.yaml"), "environment: dev").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file().unwrap();
        assert!(result.ends_with(".driftcheck/driftcheck.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "environment: dev").unwrap();

        temp_env::with_var(
            "DRIFTCHECK_CONFIG_PATH",
            Some(config_path.to_str().unwrap()),
            || {
                let result = find_config_file().unwrap();
                assert_eq!(result, config_path);
            },
        );
    }

    #[test]
    #[serial]
    fn test_load_default_layers_env_over_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "environment: from-file\nsuffix: -blue\n").unwrap();

        temp_env::with_vars(
            [
                ("DRIFTCHECK_CONFIG_PATH", Some(config_path.to_str().unwrap())),
                ("DRIFTCHECK_ENVIRONMENT", Some("from-env")),
            ],
            || {
                let config = load_default().unwrap();
                assert_eq!(config.get("environment"), Some("from-env".to_string()));
                assert_eq!(config.get("suffix"), Some("-blue".to_string()));
            },
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    #[serial]
    fn test_load_default_without_file_leaves_config_dir_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let xdg = temp_dir.path().join("xdg");
        fs::create_dir(&xdg).unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        temp_env::with_vars(
            [
                ("DRIFTCHECK_CONFIG_PATH", None),
                ("DRIFTCHECK_ENVIRONMENT", None),
                ("XDG_CONFIG_HOME", Some(xdg.to_str().unwrap())),
            ],
            || {
                let config = load_default().unwrap();
                assert_eq!(config.get("environment"), None);
                assert!(!xdg.join(CONFIG_DIR_NAME).exists());
            },
        );

        std::env::set_current_dir(original_dir).unwrap();
    }
}
