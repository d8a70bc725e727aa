use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Config file not found. Looked in:\n\
        - current directory: driftcheck.local.yaml, .driftcheck.local.yaml, driftcheck.yaml, .driftcheck.yaml\n\
        - ./.driftcheck/ directory\n\
        - ~/.config/driftcheck/driftcheck.yaml\n\
        Set DRIFTCHECK_CONFIG_PATH to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("Missing required config key: {0}")]
    MissingKey(String),

    #[error("Invalid value for config key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Config file is not a YAML mapping: {0}")]
    NotAMapping(PathBuf),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
