//! fcs-config: configuration file format and validation for flight control
//! systems.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{LATEST_VERSION, ValidationError, validate_config};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse and validate a YAML document.
pub fn from_yaml_str(content: &str) -> ConfigResult<FcsConfig> {
    let config: FcsConfig = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse and validate a JSON document.
pub fn from_json_str(content: &str) -> ConfigResult<FcsConfig> {
    let config: FcsConfig = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_yaml(path: &std::path::Path) -> ConfigResult<FcsConfig> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn load_json(path: &std::path::Path) -> ConfigResult<FcsConfig> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &std::path::Path) -> ConfigResult<FcsConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}

pub fn save_yaml(path: &std::path::Path, config: &FcsConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_json(path: &std::path::Path, config: &FcsConfig) -> ConfigResult<()> {
    validate_config(config)?;
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
