use std::fmt;

use hf_core::ConfigError;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    TomlWrite(toml::ser::Error),
    Json { line: usize, source: serde_json::Error },
    Config(ConfigError),
    InvalidData(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Toml(e) => write!(f, "config parse error: {e}"),
            StoreError::TomlWrite(e) => write!(f, "config write error: {e}"),
            StoreError::Json { line, source } => write!(f, "recording line {line}: {source}"),
            StoreError::Config(e) => write!(f, "config rejected: {e}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Toml(e) => Some(e),
            StoreError::TomlWrite(e) => Some(e),
            StoreError::Json { source, .. } => Some(source),
            StoreError::Config(e) => Some(e),
            StoreError::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::Toml(e)
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(e: toml::ser::Error) -> Self {
        StoreError::TomlWrite(e)
    }
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        StoreError::Config(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
