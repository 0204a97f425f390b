//! Config file discovery and loading.
//!
//! Resolution order, first hit wins:
//! 1. an explicit path (must exist)
//! 2. `HF_CONFIG`
//! 3. `config.toml` in the data dir (`HF_DATA_DIR`, else `~/.handfield`), if present
//! 4. built-in defaults

use std::path::{Path, PathBuf};
use std::{env, fs};

use hf_core::SimConfig;

use crate::error::Result;

pub const CONFIG_ENV: &str = "HF_CONFIG";
pub const DATA_DIR_ENV: &str = "HF_DATA_DIR";
pub const CONFIG_FILE: &str = "config.toml";

/// Default base directory for handfield files.
pub fn default_base_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs_home().join(".handfield")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Where configuration comes from, for logging and `hf config`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(p) => write!(f, "{}", p.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Pick the config file to read, without touching its contents.
pub fn resolve_config_path(explicit: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::File(p.to_path_buf());
    }
    if let Ok(p) = env::var(CONFIG_ENV)
        && !p.is_empty()
    {
        return ConfigSource::File(PathBuf::from(p));
    }
    let candidate = default_base_dir().join(CONFIG_FILE);
    if candidate.is_file() {
        ConfigSource::File(candidate)
    } else {
        ConfigSource::Defaults
    }
}

/// Parse and validate TOML config text. Missing keys take their defaults.
pub fn parse_config(text: &str) -> Result<SimConfig> {
    let config: SimConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Resolve, read and validate the configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<(SimConfig, ConfigSource)> {
    let source = resolve_config_path(explicit);
    let config = match &source {
        ConfigSource::File(path) => {
            let text = fs::read_to_string(path)?;
            let config = parse_config(&text)?;
            tracing::info!("loaded config from {}", path.display());
            config
        }
        ConfigSource::Defaults => {
            tracing::debug!("no config file found, using defaults");
            SimConfig::default()
        }
    };
    Ok((config, source))
}

/// Render a config as TOML, e.g. to seed a user's config file.
pub fn render_config(config: &SimConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use hf_core::PerformanceTier;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = parse_config(
            r#"
            tier = "high"

            [physics]
            damping = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(cfg.tier, PerformanceTier::High);
        assert_eq!(cfg.physics.damping, 0.9);
        assert_eq!(cfg.physics.return_speed, SimConfig::default().physics.return_speed);
        assert_eq!(cfg.hand_timeout_ms, 800.0);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), SimConfig::default());
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = parse_config("[physics]\ndamping = 1.5\n").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)), "{err}");
    }

    #[test]
    fn test_infinite_values_rejected() {
        for text in [
            "[physics]\nexplosion_force = inf\n",
            "[shapes]\ndepth_jitter = inf\n",
            "[color]\nhue_step = nan\n",
        ] {
            let err = parse_config(text).unwrap_err();
            assert!(matches!(err, StoreError::Config(_)), "{text}: {err}");
        }
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_config("tier = ").unwrap_err();
        assert!(matches!(err, StoreError::Toml(_)));
    }

    #[test]
    fn test_render_roundtrip() {
        let mut cfg = SimConfig::default();
        cfg.particle_count = Some(321);
        cfg.shapes.text = "HI".into();
        let text = render_config(&cfg).unwrap();
        assert_eq!(parse_config(&text).unwrap(), cfg);
    }

    #[test]
    fn test_explicit_path_wins() {
        let p = Path::new("/tmp/somewhere/hf.toml");
        assert_eq!(resolve_config_path(Some(p)), ConfigSource::File(p.to_path_buf()));
    }
}
