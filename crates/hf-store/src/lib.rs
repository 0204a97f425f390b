//! File-backed surfaces for handfield: TOML configuration and JSONL
//! landmark recordings.

pub mod config;
pub mod error;
pub mod recording;

pub use config::{
    CONFIG_ENV, CONFIG_FILE, ConfigSource, DATA_DIR_ENV, default_base_dir, load_config,
    parse_config, render_config, resolve_config_path,
};
pub use error::{Result, StoreError};
pub use recording::{parse_recording, read_recording, render_recording, write_recording};
