//! Configuration loading for the pacer.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the reader can still launch.

pub(crate) mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, FontWeight, HIGHLIGHT_PRESETS, HighlightColor, LogLevel, ThemeMode};
