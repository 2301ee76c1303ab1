use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

/// Parse table-grouped TOML into a clamped [`AppConfig`].
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("parsing config TOML")?;
    let mut config = AppConfig::from(tables);
    config.clamp_in_place();
    Ok(config)
}

/// Render `config` back into the table-grouped TOML layout.
pub fn serialize_config(config: &AppConfig) -> Result<String> {
    let tables = ConfigTables::from(config);
    toml::to_string_pretty(&tables).context("serializing config TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FontWeight, LogLevel, ThemeMode};
    use crate::document::Layout;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").expect("empty TOML parses");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn tables_map_onto_flat_config() {
        let toml = r#"
[appearance]
theme = "day"
font_weight = "light"

[reading]
chunk_size = 6
layout = "chapter"

[autoplay]
speed = 3

[logging]
log_level = "warn"

[keys]
quit = "ctrl+q"
"#;
        let config = parse_config(toml).expect("valid TOML");
        assert_eq!(config.theme, ThemeMode::Day);
        assert_eq!(config.font_weight, FontWeight::Light);
        assert_eq!(config.chunk_size, 6);
        assert_eq!(config.layout, Layout::Chapter);
        assert_eq!(config.speed, 3);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.key_quit, "ctrl+q");
        assert_eq!(config.key_next_chunk, "right");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let toml = r#"
[reading]
chunk_size = 0
page_char_budget = 5

[autoplay]
speed = 500
min_interval_ms = 900
max_interval_ms = 100
"#;
        let config = parse_config(toml).expect("valid TOML");
        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.page_char_budget, 200);
        assert_eq!(config.speed, config.speed_steps);
        assert!(config.max_interval_ms >= config.min_interval_ms);
    }

    #[test]
    fn huge_interval_is_capped() {
        let toml = "[autoplay]\nmax_interval_ms = 9000000000000000000\n";
        let config = parse_config(toml).expect("valid TOML");
        assert_eq!(config.max_interval_ms, 60_000);
        assert_eq!(config.speed_curve().interval_for(1).as_millis(), 60_000);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_config("[reading\nchunk_size = 3").is_err());
        assert!(parse_config("[reading]\nchunk_size = \"four\"").is_err());
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = AppConfig::default();
        config.theme = ThemeMode::Day;
        config.chunk_size = 7;
        config.key_stop = "x".to_string();
        let text = serialize_config(&config).expect("serializes");
        assert!(text.contains("[reading]"));
        assert_eq!(parse_config(&text).expect("parses back"), config);
    }

    #[test]
    fn missing_or_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(load_config(&missing), AppConfig::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[autoplay]\nspeed = [").unwrap();
        assert_eq!(load_config(&broken), AppConfig::default());

        let good = dir.path().join("config.toml");
        fs::write(&good, "[autoplay]\nspeed = 4\n").unwrap();
        assert_eq!(load_config(&good).speed, 4);
    }
}
