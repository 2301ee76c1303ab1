use super::defaults;
use super::models::{AppConfig, FontWeight, HighlightColor, LogLevel, ThemeMode};
use crate::document::Layout;
use serde::Deserialize;

/// On-disk layout of `config.toml`, grouped into tables.
#[derive(Debug, Clone, Deserialize, serde::Serialize, Default)]
pub(super) struct ConfigTables {
    #[serde(default)]
    appearance: AppearanceConfig,
    #[serde(default)]
    reading: ReadingConfig,
    #[serde(default)]
    autoplay: AutoplayConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    keys: KeysConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            theme: tables.appearance.theme,
            font_weight: tables.appearance.font_weight,
            margin_horizontal: tables.appearance.margin_horizontal,
            day_highlight: tables.appearance.day_highlight,
            night_highlight: tables.appearance.night_highlight,
            chunk_size: tables.reading.chunk_size,
            layout: tables.reading.layout,
            page_char_budget: tables.reading.page_char_budget,
            min_paragraph_chars: tables.reading.min_paragraph_chars,
            speed: tables.autoplay.speed,
            speed_steps: tables.autoplay.speed_steps,
            min_interval_ms: tables.autoplay.min_interval_ms,
            max_interval_ms: tables.autoplay.max_interval_ms,
            cache_dir: tables.storage.cache_dir,
            log_level: tables.logging.log_level,
            key_toggle_play_pause: tables.keys.toggle_play_pause,
            key_quit: tables.keys.quit,
            key_next_chunk: tables.keys.next_chunk,
            key_prev_chunk: tables.keys.prev_chunk,
            key_prev_word: tables.keys.prev_word,
            key_next_container: tables.keys.next_container,
            key_prev_container: tables.keys.prev_container,
            key_stop: tables.keys.stop,
            key_speed_up: tables.keys.speed_up,
            key_speed_down: tables.keys.speed_down,
            key_cycle_highlight: tables.keys.cycle_highlight,
            key_toggle_theme: tables.keys.toggle_theme,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            appearance: AppearanceConfig {
                theme: config.theme,
                font_weight: config.font_weight,
                margin_horizontal: config.margin_horizontal,
                day_highlight: config.day_highlight,
                night_highlight: config.night_highlight,
            },
            reading: ReadingConfig {
                chunk_size: config.chunk_size,
                layout: config.layout,
                page_char_budget: config.page_char_budget,
                min_paragraph_chars: config.min_paragraph_chars,
            },
            autoplay: AutoplayConfig {
                speed: config.speed,
                speed_steps: config.speed_steps,
                min_interval_ms: config.min_interval_ms,
                max_interval_ms: config.max_interval_ms,
            },
            storage: StorageConfig {
                cache_dir: config.cache_dir.clone(),
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            keys: KeysConfig {
                toggle_play_pause: config.key_toggle_play_pause.clone(),
                quit: config.key_quit.clone(),
                next_chunk: config.key_next_chunk.clone(),
                prev_chunk: config.key_prev_chunk.clone(),
                prev_word: config.key_prev_word.clone(),
                next_container: config.key_next_container.clone(),
                prev_container: config.key_prev_container.clone(),
                stop: config.key_stop.clone(),
                speed_up: config.key_speed_up.clone(),
                speed_down: config.key_speed_down.clone(),
                cycle_highlight: config.key_cycle_highlight.clone(),
                toggle_theme: config.key_toggle_theme.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AppearanceConfig {
    #[serde(default)]
    theme: ThemeMode,
    #[serde(default)]
    font_weight: FontWeight,
    #[serde(default = "defaults::default_margin_horizontal")]
    margin_horizontal: u16,
    #[serde(default = "defaults::default_day_highlight")]
    day_highlight: HighlightColor,
    #[serde(default = "defaults::default_night_highlight")]
    night_highlight: HighlightColor,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            theme: ThemeMode::default(),
            font_weight: FontWeight::default(),
            margin_horizontal: defaults::default_margin_horizontal(),
            day_highlight: defaults::default_day_highlight(),
            night_highlight: defaults::default_night_highlight(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ReadingConfig {
    #[serde(default = "defaults::default_chunk_size")]
    chunk_size: usize,
    #[serde(default = "defaults::default_layout")]
    layout: Layout,
    #[serde(default = "defaults::default_page_char_budget")]
    page_char_budget: usize,
    #[serde(default = "defaults::default_min_paragraph_chars")]
    min_paragraph_chars: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        ReadingConfig {
            chunk_size: defaults::default_chunk_size(),
            layout: defaults::default_layout(),
            page_char_budget: defaults::default_page_char_budget(),
            min_paragraph_chars: defaults::default_min_paragraph_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AutoplayConfig {
    #[serde(default = "defaults::default_speed")]
    speed: u32,
    #[serde(default = "defaults::default_speed_steps")]
    speed_steps: u32,
    #[serde(default = "defaults::default_min_interval_ms")]
    min_interval_ms: u64,
    #[serde(default = "defaults::default_max_interval_ms")]
    max_interval_ms: u64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        AutoplayConfig {
            speed: defaults::default_speed(),
            speed_steps: defaults::default_speed_steps(),
            min_interval_ms: defaults::default_min_interval_ms(),
            max_interval_ms: defaults::default_max_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            cache_dir: defaults::default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct KeysConfig {
    #[serde(default = "defaults::default_key_toggle_play_pause")]
    toggle_play_pause: String,
    #[serde(default = "defaults::default_key_quit")]
    quit: String,
    #[serde(default = "defaults::default_key_next_chunk")]
    next_chunk: String,
    #[serde(default = "defaults::default_key_prev_chunk")]
    prev_chunk: String,
    #[serde(default = "defaults::default_key_prev_word")]
    prev_word: String,
    #[serde(default = "defaults::default_key_next_container")]
    next_container: String,
    #[serde(default = "defaults::default_key_prev_container")]
    prev_container: String,
    #[serde(default = "defaults::default_key_stop")]
    stop: String,
    #[serde(default = "defaults::default_key_speed_up")]
    speed_up: String,
    #[serde(default = "defaults::default_key_speed_down")]
    speed_down: String,
    #[serde(default = "defaults::default_key_cycle_highlight")]
    cycle_highlight: String,
    #[serde(default = "defaults::default_key_toggle_theme")]
    toggle_theme: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        KeysConfig {
            toggle_play_pause: defaults::default_key_toggle_play_pause(),
            quit: defaults::default_key_quit(),
            next_chunk: defaults::default_key_next_chunk(),
            prev_chunk: defaults::default_key_prev_chunk(),
            prev_word: defaults::default_key_prev_word(),
            next_container: defaults::default_key_next_container(),
            prev_container: defaults::default_key_prev_container(),
            stop: defaults::default_key_stop(),
            speed_up: defaults::default_key_speed_up(),
            speed_down: defaults::default_key_speed_down(),
            cycle_highlight: defaults::default_key_cycle_highlight(),
            toggle_theme: defaults::default_key_toggle_theme(),
        }
    }
}
