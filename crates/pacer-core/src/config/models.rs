use crate::document::{BuildOptions, Layout};
use crate::engine::MAX_CHUNK_SIZE;
use crate::pagination::{MAX_PAGE_CHAR_BUDGET, MIN_PAGE_CHAR_BUDGET};
use crate::scheduler::SpeedCurve;
use serde::Deserialize;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default = "crate::config::defaults::default_margin_horizontal")]
    pub margin_horizontal: u16,
    #[serde(default = "crate::config::defaults::default_day_highlight")]
    pub day_highlight: HighlightColor,
    #[serde(default = "crate::config::defaults::default_night_highlight")]
    pub night_highlight: HighlightColor,
    #[serde(default = "crate::config::defaults::default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "crate::config::defaults::default_layout")]
    pub layout: Layout,
    #[serde(default = "crate::config::defaults::default_page_char_budget")]
    pub page_char_budget: usize,
    #[serde(default = "crate::config::defaults::default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,
    #[serde(default = "crate::config::defaults::default_speed")]
    pub speed: u32,
    #[serde(default = "crate::config::defaults::default_speed_steps")]
    pub speed_steps: u32,
    #[serde(default = "crate::config::defaults::default_min_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_max_interval_ms")]
    pub max_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_key_toggle_play_pause")]
    pub key_toggle_play_pause: String,
    #[serde(default = "crate::config::defaults::default_key_quit")]
    pub key_quit: String,
    #[serde(default = "crate::config::defaults::default_key_next_chunk")]
    pub key_next_chunk: String,
    #[serde(default = "crate::config::defaults::default_key_prev_chunk")]
    pub key_prev_chunk: String,
    #[serde(default = "crate::config::defaults::default_key_prev_word")]
    pub key_prev_word: String,
    #[serde(default = "crate::config::defaults::default_key_next_container")]
    pub key_next_container: String,
    #[serde(default = "crate::config::defaults::default_key_prev_container")]
    pub key_prev_container: String,
    #[serde(default = "crate::config::defaults::default_key_stop")]
    pub key_stop: String,
    #[serde(default = "crate::config::defaults::default_key_speed_up")]
    pub key_speed_up: String,
    #[serde(default = "crate::config::defaults::default_key_speed_down")]
    pub key_speed_down: String,
    #[serde(default = "crate::config::defaults::default_key_cycle_highlight")]
    pub key_cycle_highlight: String,
    #[serde(default = "crate::config::defaults::default_key_toggle_theme")]
    pub key_toggle_theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            theme: ThemeMode::Night,
            font_weight: FontWeight::Bold,
            margin_horizontal: crate::config::defaults::default_margin_horizontal(),
            day_highlight: crate::config::defaults::default_day_highlight(),
            night_highlight: crate::config::defaults::default_night_highlight(),
            chunk_size: crate::config::defaults::default_chunk_size(),
            layout: crate::config::defaults::default_layout(),
            page_char_budget: crate::config::defaults::default_page_char_budget(),
            min_paragraph_chars: crate::config::defaults::default_min_paragraph_chars(),
            speed: crate::config::defaults::default_speed(),
            speed_steps: crate::config::defaults::default_speed_steps(),
            min_interval_ms: crate::config::defaults::default_min_interval_ms(),
            max_interval_ms: crate::config::defaults::default_max_interval_ms(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            log_level: crate::config::defaults::default_log_level(),
            key_toggle_play_pause: crate::config::defaults::default_key_toggle_play_pause(),
            key_quit: crate::config::defaults::default_key_quit(),
            key_next_chunk: crate::config::defaults::default_key_next_chunk(),
            key_prev_chunk: crate::config::defaults::default_key_prev_chunk(),
            key_prev_word: crate::config::defaults::default_key_prev_word(),
            key_next_container: crate::config::defaults::default_key_next_container(),
            key_prev_container: crate::config::defaults::default_key_prev_container(),
            key_stop: crate::config::defaults::default_key_stop(),
            key_speed_up: crate::config::defaults::default_key_speed_up(),
            key_speed_down: crate::config::defaults::default_key_speed_down(),
            key_cycle_highlight: crate::config::defaults::default_key_cycle_highlight(),
            key_toggle_theme: crate::config::defaults::default_key_toggle_theme(),
        }
    }
}

impl AppConfig {
    /// Pull every numeric setting back into its supported range.
    pub fn clamp_in_place(&mut self) {
        self.chunk_size = self.chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self.page_char_budget = self
            .page_char_budget
            .clamp(MIN_PAGE_CHAR_BUDGET, MAX_PAGE_CHAR_BUDGET);
        let curve = self.speed_curve();
        self.min_interval_ms = curve.min_interval_ms;
        self.max_interval_ms = curve.max_interval_ms;
        self.speed_steps = curve.steps;
        self.speed = curve.clamp_level(self.speed);
        self.margin_horizontal = self.margin_horizontal.min(40);
        self.day_highlight = self.day_highlight.clamped();
        self.night_highlight = self.night_highlight.clamped();
    }

    pub fn speed_curve(&self) -> SpeedCurve {
        SpeedCurve::new(self.min_interval_ms, self.max_interval_ms, self.speed_steps)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            layout: self.layout,
            page_char_budget: self.page_char_budget,
        }
    }

    pub fn active_highlight(&self) -> HighlightColor {
        match self.theme {
            ThemeMode::Day => self.day_highlight,
            ThemeMode::Night => self.night_highlight,
        }
    }

    pub fn active_highlight_mut(&mut self) -> &mut HighlightColor {
        match self.theme {
            ThemeMode::Day => &mut self.day_highlight,
            ThemeMode::Night => &mut self.night_highlight,
        }
    }
}

/// Theme mode.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    Day,
    #[default]
    Night,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Day => ThemeMode::Night,
            ThemeMode::Night => ThemeMode::Day,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeMode::Day => "Day",
            ThemeMode::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

/// Weight of the highlighted chunk.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    Light,
    Normal,
    #[default]
    Bold,
}

impl std::fmt::Display for FontWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FontWeight::Light => "Light",
            FontWeight::Normal => "Normal",
            FontWeight::Bold => "Bold",
        };
        write!(f, "{}", label)
    }
}

/// Highlight background, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize, PartialEq)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Pastel presets the highlight control cycles through.
pub const HIGHLIGHT_PRESETS: [HighlightColor; 5] = [
    HighlightColor {
        r: 1.0,
        g: 0.93,
        b: 0.55,
    },
    HighlightColor {
        r: 0.68,
        g: 0.85,
        b: 0.9,
    },
    HighlightColor {
        r: 0.6,
        g: 0.9,
        b: 0.6,
    },
    HighlightColor {
        r: 1.0,
        g: 0.71,
        b: 0.76,
    },
    HighlightColor {
        r: 0.55,
        g: 0.45,
        b: 0.15,
    },
];

impl HighlightColor {
    pub fn clamped(self) -> Self {
        HighlightColor {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }

    /// The preset after this color, wrapping; custom colors go to the first.
    pub fn next_preset(self) -> Self {
        let current = HIGHLIGHT_PRESETS.iter().position(|preset| *preset == self);
        match current {
            Some(idx) => HIGHLIGHT_PRESETS[(idx + 1) % HIGHLIGHT_PRESETS.len()],
            None => HIGHLIGHT_PRESETS[0],
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
