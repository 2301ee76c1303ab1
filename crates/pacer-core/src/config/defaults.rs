use crate::document::Layout;
use crate::engine::DEFAULT_CHUNK_SIZE;
use crate::pagination::DEFAULT_PAGE_CHAR_BUDGET;
use crate::scheduler::{DEFAULT_MAX_INTERVAL_MS, DEFAULT_MIN_INTERVAL_MS, DEFAULT_SPEED_STEPS};

pub(crate) fn default_margin_horizontal() -> u16 {
    4
}

pub(crate) fn default_day_highlight() -> crate::config::HighlightColor {
    crate::config::HighlightColor {
        r: 1.0,
        g: 0.93,
        b: 0.55,
    }
}

pub(crate) fn default_night_highlight() -> crate::config::HighlightColor {
    crate::config::HighlightColor {
        r: 0.55,
        g: 0.45,
        b: 0.15,
    }
}

pub(crate) fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

pub(crate) fn default_layout() -> Layout {
    Layout::Page
}

pub(crate) fn default_page_char_budget() -> usize {
    DEFAULT_PAGE_CHAR_BUDGET
}

pub(crate) fn default_min_paragraph_chars() -> usize {
    30
}

pub(crate) fn default_speed() -> u32 {
    15
}

pub(crate) fn default_speed_steps() -> u32 {
    DEFAULT_SPEED_STEPS
}

pub(crate) fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}

pub(crate) fn default_max_interval_ms() -> u64 {
    DEFAULT_MAX_INTERVAL_MS
}

pub(crate) fn default_cache_dir() -> String {
    crate::store::CACHE_DIR.to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}

pub(crate) fn default_key_toggle_play_pause() -> String {
    "space".to_string()
}

pub(crate) fn default_key_quit() -> String {
    "q".to_string()
}

pub(crate) fn default_key_next_chunk() -> String {
    "right".to_string()
}

pub(crate) fn default_key_prev_chunk() -> String {
    "left".to_string()
}

pub(crate) fn default_key_prev_word() -> String {
    "backspace".to_string()
}

pub(crate) fn default_key_next_container() -> String {
    "n".to_string()
}

pub(crate) fn default_key_prev_container() -> String {
    "p".to_string()
}

pub(crate) fn default_key_stop() -> String {
    "s".to_string()
}

pub(crate) fn default_key_speed_up() -> String {
    "up".to_string()
}

pub(crate) fn default_key_speed_down() -> String {
    "down".to_string()
}

pub(crate) fn default_key_cycle_highlight() -> String {
    "h".to_string()
}

pub(crate) fn default_key_toggle_theme() -> String {
    "t".to_string()
}
