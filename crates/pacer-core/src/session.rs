use crate::{
    cancellation::CancellationToken,
    config::{self, AppConfig},
    document::{self, Layout},
    engine::{AdvanceResult, HighlightSpan, PacingEngine, Position},
    epub_loader::{self, ExtractOptions, LoadedBook},
    error::LoadError,
    preferences::{self, ReaderPreferences},
    progress::{self, BookIdentity},
    scheduler::AutoplayScheduler,
    store::KeyValueStore,
};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ReaderSnapshot {
    pub book_name: Option<String>,
    pub position: Option<Position>,
    pub highlight: Option<HighlightSpan>,
    pub chunk_text: Option<String>,
    pub container_index: usize,
    pub total_containers: usize,
    /// "Page 3 of 12" style indicator.
    pub status: String,
    pub progress_pct: f64,
    pub playing: bool,
    pub finished: bool,
    pub interval_ms: u64,
    pub speed: u32,
    pub speed_steps: u32,
    pub chunk_size: usize,
    pub layout: Layout,
    pub theme: config::ThemeMode,
    pub font_weight: config::FontWeight,
    pub highlight_color: config::HighlightColor,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    GetSnapshot,
    NextChunk,
    PrevChunk,
    PrevWord,
    NextContainer,
    PrevContainer,
    JumpToParagraph { container: usize, paragraph: usize },
    WordClick { paragraph: usize, word: usize },
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    SpeedUp,
    SpeedDown,
    SetSpeed { level: u32 },
    SetChunkSize { size: usize },
    CycleHighlight,
    ToggleTheme,
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::NextChunk => "reader_next_chunk",
            Self::PrevChunk => "reader_prev_chunk",
            Self::PrevWord => "reader_prev_word",
            Self::NextContainer => "reader_next_container",
            Self::PrevContainer => "reader_prev_container",
            Self::JumpToParagraph { .. } => "reader_jump_to_paragraph",
            Self::WordClick { .. } => "reader_word_click",
            Self::Play => "reader_autoplay_play",
            Self::Pause => "reader_autoplay_pause",
            Self::TogglePlayPause => "reader_autoplay_toggle",
            Self::Stop => "reader_autoplay_stop",
            Self::SpeedUp => "reader_speed_up",
            Self::SpeedDown => "reader_speed_down",
            Self::SetSpeed { .. } => "reader_set_speed",
            Self::SetChunkSize { .. } => "reader_set_chunk_size",
            Self::CycleHighlight => "reader_cycle_highlight",
            Self::ToggleTheme => "reader_toggle_theme",
        }
    }

    /// Manual navigation takes over from autoplay.
    fn stops_autoplay(&self) -> bool {
        matches!(
            self,
            Self::NextChunk
                | Self::PrevChunk
                | Self::PrevWord
                | Self::NextContainer
                | Self::PrevContainer
                | Self::JumpToParagraph { .. }
                | Self::WordClick { .. }
        )
    }
}

pub const AUTOPLAY_TICK_ACTION: &str = "reader_autoplay_tick";

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub snapshot: ReaderSnapshot,
}

struct OpenBook {
    identity: BookIdentity,
    name: String,
    engine: PacingEngine,
    finished: bool,
}

/// Everything the reader needs between key presses: the loaded book and its
/// cursor, the autoplay timer, settings and storage.
pub struct ReaderSession {
    pub config: AppConfig,
    store: Box<dyn KeyValueStore>,
    book: Option<OpenBook>,
    scheduler: AutoplayScheduler,
    last_error: Option<String>,
}

impl ReaderSession {
    pub fn new(mut config: AppConfig, store: Box<dyn KeyValueStore>) -> Self {
        config.clamp_in_place();
        Self {
            config,
            store,
            book: None,
            scheduler: AutoplayScheduler::new(),
            last_error: None,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn engine(&self) -> Option<&PacingEngine> {
        self.book.as_ref().map(|book| &book.engine)
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Open a file, replacing whatever was loaded. With `resume` the saved
    /// position for this file is restored; otherwise it is discarded.
    pub fn load_path(
        &mut self,
        path: &Path,
        resume: bool,
        cancel: &CancellationToken,
    ) -> Result<(), LoadError> {
        self.close_book();
        let options = ExtractOptions {
            min_paragraph_chars: self.config.min_paragraph_chars,
        };
        let outcome = epub_loader::load_book(path, options, cancel)
            .and_then(|loaded| self.open_loaded(loaded, resume));
        if let Err(err) = &outcome {
            warn!(path = %path.display(), kind = err.kind(), "Failed to load book: {err}");
            self.last_error = Some(err.to_string());
        }
        outcome
    }

    /// Open already-extracted chapters. Used for books that do not come from
    /// a file on disk.
    pub fn load_chapters(
        &mut self,
        identity: BookIdentity,
        title: Option<String>,
        chapters: Vec<Vec<String>>,
        resume: bool,
    ) -> Result<(), LoadError> {
        self.close_book();
        let loaded = LoadedBook {
            identity,
            title,
            chapters,
        };
        let outcome = self.open_loaded(loaded, resume);
        if let Err(err) = &outcome {
            warn!(kind = err.kind(), "Failed to open book: {err}");
            self.last_error = Some(err.to_string());
        }
        outcome
    }

    fn close_book(&mut self) {
        self.scheduler.stop();
        self.book = None;
        self.last_error = None;
    }

    fn open_loaded(&mut self, loaded: LoadedBook, resume: bool) -> Result<(), LoadError> {
        let document = document::build(&loaded.chapters, self.config.build_options())?;
        let mut engine = PacingEngine::new(document, self.config.chunk_size);
        let store = self.store.as_ref();
        if resume {
            if let Some(saved) = progress::load(store, &loaded.identity) {
                engine.restore(saved);
                info!(
                    book = %loaded.identity,
                    container = engine.position().container_index,
                    paragraph = engine.position().paragraph_index,
                    word = engine.position().word_index,
                    "Resumed saved position"
                );
            }
        } else {
            progress::clear(store, &loaded.identity);
        }
        let name = loaded.display_name().to_string();
        info!(book = %loaded.identity, title = %name, "Book ready");
        self.book = Some(OpenBook {
            identity: loaded.identity,
            name,
            engine,
            finished: false,
        });
        Ok(())
    }

    pub fn apply_command(&mut self, command: SessionCommand, now: Instant) -> SessionEvent {
        let action = command.action();
        debug!(action, "Applying reader command");
        if command.stops_autoplay() {
            self.scheduler.stop();
        }
        let before = self.engine().map(PacingEngine::position);

        match command {
            SessionCommand::GetSnapshot => {}
            SessionCommand::NextChunk => {
                if let Some(book) = self.book.as_mut() {
                    book.finished = book.engine.advance() == AdvanceResult::Finished;
                }
            }
            SessionCommand::PrevChunk => self.with_engine(|engine| {
                engine.retreat_chunk();
            }),
            SessionCommand::PrevWord => self.with_engine(|engine| {
                engine.retreat();
            }),
            SessionCommand::NextContainer => self.with_engine(|engine| {
                engine.next_container();
            }),
            SessionCommand::PrevContainer => self.with_engine(|engine| {
                engine.prev_container();
            }),
            SessionCommand::JumpToParagraph {
                container,
                paragraph,
            } => self.with_engine(|engine| engine.jump_to_paragraph(container, paragraph)),
            SessionCommand::WordClick { paragraph, word } => self.with_engine(|engine| {
                let container = engine.position().container_index;
                engine.jump_to_word(container, paragraph, word);
            }),
            SessionCommand::Play => self.play(now),
            SessionCommand::Pause => self.scheduler.stop(),
            SessionCommand::TogglePlayPause => {
                if self.scheduler.is_running() {
                    self.scheduler.stop();
                } else {
                    self.play(now);
                }
            }
            SessionCommand::Stop => {
                self.scheduler.stop();
                self.with_engine(PacingEngine::reset);
            }
            SessionCommand::SpeedUp => self.set_speed(self.config.speed.saturating_add(1), now),
            SessionCommand::SpeedDown => self.set_speed(self.config.speed.saturating_sub(1), now),
            SessionCommand::SetSpeed { level } => self.set_speed(level, now),
            SessionCommand::SetChunkSize { size } => self.set_chunk_size(size, now),
            SessionCommand::CycleHighlight => {
                let color = self.config.active_highlight_mut();
                *color = color.next_preset();
                self.save_preferences();
            }
            SessionCommand::ToggleTheme => {
                self.config.theme = self.config.theme.toggled();
                self.save_preferences();
            }
        }

        self.persist_if_moved(before);
        SessionEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    /// Advance once if the autoplay timer is due at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<SessionEvent> {
        let book = self.book.as_mut()?;
        let before = book.engine.position();
        let result = self.scheduler.drive(&mut book.engine, now)?;
        book.finished = result == AdvanceResult::Finished;
        self.persist_if_moved(Some(before));
        Some(SessionEvent {
            action: AUTOPLAY_TICK_ACTION,
            snapshot: self.snapshot(),
        })
    }

    /// How long the front end may block before the next tick is due.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_next(now)
    }

    pub fn current_interval(&self) -> Duration {
        self.config.speed_curve().interval_for(self.config.speed)
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        let engine = self.engine();
        let total_containers = engine.map(|e| e.document().len()).unwrap_or(0);
        let container_index = engine.map(|e| e.position().container_index).unwrap_or(0);
        let status = if total_containers == 0 {
            "No book loaded".to_string()
        } else {
            let unit = match self.config.layout {
                Layout::Chapter => "Chapter",
                Layout::Page => "Page",
            };
            format!("{unit} {} of {total_containers}", container_index + 1)
        };

        ReaderSnapshot {
            book_name: self.book.as_ref().map(|book| book.name.clone()),
            position: engine.map(PacingEngine::position),
            highlight: engine.and_then(PacingEngine::current_highlight),
            chunk_text: engine.and_then(PacingEngine::current_chunk_text),
            container_index,
            total_containers,
            status,
            progress_pct: engine.map(|e| e.progress().percent()).unwrap_or(0.0),
            playing: self.scheduler.is_running(),
            finished: self.book.as_ref().is_some_and(|book| book.finished),
            interval_ms: self.current_interval().as_millis() as u64,
            speed: self.config.speed,
            speed_steps: self.config.speed_steps,
            chunk_size: engine
                .map(PacingEngine::chunk_size)
                .unwrap_or(self.config.chunk_size),
            layout: self.config.layout,
            theme: self.config.theme,
            font_weight: self.config.font_weight,
            highlight_color: self.config.active_highlight(),
            error: self.last_error.clone(),
        }
    }

    pub fn preferences(&self) -> ReaderPreferences {
        ReaderPreferences::from_config(&self.config)
    }

    fn with_engine(&mut self, f: impl FnOnce(&mut PacingEngine)) {
        if let Some(book) = self.book.as_mut() {
            f(&mut book.engine);
            book.finished = false;
        }
    }

    fn play(&mut self, now: Instant) {
        if self.book.is_none() {
            debug!("Ignoring play without a loaded book");
            return;
        }
        if self.scheduler.is_running() {
            return;
        }
        let interval = self.current_interval();
        self.scheduler.start(interval, now);
    }

    fn set_speed(&mut self, level: u32, now: Instant) {
        let level = self.config.speed_curve().clamp_level(level);
        if level == self.config.speed {
            return;
        }
        self.config.speed = level;
        info!(speed = level, interval_ms = self.current_interval().as_millis() as u64, "Speed changed");
        self.restart_if_running(now);
        self.save_preferences();
    }

    fn set_chunk_size(&mut self, size: usize, now: Instant) {
        self.config.chunk_size = size;
        self.config.clamp_in_place();
        let size = self.config.chunk_size;
        if let Some(book) = self.book.as_mut() {
            book.engine.set_chunk_size(size);
        }
        info!(chunk_size = size, "Chunk size changed");
        self.restart_if_running(now);
        self.save_preferences();
    }

    fn restart_if_running(&mut self, now: Instant) {
        if self.scheduler.is_running() {
            let interval = self.current_interval();
            self.scheduler.start(interval, now);
        }
    }

    fn save_preferences(&self) {
        preferences::save(self.store.as_ref(), &self.preferences());
    }

    fn persist_if_moved(&self, before: Option<Position>) {
        let Some(book) = self.book.as_ref() else {
            return;
        };
        let after = book.engine.position();
        if before != Some(after) {
            progress::save(self.store.as_ref(), &book.identity, after);
        }
    }
}
