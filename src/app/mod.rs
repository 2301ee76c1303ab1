//! Interactive terminal front end.
//!
//! The loop blocks on terminal input for at most the time left until the
//! next autoplay tick, so highlighting stays on schedule without a timer
//! thread.

mod shortcuts;
mod view;
mod wrap;

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use pacer_core::session::{ReaderSession, SessionCommand};
use ratatui::{Terminal, backend::CrosstermBackend};
use shortcuts::KeyAction;
use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use view::ViewState;

/// Longest wait for input while autoplay is idle.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct App {
    session: ReaderSession,
    view: ViewState,
}

impl App {
    pub fn new(session: ReaderSession) -> Self {
        let view = ViewState::new(session.last_error().is_some());
        Self { session, view }
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal
                .draw(|frame| view::draw(frame, &self.session, &mut self.view))
                .context("drawing frame")?;

            let timeout = self
                .session
                .time_until_next_tick(Instant::now())
                .map_or(IDLE_POLL, |left| left.min(IDLE_POLL));
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            info!("Quit requested");
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
            self.session.tick(Instant::now());
        }
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let action = shortcuts::action_for_key(&self.session.config, key);
        if self.view.show_error && action != Some(KeyAction::Quit) {
            self.view.show_error = false;
            return false;
        }
        match action {
            Some(KeyAction::Quit) => true,
            Some(KeyAction::Session(command)) => {
                self.apply(command);
                false
            }
            None => {
                debug!(?key, "Unbound key");
                false
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let command = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self
                .view
                .word_at_cell(mouse.column, mouse.row)
                .map(|(paragraph, word)| SessionCommand::WordClick { paragraph, word }),
            MouseEventKind::ScrollDown => Some(SessionCommand::NextChunk),
            MouseEventKind::ScrollUp => Some(SessionCommand::PrevChunk),
            _ => None,
        };
        if let Some(command) = command {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: SessionCommand) {
        let event = self.session.apply_command(command, Instant::now());
        debug!(
            action = event.action,
            playing = event.snapshot.playing,
            status = %event.snapshot.status,
            "Applied command"
        );
    }
}

/// Take over the terminal and run until the user quits. The terminal is
/// restored when the loop fails, when setup fails halfway and on panic.
pub fn run(session: ReaderSession) -> Result<()> {
    install_panic_hook();
    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(err) => {
            restore_terminal();
            return Err(err);
        }
    };

    let mut app = App::new(session);
    let result = app.run_loop(&mut terminal);

    restore_terminal();
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("entering alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")
}

/// Leave raw mode, the alternate screen and mouse capture, and show the
/// cursor. Safe to call more than once and on a terminal never set up.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    );
}

static HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    HOOK_INSTALLED.call_once(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            error!(target: "runtime.panic", %info, "panic");
            default_hook(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restoring_an_untouched_terminal_is_harmless() {
        restore_terminal();
        restore_terminal();
    }

    #[test]
    fn panic_hook_installs_once() {
        install_panic_hook();
        install_panic_hook();
        assert!(HOOK_INSTALLED.is_completed());
    }
}
