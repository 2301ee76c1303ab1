use super::wrap::{self, WrappedPage};
use pacer_core::config::{AppConfig, FontWeight, HighlightColor, ThemeMode};
use pacer_core::engine::HighlightSpan;
use pacer_core::session::{ReaderSession, ReaderSnapshot};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// What the last frame put on screen, kept for hit testing and scrolling.
#[derive(Debug, Default)]
pub struct ViewState {
    pub page: WrappedPage,
    pub text_area: Rect,
    pub scroll: usize,
    pub show_error: bool,
    wrapped_for: Option<(usize, u16)>,
}

impl ViewState {
    pub fn new(show_error: bool) -> Self {
        Self {
            show_error,
            ..Self::default()
        }
    }

    /// Word under a terminal cell, as `(paragraph, word)` in the current
    /// container.
    pub fn word_at_cell(&self, column: u16, row: u16) -> Option<(usize, usize)> {
        let area = self.text_area;
        if column < area.x || row < area.y || column >= area.x + area.width || row >= area.y + area.height {
            return None;
        }
        let row = self.scroll + usize::from(row - area.y);
        self.page.word_at(row, column - area.x)
    }
}

struct Palette {
    fg: Color,
    bg: Color,
    dim: Color,
    accent: Color,
}

fn palette(theme: ThemeMode) -> Palette {
    match theme {
        ThemeMode::Day => Palette {
            fg: Color::Rgb(30, 30, 30),
            bg: Color::Rgb(250, 248, 240),
            dim: Color::Rgb(120, 120, 120),
            accent: Color::Rgb(40, 90, 160),
        },
        ThemeMode::Night => Palette {
            fg: Color::Rgb(205, 205, 200),
            bg: Color::Rgb(18, 18, 20),
            dim: Color::Rgb(110, 110, 110),
            accent: Color::Rgb(215, 180, 90),
        },
    }
}

/// Black or white, whichever reads better on `background`.
fn contrast_fg(background: HighlightColor) -> Color {
    let luminance = 0.2126 * background.r + 0.7152 * background.g + 0.0722 * background.b;
    if luminance > 0.5 { Color::Black } else { Color::White }
}

fn highlight_style(config: &AppConfig, snapshot: &ReaderSnapshot) -> Style {
    let color = snapshot.highlight_color;
    let (r, g, b) = color.to_rgb8();
    let style = Style::default().bg(Color::Rgb(r, g, b)).fg(contrast_fg(color));
    match config.font_weight {
        FontWeight::Bold => style.add_modifier(Modifier::BOLD),
        FontWeight::Light => style.add_modifier(Modifier::DIM),
        FontWeight::Normal => style,
    }
}

pub fn draw(frame: &mut Frame, session: &ReaderSession, state: &mut ViewState) {
    let snapshot = session.snapshot();
    let colors = palette(session.config.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_content(frame, session, &snapshot, &colors, rows[0], state);
    draw_status(frame, &snapshot, &colors, rows[1]);
    draw_help(frame, &session.config, &colors, rows[2]);

    if state.show_error {
        if let Some(message) = &snapshot.error {
            draw_error(frame, message, area);
        }
    }
}

fn draw_content(
    frame: &mut Frame,
    session: &ReaderSession,
    snapshot: &ReaderSnapshot,
    colors: &Palette,
    area: Rect,
    state: &mut ViewState,
) {
    let title = snapshot
        .book_name
        .clone()
        .unwrap_or_else(|| "No book".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(Style::default().fg(colors.dim));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let margin = session.config.margin_horizontal.min(inner.width / 4);
    let text_area = Rect {
        x: inner.x + margin,
        y: inner.y,
        width: inner.width.saturating_sub(margin * 2),
        height: inner.height,
    };
    state.text_area = text_area;

    let Some(engine) = session.engine() else {
        state.page = WrappedPage::default();
        state.wrapped_for = None;
        let hint = Paragraph::new("Nothing to read.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(colors.dim));
        frame.render_widget(hint, text_area);
        return;
    };

    let container = snapshot.container_index;
    if state.wrapped_for != Some((container, text_area.width)) {
        let paragraphs = engine
            .document()
            .container(container)
            .map(|c| c.paragraphs())
            .unwrap_or_default();
        if state.wrapped_for.map(|(c, _)| c) != Some(container) {
            state.scroll = 0;
        }
        state.page = wrap::wrap_paragraphs(paragraphs, text_area.width);
        state.wrapped_for = Some((container, text_area.width));
    }

    if let Some(span) = snapshot.highlight {
        if let Some(row) = state.page.row_of(span.paragraph_index, span.start) {
            state.scroll = wrap::scroll_to_show(state.scroll, row, usize::from(text_area.height));
        }
    }

    let base = Style::default().fg(colors.fg).bg(colors.bg);
    let marked = highlight_style(&session.config, snapshot);
    let lines: Vec<Line> = state
        .page
        .lines
        .iter()
        .skip(state.scroll)
        .take(usize::from(text_area.height))
        .map(|line| render_line(engine, line, snapshot.highlight, base, marked))
        .collect();
    frame.render_widget(Paragraph::new(lines).style(base), text_area);
}

fn render_line<'a>(
    engine: &'a pacer_core::engine::PacingEngine,
    line: &wrap::WrappedLine,
    highlight: Option<HighlightSpan>,
    base: Style,
    marked: Style,
) -> Line<'a> {
    let container = engine.position().container_index;
    let is_marked = |paragraph: usize, word: usize| {
        highlight.is_some_and(|span| {
            span.container_index == container && span.contains(paragraph, word)
        })
    };

    let mut spans = Vec::with_capacity(line.words.len() * 2);
    let mut previous: Option<(usize, usize)> = None;
    for placed in &line.words {
        let Some(word) = engine
            .document()
            .paragraph(container, placed.paragraph)
            .and_then(|p| p.words().get(placed.word))
        else {
            continue;
        };
        if let Some((p, w)) = previous {
            let joined = is_marked(p, w) && is_marked(placed.paragraph, placed.word);
            spans.push(Span::styled(" ", if joined { marked } else { base }));
        }
        let style = if is_marked(placed.paragraph, placed.word) { marked } else { base };
        spans.push(Span::styled(word.text.as_str(), style));
        previous = Some((placed.paragraph, placed.word));
    }
    Line::from(spans)
}

fn draw_status(frame: &mut Frame, snapshot: &ReaderSnapshot, colors: &Palette, area: Rect) {
    let state = if snapshot.playing {
        "▶ playing"
    } else if snapshot.finished {
        "■ finished"
    } else {
        "⏸ paused"
    };
    let text = format!(
        " {} • {:.1}% • {} • {:.1} s/step • speed {}/{} • chunk {} ",
        snapshot.status,
        snapshot.progress_pct,
        state,
        snapshot.interval_ms as f64 / 1000.0,
        snapshot.speed,
        snapshot.speed_steps,
        snapshot.chunk_size,
    );
    let status = Paragraph::new(text).style(Style::default().fg(colors.accent).bg(colors.bg));
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, config: &AppConfig, colors: &Palette, area: Rect) {
    let text = format!(
        " {}: play/pause  {}/{}: chunk  {}: word back  {}/{}: page  {}/{}: speed  1-9: chunk size  {}: stop  {}: colour  {}: theme  {}: quit",
        config.key_toggle_play_pause,
        config.key_prev_chunk,
        config.key_next_chunk,
        config.key_prev_word,
        config.key_prev_container,
        config.key_next_container,
        config.key_speed_down,
        config.key_speed_up,
        config.key_stop,
        config.key_cycle_highlight,
        config.key_toggle_theme,
        config.key_quit,
    );
    let help = Paragraph::new(text).style(Style::default().fg(colors.dim).bg(colors.bg));
    frame.render_widget(help, area);
}

fn draw_error(frame: &mut Frame, message: &str, area: Rect) {
    let popup = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup);
    let body = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss.",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Could not open book ")
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(body, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contrast_picks_readable_foreground() {
        let pastel = HighlightColor { r: 1.0, g: 0.93, b: 0.55 };
        let dark = HighlightColor { r: 0.3, g: 0.2, b: 0.1 };
        assert_eq!(contrast_fg(pastel), Color::Black);
        assert_eq!(contrast_fg(dark), Color::White);
    }

    #[test]
    fn new_state_carries_error_flag_and_no_layout() {
        let state = ViewState::new(true);
        assert!(state.show_error);
        assert_eq!(state.wrapped_for, None);
        assert_eq!(state.scroll, 0);
        assert!(!ViewState::new(false).show_error);
    }

    #[test]
    fn cells_outside_text_area_hit_nothing() {
        let state = ViewState {
            text_area: Rect::new(2, 1, 10, 5),
            ..ViewState::default()
        };
        assert_eq!(state.word_at_cell(0, 0), None);
        assert_eq!(state.word_at_cell(3, 2), None);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 30, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 60);
    }
}
