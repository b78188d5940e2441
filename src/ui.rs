use std::ops::Range;

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    app::{App, InputMode},
    clock::Clock,
    engine::{Snapshot, Status},
    error::{Notice, NoticeKind},
    highlight::{follow_cursor, project_window, row_of, Glyph, Mark},
    session::Phase,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

struct Styles {
    correct: Style,
    incorrect: Style,
    pending: Style,
    cursor: Style,
}

impl Styles {
    fn new() -> Self {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        Self {
            correct: Style::default().patch(bold_style).fg(Color::Green),
            incorrect: Style::default()
                .patch(bold_style)
                .fg(Color::Red)
                .add_modifier(Modifier::UNDERLINED),
            pending: dim_bold_style,
            cursor: Style::default()
                .patch(bold_style)
                .fg(Color::Indexed(63))
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    fn for_glyph(&self, glyph: &Glyph) -> Style {
        if glyph.cursor {
            return self.cursor;
        }
        match glyph.mark {
            Mark::Pending => self.pending,
            Mark::Correct => self.correct,
            Mark::Incorrect => self.incorrect,
        }
    }
}

fn display_char(glyph: &Glyph, visible_whitespace: bool) -> char {
    match glyph.ch {
        ' ' if visible_whitespace && glyph.mark == Mark::Incorrect => '·',
        '\t' => ' ',
        c => c,
    }
}

/// Draw the whole screen. Updates the scroll offset so the cursor stays in view.
pub fn draw<C: Clock>(f: &mut Frame, app: &mut App<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(3), // file selection
            Constraint::Min(3),    // text
            Constraint::Length(1), // stats
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_file_box(f, app, chunks[1]);
    render_text(f, app, chunks[2]);

    let snap = app.engine.snapshot();
    render_stats(f, &snap, chunks[3]);
    render_legend(f, app, chunks[4]);

    if let Some(notice) = app.engine.notice() {
        render_notice(f, notice);
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Book Typing Practice",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Load a PDF to turn it into a custom typing lesson.",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);

    f.render_widget(header, area);
}

fn render_file_box<C: Clock>(f: &mut Frame, app: &App<C>, area: Rect) {
    let snap = app.engine.snapshot();

    let content = if app.mode == InputMode::PathPrompt {
        Line::from(vec![
            Span::raw("Path: "),
            Span::styled(
                format!("{}█", app.path_input),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
    } else if let Status::Loading(progress) = snap.status {
        let text = match progress {
            Some(p) => format!(
                "Extracting text from PDF... page {} of {}",
                p.page, p.total
            ),
            None => "Extracting text from PDF (this may take a moment for large files)..."
                .to_string(),
        };
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Indexed(63))
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(path) = snap.selected_file {
        Line::from(Span::raw(path.display().to_string()))
    } else {
        Line::from(Span::styled(
            "No file selected",
            Style::default().fg(Color::Gray),
        ))
    };

    let widget = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title("1. Select a PDF Book"),
    );
    f.render_widget(widget, area);
}

fn render_text<C: Clock>(f: &mut Frame, app: &mut App<C>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("2. Start Typing");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let snap = app.engine.snapshot();
    if snap.reference_text.is_empty() {
        let placeholder = if matches!(snap.status, Status::Loading(_)) {
            "Loading text..."
        } else {
            "Please load a PDF file to begin your typing practice."
        };
        let widget = Paragraph::new(Span::styled(
            placeholder,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))
        .wrap(Wrap { trim: true });
        f.render_widget(widget, inner);
        return;
    }

    let height = inner.height as usize;
    let rows = app.rows.rows(snap.reference_text, inner.width as usize);
    let cursor_row = row_of(rows, snap.typed_len);

    let mut scroll_top = app.scroll_top.min(rows.len().saturating_sub(1));
    if let Some(top) = follow_cursor(cursor_row, height, scroll_top) {
        scroll_top = top;
    }

    let lines = visible_lines(&snap, rows, scroll_top, height, app.config.visible_whitespace);
    f.render_widget(Paragraph::new(lines), inner);

    app.scroll_top = scroll_top;
}

/// Styled rows `scroll_top..scroll_top + height`; only their chars are projected
fn visible_lines(
    snap: &Snapshot<'_>,
    rows: &[Range<usize>],
    scroll_top: usize,
    height: usize,
    visible_whitespace: bool,
) -> Vec<Line<'static>> {
    let visible = rows.iter().skip(scroll_top).take(height).collect::<Vec<_>>();
    let (Some(first), Some(last)) = (visible.first(), visible.last()) else {
        return vec![];
    };
    let window = first.start..last.end;

    let styles = Styles::new();
    let glyphs: Vec<Glyph> =
        project_window(snap.reference_text, snap.typed_text, window.clone()).collect();

    visible
        .iter()
        .map(|row| {
            let spans = glyphs[row.start - window.start..row.end - window.start]
                .iter()
                .chunk_by(|g| styles.for_glyph(g))
                .into_iter()
                .map(|(style, group)| {
                    let text: String = group.map(|g| display_char(g, visible_whitespace)).collect();
                    Span::styled(text, style)
                })
                .collect::<Vec<Span>>();
            Line::from(spans)
        })
        .collect()
}

fn render_stats(f: &mut Frame, snap: &Snapshot<'_>, area: Rect) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let phase_style = match snap.phase {
        Phase::Idle => Style::default().fg(Color::Gray),
        Phase::Running => Style::default().fg(Color::Yellow),
        Phase::Completed => Style::default().fg(Color::Green),
    };

    let stats = Paragraph::new(Line::from(vec![
        Span::styled(format!("WPM: {}", snap.wpm), bold_style),
        Span::raw("   "),
        Span::styled(format!("Errors: {}", snap.error_count), bold_style),
        Span::raw("   "),
        Span::styled(format!("Time: {}s", snap.elapsed_seconds), bold_style),
        Span::raw("   "),
        Span::styled(snap.phase.to_string(), phase_style),
    ]))
    .alignment(Alignment::Center);

    f.render_widget(stats, area);
}

fn render_legend<C: Clock>(f: &mut Frame, app: &App<C>, area: Rect) {
    let text = match app.mode {
        InputMode::PathPrompt => "(enter) load / (esc) cancel",
        InputMode::Typing if app.engine.file_input_enabled() => {
            "(ctrl+o) open pdf / (ctrl+r) reset / (esc)ape"
        }
        InputMode::Typing => "(ctrl+r) reset / (esc)ape",
    };

    let legend = Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(legend, area);
}

fn render_notice(f: &mut Frame, notice: &Notice) {
    let area = centered_rect(50, 30, f.area());
    let border = match notice.kind {
        NoticeKind::Info => Color::Indexed(63),
        NoticeKind::Error => Color::Red,
    };

    let body = Paragraph::new(vec![
        Line::from(notice.message.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            "(enter) got it",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(Span::styled(
                notice.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(Clear, area);
    f.render_widget(body, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
