use std::iter;
use std::ops::Range;

use unicode_width::UnicodeWidthChar;

/// Visual state of one reference character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Not reached yet
    Pending,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub mark: Mark,
    pub cursor: bool,
}

/// Classify every reference character against the typed prefix.
///
/// Pure: the result depends only on the two strings.
pub fn project<'a>(reference: &'a str, typed: &'a str) -> impl Iterator<Item = Glyph> + 'a {
    project_window(reference, typed, 0..usize::MAX)
}

/// Like [`project`], restricted to the reference chars in `window`
pub fn project_window<'a>(
    reference: &'a str,
    typed: &'a str,
    window: Range<usize>,
) -> impl Iterator<Item = Glyph> + 'a {
    let cursor = typed.chars().count();
    let typed_chars = typed
        .chars()
        .skip(window.start)
        .map(Some)
        .chain(iter::repeat(None));

    reference
        .chars()
        .enumerate()
        .skip(window.start)
        .take(window.len())
        .zip(typed_chars)
        .map(move |((idx, ch), typed)| {
            let mark = match typed {
                None => Mark::Pending,
                Some(t) if t == ch => Mark::Correct,
                Some(_) => Mark::Incorrect,
            };
            Glyph {
                ch,
                mark,
                cursor: idx == cursor,
            }
        })
}

fn display_width(ch: char) -> usize {
    ch.width().unwrap_or(0).max(1)
}

/// Split `text` into display rows no wider than `width` columns.
///
/// Rows are char index ranges; breaks may fall anywhere, including inside words.
pub fn wrap_rows(text: &str, width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut rows = vec![];
    let mut start = 0;
    let mut used = 0;

    for (idx, ch) in text.chars().enumerate() {
        let w = display_width(ch);
        if used + w > width && idx > start {
            rows.push(start..idx);
            start = idx;
            used = 0;
        }
        used += w;
    }

    let len = text.chars().count();
    if start < len || rows.is_empty() {
        rows.push(start..len);
    }
    rows
}

/// Wrapped rows of the current text, rebuilt when the width or text changes
#[derive(Debug, Default)]
pub struct RowCache {
    key: Option<(usize, usize)>,
    rows: Vec<Range<usize>>,
}

impl RowCache {
    pub fn rows(&mut self, text: &str, width: usize) -> &[Range<usize>] {
        let key = (width, text.len());
        if self.key != Some(key) {
            self.rows = wrap_rows(text, width);
            self.key = Some(key);
        }
        &self.rows
    }

    /// Forget the cached rows; call whenever the text is replaced
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

/// Row holding char index `cursor`; a cursor past the end sits on the last row
pub fn row_of(rows: &[Range<usize>], cursor: usize) -> usize {
    rows.iter()
        .position(|r| r.contains(&cursor))
        .unwrap_or(rows.len().saturating_sub(1))
}

/// Proportion of the viewport after which the view scrolls down
pub const FOLLOW_THRESHOLD: f64 = 0.75;

/// New scroll offset keeping the cursor row visible, or None to stay put.
///
/// Scrolls when the cursor is below `scroll_top + 75%` of the viewport or
/// above `scroll_top`, placing it about one third down the viewport.
pub fn follow_cursor(cursor_row: usize, viewport_height: usize, scroll_top: usize) -> Option<usize> {
    let height = viewport_height as f64;
    let row = cursor_row as f64;

    if row > scroll_top as f64 + height * FOLLOW_THRESHOLD || cursor_row < scroll_top {
        let target = (row - height / 3.0).max(0.0) as usize;
        Some(target)
    } else {
        None
    }
}
