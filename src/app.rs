use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::clock::Clock;
use crate::config::Config;
use crate::engine::Engine;
use crate::highlight::RowCache;
use crate::ingest::IngestEvent;
use crate::runtime::AppEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Typing,
    /// Entering the path of a document to load
    PathPrompt,
}

/// What the event loop should do after an event was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// Start extracting the document at this path
    Ingest(PathBuf),
    Quit,
}

pub struct App<C: Clock> {
    pub engine: Engine<C>,
    pub mode: InputMode,
    pub path_input: String,
    /// First visible row of the text pane
    pub scroll_top: usize,
    pub rows: RowCache,
    pub config: Config,
}

impl<C: Clock> App<C> {
    pub fn new(clock: C, config: Config) -> Self {
        Self {
            engine: Engine::new(clock),
            mode: InputMode::Typing,
            path_input: String::new(),
            scroll_top: 0,
            rows: RowCache::default(),
            config,
        }
    }

    pub fn on_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Resize => Control::Continue,
            AppEvent::Tick(id) => {
                self.engine.on_tick(id);
                Control::Continue
            }
            AppEvent::Ingest(IngestEvent::Progress(p)) => {
                self.engine.ingest_progress(p);
                Control::Continue
            }
            AppEvent::Ingest(IngestEvent::Finished(result)) => {
                if self.engine.finish_ingest(result) {
                    self.scroll_top = 0;
                    self.rows.invalidate();
                }
                Control::Continue
            }
        }
    }

    /// Accept a document path from outside the UI (command line)
    pub fn open(&mut self, path: PathBuf) -> Control {
        if self.engine.begin_ingest(path.clone()) {
            Control::Ingest(path)
        } else {
            Control::Continue
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        if self.engine.notice().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.engine.dismiss_notice();
            }
            return Control::Continue;
        }

        match self.mode {
            InputMode::PathPrompt => self.on_prompt_key(key),
            InputMode::Typing => self.on_typing_key(key, ctrl),
        }
    }

    fn on_prompt_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Typing;
            }
            KeyCode::Enter => {
                self.mode = InputMode::Typing;
                let raw = self.path_input.trim();
                if !raw.is_empty() {
                    let path = PathBuf::from(raw);
                    return self.open(path);
                }
            }
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            KeyCode::Char(c) => self.path_input.push(c),
            _ => {}
        }
        Control::Continue
    }

    fn on_typing_key(&mut self, key: KeyEvent, ctrl: bool) -> Control {
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('o') if ctrl => self.open_prompt(),
            KeyCode::Char('r') if ctrl => {
                self.engine.reset();
                self.scroll_top = 0;
                self.rows.invalidate();
            }
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(c) => {
                if self.engine.typing_enabled() {
                    self.engine.type_char(c);
                }
            }
            KeyCode::Tab => {
                if self.engine.typing_enabled() {
                    self.engine.type_char('\t');
                }
            }
            KeyCode::Backspace => {
                if self.engine.typing_enabled() {
                    self.engine.backspace();
                }
            }
            _ => {}
        }
        Control::Continue
    }

    fn open_prompt(&mut self) {
        if !self.engine.file_input_enabled() {
            debug!("file input disabled while loading");
            return;
        }

        self.path_input = self
            .config
            .last_directory
            .as_ref()
            .map(|dir| format!("{}/", dir.display()))
            .unwrap_or_default();
        self.mode = InputMode::PathPrompt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::IngestError;
    use crate::session::Phase;
    use std::path::Path;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn loaded_app(text: &str) -> App<ManualClock> {
        let mut app = App::new(ManualClock::new(), Config::default());
        assert_eq!(
            app.open(PathBuf::from("book.pdf")),
            Control::Ingest(PathBuf::from("book.pdf"))
        );
        app.on_event(AppEvent::Ingest(IngestEvent::Finished(Ok(text.into()))));
        app.on_event(key(KeyCode::Enter));
        app
    }

    #[test]
    fn test_typing_updates_engine() {
        let mut app = loaded_app("hey");

        app.on_event(key(KeyCode::Char('h')));
        app.on_event(key(KeyCode::Char('x')));

        let snap = app.engine.snapshot();
        assert_eq!(snap.typed_text, "hx");
        assert_eq!(snap.error_count, 1);
        assert_eq!(snap.phase, Phase::Running);

        app.on_event(key(KeyCode::Backspace));
        assert_eq!(app.engine.snapshot().typed_text, "h");
    }

    #[test]
    fn test_notice_blocks_typing_until_dismissed() {
        let mut app = App::new(ManualClock::new(), Config::default());
        app.open(PathBuf::from("book.pdf"));
        app.on_event(AppEvent::Ingest(IngestEvent::Finished(Ok("abc".into()))));

        app.on_event(key(KeyCode::Char('a')));
        assert_eq!(app.engine.snapshot().typed_text, "");

        app.on_event(key(KeyCode::Esc));
        assert!(app.engine.notice().is_none());
        app.on_event(key(KeyCode::Char('a')));
        assert_eq!(app.engine.snapshot().typed_text, "a");
    }

    #[test]
    fn test_path_prompt_flow() {
        let mut app = App::new(
            ManualClock::new(),
            Config {
                last_directory: Some(PathBuf::from("/books")),
                ..Config::default()
            },
        );

        app.on_event(ctrl('o'));
        assert_eq!(app.mode, InputMode::PathPrompt);
        assert_eq!(app.path_input, "/books/");

        for c in "a.pdf".chars() {
            app.on_event(key(KeyCode::Char(c)));
        }
        let control = app.on_event(key(KeyCode::Enter));

        assert_eq!(control, Control::Ingest(PathBuf::from("/books/a.pdf")));
        assert_eq!(app.mode, InputMode::Typing);
        assert_eq!(
            app.engine.snapshot().selected_file,
            Some(Path::new("/books/a.pdf"))
        );
    }

    #[test]
    fn test_prompt_refused_while_loading() {
        let mut app = App::new(ManualClock::new(), Config::default());
        app.open(PathBuf::from("a.pdf"));

        app.on_event(ctrl('o'));

        assert_eq!(app.mode, InputMode::Typing);
    }

    #[test]
    fn test_prompt_with_wrong_type_shows_notice() {
        let mut app = App::new(ManualClock::new(), Config::default());
        app.on_event(ctrl('o'));
        for c in "notes.txt".chars() {
            app.on_event(key(KeyCode::Char(c)));
        }

        assert_eq!(app.on_event(key(KeyCode::Enter)), Control::Continue);
        assert_eq!(
            app.engine.notice().map(|n| n.title.as_str()),
            Some("Invalid File")
        );
    }

    #[test]
    fn test_ticks_and_reset() {
        let mut app = loaded_app("abcdef");
        app.on_event(key(KeyCode::Char('a')));
        let id = app.engine.active_clock().unwrap();

        app.on_event(AppEvent::Tick(id));
        assert_eq!(app.engine.snapshot().elapsed_seconds, 1);

        app.scroll_top = 4;
        app.on_event(ctrl('r'));
        app.on_event(AppEvent::Tick(id));

        let snap = app.engine.snapshot();
        assert_eq!(snap.elapsed_seconds, 0);
        assert_eq!(snap.reference_text, "");
        assert_eq!(app.scroll_top, 0);
    }

    #[test]
    fn test_failed_ingest_keeps_text() {
        let mut app = loaded_app("abc");
        app.open(PathBuf::from("other.pdf"));
        app.on_event(AppEvent::Ingest(IngestEvent::Finished(Err(
            IngestError::NoTextFound,
        ))));

        assert_eq!(app.engine.snapshot().reference_text, "abc");
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut app = loaded_app("abc");
        assert_eq!(app.on_event(key(KeyCode::Esc)), Control::Quit);
        assert_eq!(app.on_event(ctrl('c')), Control::Quit);
    }

    #[test]
    fn test_typing_ignored_after_completion() {
        let mut app = loaded_app("ab");
        app.on_event(key(KeyCode::Char('a')));
        app.on_event(key(KeyCode::Char('b')));
        app.on_event(key(KeyCode::Enter));

        app.on_event(key(KeyCode::Backspace));
        assert_eq!(app.engine.snapshot().typed_text, "ab");
        assert_eq!(app.engine.snapshot().phase, Phase::Completed);
    }
}
