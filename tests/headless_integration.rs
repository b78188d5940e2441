use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use folio::app::{App, Control};
use folio::clock::{ManualClock, ThreadClock};
use folio::config::Config;
use folio::error::ExtractError;
use folio::ingest::{self, ExtractedDocument, TextExtractor};
use folio::runtime::{AppEvent, ChannelEventSource, FixedTicker, Runner};
use folio::session::Phase;

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn enter() -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

struct StaticPages(Vec<&'static str>);

impl TextExtractor for StaticPages {
    fn extract(&self, _bytes: Vec<u8>) -> Result<ExtractedDocument, ExtractError> {
        let pages: Vec<Result<String, ExtractError>> =
            self.0.iter().map(|p| Ok(p.to_string())).collect();
        Ok(ExtractedDocument {
            page_count: pages.len(),
            pages: Box::new(pages.into_iter()),
        })
    }
}

// Headless flow: load a document through the worker thread, type it with a
// real ticking clock, and make sure the clock goes quiet after completion.
#[test]
fn headless_ingest_type_and_complete() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.pdf");
    std::fs::write(&path, b"%PDF-1.4 stub").unwrap();

    let (tx, events) = ChannelEventSource::channel();
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(5)));
    let clock = ThreadClock::with_interval(tx.clone(), Duration::from_millis(10));
    let mut app = App::new(clock, Config::default());

    let control = app.open(path.clone());
    assert_eq!(control, Control::Ingest(path.clone()));
    ingest::spawn(path, Arc::new(StaticPages(vec!["hi", ""])), tx.clone());

    for _ in 0..400u32 {
        if let Some(ev) = runner.step() {
            app.on_event(ev);
        }
        if app.engine.session().has_text() {
            break;
        }
    }
    assert_eq!(app.engine.snapshot().reference_text, "hi");
    app.on_event(enter());

    tx.send(key('h')).unwrap();
    for _ in 0..400u32 {
        if let Some(ev) = runner.step() {
            app.on_event(ev);
        }
        if app.engine.snapshot().elapsed_seconds >= 2 {
            break;
        }
    }
    assert_eq!(app.engine.snapshot().phase, Phase::Running);
    assert!(app.engine.snapshot().elapsed_seconds >= 2);

    tx.send(key('i')).unwrap();
    for _ in 0..100u32 {
        if let Some(ev) = runner.step() {
            app.on_event(ev);
        }
        if app.engine.snapshot().phase == Phase::Completed {
            break;
        }
    }
    let frozen = app.engine.snapshot().elapsed_seconds;
    assert_eq!(app.engine.snapshot().phase, Phase::Completed);

    // Keep pumping: stale ticks must not move the clock
    for _ in 0..20u32 {
        if let Some(ev) = runner.step() {
            app.on_event(ev);
        }
    }
    assert_eq!(app.engine.snapshot().elapsed_seconds, frozen);
    assert_eq!(app.engine.snapshot().typed_text, "hi");
}

#[test]
fn headless_reset_drops_ticks_from_old_clock() {
    let mut app = App::new(ManualClock::new(), Config::default());
    app.open(PathBuf::from("book.pdf"));
    app.on_event(AppEvent::Ingest(folio::ingest::IngestEvent::Finished(Ok(
        "abc def".to_string(),
    ))));
    app.on_event(enter());

    app.on_event(key('a'));
    app.on_event(key('b'));
    app.on_event(key('d'));
    assert_eq!(app.engine.snapshot().error_count, 1);

    let id = app.engine.active_clock().unwrap();
    app.on_event(AppEvent::Tick(id));
    app.on_event(AppEvent::Tick(id));
    assert_eq!(app.engine.snapshot().elapsed_seconds, 2);

    app.on_event(AppEvent::Key(KeyEvent::new(
        KeyCode::Char('r'),
        KeyModifiers::CONTROL,
    )));
    app.on_event(AppEvent::Tick(id));

    let snap = app.engine.snapshot();
    assert_eq!(snap.phase, Phase::Idle);
    assert_eq!(snap.elapsed_seconds, 0);
    assert_eq!(snap.reference_text, "");
    assert_eq!(app.engine.clock().starts, 1);
    assert_eq!(app.engine.clock().stops, 1);
}

#[test]
fn headless_wrong_file_type_never_loads() {
    let mut app = App::new(ManualClock::new(), Config::default());

    assert_eq!(app.open(PathBuf::from("chapter.epub")), Control::Continue);

    assert!(!app.engine.is_loading());
    assert_eq!(
        app.engine.notice().map(|n| n.title.clone()),
        Some("Invalid File".to_string())
    );
    assert_eq!(app.engine.snapshot().phase, Phase::Idle);
}

struct Crashing;

impl TextExtractor for Crashing {
    fn extract(&self, _bytes: Vec<u8>) -> Result<ExtractedDocument, ExtractError> {
        panic!("malformed object stream");
    }
}

// A panicking extractor still ends the Loading state and re-enables file input.
#[test]
fn headless_extractor_panic_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"%PDF-1.4 stub").unwrap();

    let (tx, events) = ChannelEventSource::channel();
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(5)));
    let mut app = App::new(ManualClock::new(), Config::default());

    app.open(path.clone());
    ingest::spawn(path, Arc::new(Crashing), tx).join().unwrap();

    for _ in 0..100u32 {
        if let Some(ev) = runner.step() {
            app.on_event(ev);
        }
        if !app.engine.is_loading() {
            break;
        }
    }

    assert!(!app.engine.is_loading());
    assert!(app.engine.file_input_enabled());
    assert_eq!(
        app.engine.notice().map(|n| n.title.as_str()),
        Some("PDF Error")
    );
    assert!(!app.engine.session().has_text());
}
