//! Typing session engine: the session state machine plus everything it owns
//! exclusively (the running clock, the in-flight ingestion flag and the
//! state of the UI boundary).

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::clock::{Clock, ClockId};
use crate::error::{IngestError, Notice};
use crate::ingest::{check_file_type, PageProgress};
use crate::session::{InputOutcome, Phase, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    /// Extraction in flight, with the last reported page if any
    Loading(Option<PageProgress>),
}

/// Read-only view handed to the rendering layer on every update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<'a> {
    pub reference_text: &'a str,
    pub typed_text: &'a str,
    pub typed_len: usize,
    pub error_count: usize,
    pub wpm: u32,
    pub elapsed_seconds: u64,
    pub phase: Phase,
    pub status: Status,
    pub typing_enabled: bool,
    pub file_input_enabled: bool,
    pub selected_file: Option<&'a Path>,
}

pub struct Engine<C: Clock> {
    session: Session,
    clock: C,
    active_clock: Option<ClockId>,
    status: Status,
    selected_file: Option<PathBuf>,
    notice: Option<Notice>,
}

impl<C: Clock> Engine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            session: Session::new(),
            clock,
            active_clock: None,
            status: Status::Ready,
            selected_file: None,
            notice: None,
        }
    }

    /// Accept a file from the selection boundary.
    ///
    /// Returns true when the caller should start extracting it. Submissions
    /// while another extraction is in flight are refused, and files of the
    /// wrong type are turned into a notice without touching the session.
    pub fn begin_ingest(&mut self, path: PathBuf) -> bool {
        if !self.file_input_enabled() {
            debug!("ignoring {} while loading", path.display());
            return false;
        }

        if let Err(e) = check_file_type(&path) {
            info!("rejected {}: {e}", path.display());
            self.notice = Some(Notice::from(&e));
            return false;
        }

        info!("ingesting {}", path.display());
        self.status = Status::Loading(None);
        self.selected_file = Some(path);
        true
    }

    pub fn ingest_progress(&mut self, progress: PageProgress) {
        if let Status::Loading(_) = self.status {
            self.status = Status::Loading(Some(progress));
        }
    }

    /// Apply the outcome of an extraction. On failure the session keeps its prior state.
    pub fn finish_ingest(&mut self, result: Result<String, IngestError>) -> bool {
        self.status = Status::Ready;

        match result {
            Ok(text) => {
                self.stop_clock();
                info!("loaded {} characters of practice text", text.chars().count());
                self.session.load(text);
                self.notice = Some(Notice::text_ready());
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from(&e));
                false
            }
        }
    }

    /// Replace the whole typed buffer; see [`Session::submit_input`]
    pub fn submit_input(&mut self, typed: &str) -> InputOutcome {
        if self.is_loading() {
            return InputOutcome::Ignored;
        }

        let outcome = self.session.submit_input(typed);
        match outcome {
            InputOutcome::Started => self.start_clock(),
            InputOutcome::Completed(report) => {
                self.stop_clock();
                info!(
                    "session complete: {} wpm, {} errors, {}s",
                    report.wpm, report.error_count, report.elapsed_seconds
                );
                self.notice = Some(Notice::completed(&report));
            }
            InputOutcome::Ignored | InputOutcome::Rejected | InputOutcome::Progressed => {}
        }
        outcome
    }

    pub fn type_char(&mut self, c: char) -> InputOutcome {
        let mut next = String::with_capacity(self.session.typed_text().len() + c.len_utf8());
        next.push_str(self.session.typed_text());
        next.push(c);
        self.submit_input(&next)
    }

    pub fn backspace(&mut self) -> InputOutcome {
        let mut next = self.session.typed_text().to_string();
        if next.pop().is_none() {
            return InputOutcome::Ignored;
        }
        self.submit_input(&next)
    }

    /// Tick from the clock identified by `id`; ticks of a stopped clock are dropped
    pub fn on_tick(&mut self, id: ClockId) -> bool {
        if self.active_clock != Some(id) {
            debug!("dropping stale tick from {id:?}");
            return false;
        }
        self.session.tick()
    }

    /// Stop the clock and return to an empty idle session.
    ///
    /// An in-flight extraction keeps its file; its outcome is still applied.
    pub fn reset(&mut self) {
        self.stop_clock();
        self.session.reset();
        if !self.is_loading() {
            self.selected_file = None;
        }
        debug!("session reset");
    }

    fn start_clock(&mut self) {
        if self.active_clock.is_none() {
            let id = self.clock.start();
            debug!("clock {id:?} started");
            self.active_clock = Some(id);
        }
    }

    fn stop_clock(&mut self) {
        if let Some(id) = self.active_clock.take() {
            self.clock.stop(id);
            debug!("clock {id:?} stopped");
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading(_))
    }

    pub fn file_input_enabled(&self) -> bool {
        !self.is_loading()
    }

    pub fn typing_enabled(&self) -> bool {
        self.session.has_text() && !self.is_loading() && self.session.phase() != Phase::Completed
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn active_clock(&self) -> Option<ClockId> {
        self.active_clock
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            reference_text: self.session.reference_text(),
            typed_text: self.session.typed_text(),
            typed_len: self.session.typed_len(),
            error_count: self.session.error_count(),
            wpm: self.session.wpm(),
            elapsed_seconds: self.session.elapsed_seconds(),
            phase: self.session.phase(),
            status: self.status,
            typing_enabled: self.typing_enabled(),
            file_input_enabled: self.file_input_enabled(),
            selected_file: self.selected_file.as_deref(),
        }
    }
}
