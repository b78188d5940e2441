use crate::util::{count_mismatches, words_per_minute};

/// Coarse lifecycle stage of a practice attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Final numbers handed out when the last character is typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionReport {
    pub wpm: u32,
    pub error_count: usize,
    pub elapsed_seconds: u64,
}

/// What a call to [`Session::submit_input`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// No text loaded, or the session already completed
    Ignored,
    /// Longer than the reference text; nothing changed
    Rejected,
    /// First keystroke of the attempt; the clock must start
    Started,
    Progressed,
    /// Last character typed; the clock must stop
    Completed(CompletionReport),
}

/// The complete mutable state of one typing-practice attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    reference_text: String,
    reference_len: usize,
    typed_text: String,
    typed_len: usize,
    elapsed_seconds: u64,
    error_count: usize,
    wpm: u32,
    phase: Phase,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was going on with a fresh, idle attempt over `text`
    pub fn load(&mut self, text: String) {
        *self = Self {
            reference_len: text.chars().count(),
            reference_text: text,
            ..Self::default()
        };
    }

    /// The single mutation path for typed input.
    ///
    /// `typed` is the learner's whole input buffer, not a delta.
    pub fn submit_input(&mut self, typed: &str) -> InputOutcome {
        if self.reference_len == 0 || self.phase == Phase::Completed {
            return InputOutcome::Ignored;
        }

        let typed_len = typed.chars().count();
        if typed_len > self.reference_len {
            return InputOutcome::Rejected;
        }

        let started = self.phase == Phase::Idle && typed_len > 0;
        if started {
            self.phase = Phase::Running;
        }

        if self.typed_text != typed {
            self.typed_text.clear();
            self.typed_text.push_str(typed);
            self.typed_len = typed_len;
        }
        self.error_count = count_mismatches(&self.reference_text, &self.typed_text);

        if typed_len == self.reference_len {
            self.phase = Phase::Completed;
            self.wpm = words_per_minute(self.reference_len, self.elapsed_seconds);
            return InputOutcome::Completed(self.report());
        }

        self.refresh_live_wpm();

        if started {
            InputOutcome::Started
        } else {
            InputOutcome::Progressed
        }
    }

    /// Advance the clock by one second. Returns false when not running.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        self.elapsed_seconds += 1;
        self.refresh_live_wpm();
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn refresh_live_wpm(&mut self) {
        if self.phase == Phase::Running && self.elapsed_seconds > 0 {
            self.wpm = words_per_minute(self.typed_len, self.elapsed_seconds);
        }
    }

    pub fn report(&self) -> CompletionReport {
        CompletionReport {
            wpm: self.wpm,
            error_count: self.error_count,
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    pub fn reference_len(&self) -> usize {
        self.reference_len
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn typed_len(&self) -> usize {
        self.typed_len
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_text(&self) -> bool {
        self.reference_len > 0
    }
}
