use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::runtime::AppEvent;

/// Seconds are the unit of the session clock
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Identifies one start/stop cycle of a clock; ticks carry it so stale ones can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockId(pub u64);

/// Periodic tick capability consumed by the engine
pub trait Clock {
    /// Begin ticking. Every tick produced until `stop` carries the returned id.
    fn start(&mut self) -> ClockId;
    fn stop(&mut self, id: ClockId);
}

/// Production clock: a thread per running cycle feeding the app event channel
pub struct ThreadClock {
    tx: Sender<AppEvent>,
    interval: Duration,
    next_id: u64,
    running: Option<(ClockId, Arc<AtomicBool>)>,
}

impl ThreadClock {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self::with_interval(tx, TICK_INTERVAL)
    }

    pub fn with_interval(tx: Sender<AppEvent>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            next_id: 0,
            running: None,
        }
    }

    fn halt_current(&mut self) {
        if let Some((_, alive)) = self.running.take() {
            alive.store(false, Ordering::SeqCst);
        }
    }
}

impl Clock for ThreadClock {
    fn start(&mut self) -> ClockId {
        self.halt_current();

        self.next_id += 1;
        let id = ClockId(self.next_id);
        let alive = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&alive);
        let tx = self.tx.clone();
        let interval = self.interval;

        thread::spawn(move || loop {
            thread::sleep(interval);
            if !flag.load(Ordering::SeqCst) || tx.send(AppEvent::Tick(id)).is_err() {
                break;
            }
        });

        self.running = Some((id, alive));
        id
    }

    fn stop(&mut self, id: ClockId) {
        if matches!(self.running, Some((current, _)) if current == id) {
            self.halt_current();
        }
    }
}

impl Drop for ThreadClock {
    fn drop(&mut self) {
        self.halt_current();
    }
}

/// Clock driven by hand, for tests and headless use
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    active: Option<ClockId>,
    pub starts: usize,
    pub stops: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ClockId> {
        self.active
    }
}

impl Clock for ManualClock {
    fn start(&mut self) -> ClockId {
        self.next_id += 1;
        let id = ClockId(self.next_id);
        self.active = Some(id);
        self.starts += 1;
        id
    }

    fn stop(&mut self, id: ClockId) {
        if self.active == Some(id) {
            self.active = None;
            self.stops += 1;
        }
    }
}
