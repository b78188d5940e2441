use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::clock::ClockId;
use crate::ingest::IngestEvent;

/// How often the UI wakes up when nothing happens
pub const FRAME_RATE_MS: u64 = 100;

/// Unified event type consumed by the app runner
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One second elapsed on the clock identified by the id
    Tick(ClockId),
    Ingest(IngestEvent),
}

/// Source of application events
pub trait AppEventSource: 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Event source backed by the shared app channel.
///
/// Key reader, clock and ingestion threads all write into the same sender,
/// so events come out in delivery order.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// Fresh channel plus the sender producers should clone
    pub fn channel() -> (Sender<AppEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl AppEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forward crossterm key and resize events into the app channel
pub fn spawn_terminal_reader(tx: Sender<AppEvent>) {
    std::thread::spawn(move || loop {
        let sent = match event::read() {
            Ok(CtEvent::Key(key)) => tx.send(AppEvent::Key(key)),
            Ok(CtEvent::Resize(_, _)) => tx.send(AppEvent::Resize),
            Ok(_) => Ok(()),
            Err(_) => break,
        };
        if sent.is_err() {
            break;
        }
    });
}

/// Configurable ticker interface
pub trait Ticker: 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(FRAME_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to one frame interval; None means the frame passed without events
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_none_on_timeout() {
        let (_tx, es) = ChannelEventSource::channel();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        assert!(runner.step().is_none());
    }

    #[test]
    fn step_passes_through_events_in_order() {
        let (tx, es) = ChannelEventSource::channel();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Tick(ClockId(7))).unwrap();
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

        match runner.step() {
            Some(AppEvent::Resize) => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
        match runner.step() {
            Some(AppEvent::Tick(ClockId(7))) => {}
            other => panic!("expected Tick event, got {other:?}"),
        }
    }

    #[test]
    fn default_ticker_uses_frame_rate() {
        assert_eq!(
            FixedTicker::default().interval(),
            Duration::from_millis(FRAME_RATE_MS)
        );
    }
}
