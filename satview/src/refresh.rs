//! Background tracker refreshes.
//!
//! Each refresh runs the tracker and parses its output on a dedicated thread,
//! the outcome is handed back to the render loop over a channel. At most one
//! refresh runs at a time, requests made meanwhile are coalesced.

use crate::tracker::Tracker;
use chrono::{DateTime, Utc};
use std::{
    io,
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, error};
use trackproto::read_listing;
use tracktypes::prelude::*;

pub const REFRESH_THREAD_NAME: &str = "tracker-refresh";

#[derive(Clone, Debug, PartialEq)]
pub struct RefreshOutcome {
    pub mode: TrackerMode,
    pub catalog: Catalog,
    /// Number of stdout lines the tracker produced
    pub line_count: usize,
    /// Set when the tracker could not be run or failed
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
pub struct Refresher {
    tracker: Arc<Tracker>,
    tx: Sender<RefreshOutcome>,
    rx: Receiver<RefreshOutcome>,
    in_flight: Option<TrackerMode>,
    pending: Option<TrackerMode>,
}

impl Refresher {
    pub fn new(tracker: Tracker) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tracker: Arc::new(tracker),
            tx,
            rx,
            in_flight: None,
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&TrackerMode> {
        self.in_flight.as_ref()
    }

    pub fn pending(&self) -> Option<&TrackerMode> {
        self.pending.as_ref()
    }

    /// Start a refresh, or queue it if one is already running.
    ///
    /// Returns true when the refresh started right away. Only one request
    /// is queued: a later request replaces it, except that an `update`
    /// never displaces a queued full listing.
    pub fn request(&mut self, mode: TrackerMode) -> io::Result<bool> {
        if self.in_flight.is_none() {
            self.spawn(mode)?;
            return Ok(true);
        }

        let keep_queued = matches!(&self.pending, Some(p) if p.replaces_catalog())
            && !mode.replaces_catalog();
        if !keep_queued {
            debug!(%mode, "Refresh already running, queueing request");
            self.pending = Some(mode);
        }
        Ok(false)
    }

    /// Non-blocking check for a finished refresh
    pub fn poll(&mut self) -> Option<RefreshOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(self.finish(outcome)),
            // We hold a sender ourselves, so never disconnected
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until a refresh finishes or the timeout elapses
    pub fn wait(&mut self, timeout: Duration) -> Option<RefreshOutcome> {
        if !self.is_busy() {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(self.finish(outcome)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Start the queued request, if any. The finished outcome is always
    /// handed back, a queued request that can't be started is dropped.
    fn finish(&mut self, outcome: RefreshOutcome) -> RefreshOutcome {
        self.in_flight = None;
        if let Some(mode) = self.pending.take() {
            if let Err(e) = self.spawn(mode.clone()) {
                error!(%mode, error = %e, "Failed to start queued refresh");
            }
        }
        outcome
    }

    fn spawn(&mut self, mode: TrackerMode) -> io::Result<()> {
        let tracker = Arc::clone(&self.tracker);
        let tx = self.tx.clone();
        let worker_mode = mode.clone();

        thread::Builder::new()
            .name(REFRESH_THREAD_NAME.to_owned())
            .spawn(move || {
                let outcome = run_refresh(&tracker, worker_mode);
                // The receiver only goes away when the viewer is shutting down
                let _ = tx.send(outcome);
            })?;

        debug!(%mode, "Started refresh");
        self.in_flight = Some(mode);
        Ok(())
    }
}

/// Run the tracker once and parse its output, on the calling thread
pub fn run_refresh(tracker: &Tracker, mode: TrackerMode) -> RefreshOutcome {
    let t0 = Instant::now();
    let (lines, error) = match tracker.invoke(&mode) {
        Ok(lines) => (lines, None),
        Err(e) => {
            error!(%mode, error = %e, "Tracker invocation failed");
            (Vec::new(), Some(e.to_string()))
        }
    };
    let catalog = read_listing(&lines);

    RefreshOutcome {
        mode,
        catalog,
        line_count: lines.len(),
        error,
        finished_at: Utc::now(),
        elapsed: t0.elapsed(),
    }
}

/// Fixed-delay timer, armed after each refresh completes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RefreshTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RefreshTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.next_due, Some(t) if now >= t)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|t| t.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn timer() {
        let t0 = Instant::now();
        let mut timer = RefreshTimer::new(Duration::from_secs(5));
        assert!(!timer.is_armed());
        assert!(!timer.is_due(t0));
        assert_eq!(timer.remaining(t0), None);

        timer.arm(t0);
        assert!(!timer.is_due(t0 + Duration::from_secs(4)));
        assert!(timer.is_due(t0 + Duration::from_secs(5)));
        assert_eq!(
            timer.remaining(t0 + Duration::from_secs(2)),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            timer.remaining(t0 + Duration::from_secs(9)),
            Some(Duration::ZERO)
        );

        timer.disarm();
        assert!(!timer.is_due(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn failed_refresh_yields_empty_catalog() {
        let outcome = run_refresh(
            &Tracker::new("./this-tracker-does-not-exist"),
            TrackerMode::ListAll,
        );
        assert!(!outcome.is_success());
        assert!(outcome.catalog.is_empty());
        assert_eq!(outcome.line_count, 0);
        assert_eq!(outcome.mode, TrackerMode::ListAll);
    }

    #[cfg(unix)]
    fn fake_tracker(script: &str) -> Tracker {
        Tracker::new("sh").with_leading_args(["-c", script, "tracker"])
    }

    #[cfg(unix)]
    #[test]
    fn background_refresh() {
        let mut r = Refresher::new(fake_tracker(
            r#"printf 'Name: %s\nDistance to MIEM: 42 km\n' "$1""#,
        ));
        assert!(!r.is_busy());
        assert!(r.request(TrackerMode::Category("GPS".to_owned())).unwrap());
        assert!(r.is_busy());

        let outcome = r.wait(TIMEOUT).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.mode, TrackerMode::Category("GPS".to_owned()));
        assert_eq!(outcome.line_count, 3);
        assert_eq!(
            outcome.catalog.get("GPS").unwrap().distance_to_station,
            Some(42.0)
        );
        assert!(!r.is_busy());
        assert_eq!(r.poll(), None);
    }

    #[cfg(unix)]
    #[test]
    fn requests_are_coalesced() {
        let mut r = Refresher::new(fake_tracker(r#"sleep 0.2; echo "Name: $1""#));
        assert!(r.request(TrackerMode::ListAll).unwrap());
        assert!(!r.request(TrackerMode::Update).unwrap());
        assert!(!r.request(TrackerMode::Category("GPS".to_owned())).unwrap());
        // An update doesn't displace a queued listing
        assert!(!r.request(TrackerMode::Update).unwrap());
        assert_eq!(r.pending(), Some(&TrackerMode::Category("GPS".to_owned())));

        let first = r.wait(TIMEOUT).unwrap();
        assert_eq!(first.mode, TrackerMode::ListAll);
        assert!(first.catalog.contains("listAll"));

        // The queued request starts as soon as the first one is collected
        assert_eq!(r.in_flight(), Some(&TrackerMode::Category("GPS".to_owned())));
        assert_eq!(r.pending(), None);

        let second = r.wait(TIMEOUT).unwrap();
        assert_eq!(second.mode, TrackerMode::Category("GPS".to_owned()));
        assert!(second.catalog.contains("GPS"));
        assert!(r.wait(TIMEOUT).is_none());
    }
}
