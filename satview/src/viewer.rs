//! The viewer's refresh cycle, independent of the window.
//!
//! Each pass of the main loop hands the finished refresh (if any) to
//! [`Viewer::step`], which applies it, re-arms the timer and starts the
//! periodic refresh once the timer is due.

use crate::{
    app::AppState,
    config::Config,
    refresh::{RefreshOutcome, RefreshTimer, Refresher},
    tracker::Tracker,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};
use tracktypes::prelude::TrackerMode;

/// Requests from the keyboard that the viewer acts upon
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UserCommand {
    NextSatellite,
    PrevSatellite,
    NextCategory,
    Update,
    RefreshNow,
    ToggleTrajectory,
}

#[derive(Debug)]
pub struct Viewer {
    app: AppState,
    refresher: Refresher,
    timer: RefreshTimer,
    once: bool,
}

impl Viewer {
    pub fn new(cfg: &Config) -> Result<Self, regex::Error> {
        Ok(Self {
            app: AppState::from_config(cfg)?,
            refresher: Refresher::new(Tracker::from_config(&cfg.tracker)),
            timer: RefreshTimer::new(cfg.refresh.interval),
            once: cfg.refresh.once,
        })
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn refresher(&self) -> &Refresher {
        &self.refresher
    }

    pub fn timer(&self) -> &RefreshTimer {
        &self.timer
    }

    /// Request the first listing
    pub fn start(&mut self) -> io::Result<()> {
        self.refresher.request(self.app.mode().clone())?;
        Ok(())
    }

    pub fn poll(&mut self) -> Option<RefreshOutcome> {
        self.refresher.poll()
    }

    /// Wait for the running refresh, or just sleep for `timeout` when idle
    pub fn wait(&mut self, timeout: Duration) -> Option<RefreshOutcome> {
        if self.refresher.is_busy() {
            self.refresher.wait(timeout)
        } else {
            std::thread::sleep(timeout);
            None
        }
    }

    /// Apply a finished refresh and drive the timer.
    /// Returns true when an outcome was applied.
    pub fn step(&mut self, outcome: Option<RefreshOutcome>, now: Instant) -> io::Result<bool> {
        let applied = outcome.is_some();
        if let Some(outcome) = outcome {
            log_outcome(&outcome);
            self.app.apply(outcome);
            if !self.once {
                // Successful or not
                self.timer.arm(now);
            }
        }

        if self.timer.is_due(now) && !self.refresher.is_busy() {
            self.timer.disarm();
            self.refresher.request(self.app.periodic_mode().clone())?;
        }

        Ok(applied)
    }

    /// A single-shot viewer is done once its listing arrived
    pub fn is_done(&self) -> bool {
        self.once && self.app.refresh_count() > 0 && !self.refresher.is_busy()
    }

    pub fn handle_command(&mut self, cmd: UserCommand) -> io::Result<()> {
        debug!(?cmd, "User command");
        match cmd {
            UserCommand::NextSatellite => {
                self.app.select_next();
            }
            UserCommand::PrevSatellite => {
                self.app.select_prev();
            }
            UserCommand::NextCategory => {
                let mode = self.app.next_category();
                info!(%mode, "Switched category");
                self.refresher.request(mode)?;
            }
            UserCommand::Update => {
                self.refresher.request(TrackerMode::Update)?;
            }
            UserCommand::RefreshNow => {
                self.refresher.request(self.app.mode().clone())?;
            }
            UserCommand::ToggleTrajectory => {
                self.app.show_trajectory = !self.app.show_trajectory;
            }
        }
        Ok(())
    }
}

fn log_outcome(outcome: &RefreshOutcome) {
    if outcome.is_success() {
        info!(
            mode = %outcome.mode,
            satellites = outcome.catalog.len(),
            lines = outcome.line_count,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Refresh complete"
        );
    } else {
        warn!(mode = %outcome.mode, "Refresh failed, nothing to show");
    }
}
