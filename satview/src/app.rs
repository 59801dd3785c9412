use crate::{config::Config, map::AngleUnit, refresh::RefreshOutcome};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt::Write;
use tracing::{info, warn};
use tracktypes::prelude::*;

/// Viewer state shared by the render loop and the refresh handling
#[derive(Clone, Debug)]
pub struct AppState {
    catalog: Catalog,
    selected: Option<SatelliteName>,
    selection_pattern: Option<Regex>,

    /// `listAll` followed by the configured categories
    modes: Vec<TrackerMode>,
    mode_idx: usize,
    periodic_mode: Option<TrackerMode>,

    pub angle_unit: AngleUnit,
    pub show_trajectory: bool,

    refresh_count: u64,
    last_refresh: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            catalog: Catalog::new(),
            selected: None,
            selection_pattern: None,
            modes: vec![TrackerMode::ListAll],
            mode_idx: 0,
            periodic_mode: None,
            angle_unit: AngleUnit::default(),
            show_trajectory: true,
            refresh_count: 0,
            last_refresh: None,
            last_error: None,
        }
    }
}

impl AppState {
    pub fn new(categories: &[String]) -> Self {
        let mut modes = vec![TrackerMode::ListAll];
        modes.extend(categories.iter().map(|c| TrackerMode::Category(c.clone())));
        Self {
            modes,
            ..Default::default()
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, regex::Error> {
        let mut app = Self::new(&cfg.categories);
        app.set_mode(cfg.refresh.mode.clone());
        app.periodic_mode = cfg.refresh.periodic_mode.clone();
        app.selected = cfg.satellite.clone();
        app.selection_pattern = cfg.selection_regex()?;
        app.angle_unit = cfg.map.angle_unit;
        app.show_trajectory = cfg.map.show_trajectory;
        Ok(app)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The listing mode, i.e. `listAll` or the selected category
    pub fn mode(&self) -> &TrackerMode {
        &self.modes[self.mode_idx]
    }

    /// The mode used by the periodic refresh
    pub fn periodic_mode(&self) -> &TrackerMode {
        self.periodic_mode.as_ref().unwrap_or_else(|| self.mode())
    }

    /// Select a listing mode, appending unknown categories to the cycle.
    /// `update` is not a listing mode and is ignored.
    pub fn set_mode(&mut self, mode: TrackerMode) {
        if !mode.replaces_catalog() {
            warn!(%mode, "Not a listing mode");
            return;
        }
        self.mode_idx = match self.modes.iter().position(|m| *m == mode) {
            Some(idx) => idx,
            None => {
                self.modes.push(mode);
                self.modes.len() - 1
            }
        };
    }

    /// Cycle to the next listing mode and return it
    pub fn next_category(&mut self) -> TrackerMode {
        self.mode_idx = (self.mode_idx + 1) % self.modes.len();
        self.mode().clone()
    }

    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply a finished refresh. Listings replace the catalog, updates merge into it.
    pub fn apply(&mut self, outcome: RefreshOutcome) {
        let RefreshOutcome {
            mode,
            catalog,
            finished_at,
            error,
            ..
        } = outcome;

        if mode.replaces_catalog() {
            self.catalog.replace(catalog);
        } else {
            self.catalog.merge(catalog);
        }

        self.refresh_count += 1;
        self.last_refresh = Some(finished_at);
        self.last_error = error;

        if self.selected.is_none() {
            self.select_initial();
        }
    }

    fn select_initial(&mut self) {
        let name = match &self.selection_pattern {
            Some(re) => self.catalog.names().find(|n| re.is_match(n)),
            None => self.catalog.names().next(),
        };
        if let Some(name) = name {
            info!(satellite = name, "Selected satellite");
            self.selected = Some(name.to_owned());
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The record of the selected satellite, if the last refresh reported it
    pub fn selected_record(&self) -> Option<&SatelliteRecord> {
        self.selected.as_deref().and_then(|n| self.catalog.get(n))
    }

    /// Select a satellite by name. The name is kept even when the current
    /// catalog doesn't know it, a later refresh may.
    pub fn select<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        if !self.catalog.contains(&name) {
            warn!(satellite = %name, "Selected satellite is not in the current listing");
        }
        self.selected = Some(name);
    }

    /// Select the first satellite whose name matches `re`
    pub fn select_matching(&mut self, re: &Regex) -> Option<&str> {
        let name = self.catalog.names().find(|n| re.is_match(n))?.to_owned();
        self.selected = Some(name);
        self.selected()
    }

    pub fn select_next(&mut self) -> Option<&str> {
        self.step_selection(1)
    }

    pub fn select_prev(&mut self) -> Option<&str> {
        self.step_selection(-1)
    }

    fn step_selection(&mut self, step: isize) -> Option<&str> {
        let names: Vec<&str> = self.catalog.names().collect();
        if names.is_empty() {
            return self.selected();
        }

        let n = names.len() as isize;
        let idx = match self
            .selected
            .as_deref()
            .and_then(|s| names.iter().position(|name| *name == s))
        {
            Some(idx) => (idx as isize + step).rem_euclid(n) as usize,
            None => 0,
        };
        self.selected = Some(names[idx].to_owned());
        self.selected()
    }

    /// Human readable summary of the selected satellite, one entry per line
    pub fn info_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let name = match self.selected() {
            Some(n) => n,
            None => {
                lines.push("No satellite selected".to_owned());
                return lines;
            }
        };

        let rec = match self.selected_record() {
            Some(r) => r,
            None => {
                lines.push(format!("{name}: no data"));
                return lines;
            }
        };

        lines.push(name.to_owned());
        if let Some(v) = rec.eci {
            lines.push(format!("ECI: {{{:.3}, {:.3}, {:.3}}}", v.x, v.y, v.z));
        }
        if let Some(v) = rec.ecef {
            lines.push(format!("ECEF: {{{:.3}, {:.3}, {:.3}}}", v.x, v.y, v.z));
        }
        if let Some(lla) = rec.lla {
            let lla = self.angle_unit.to_degrees(lla);
            lines.push(format!(
                "LLA: {:.4} deg, {:.4} deg, {:.3}",
                lla.latitude, lla.longitude, lla.altitude
            ));
        }
        if !rec.trajectory.is_empty() {
            lines.push(format!("Trajectory: {} points", rec.trajectory.len()));
        }
        if let Some(d) = rec.distance_to_ground {
            lines.push(format!("Distance to the ground: {d:.3}"));
        }
        if let Some(d) = rec.distance_to_station {
            lines.push(format!("Distance to MIEM: {d:.3}"));
        }
        lines
    }

    /// One line describing the mode and the last refresh
    pub fn status_line(&self) -> String {
        let mut s = String::with_capacity(128);
        let _ = write!(
            &mut s,
            "Mode: {} | {} satellites",
            self.mode(),
            self.catalog.len()
        );
        match self.last_refresh {
            Some(t) => {
                let _ = write!(&mut s, " | refreshed {}", t.format("%H:%M:%S UTC"));
            }
            None => s.push_str(" | waiting for tracker"),
        }
        if let Some(e) = &self.last_error {
            let _ = write!(&mut s, " | error: {e}");
        }
        s
    }
}
