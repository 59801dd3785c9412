use crate::map::AngleUnit;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::{collections::HashSet, fs, io, path::Path, path::PathBuf, time::Duration};
use tracktypes::prelude::TrackerMode;

pub const DEFAULT_TRACKER_PROGRAM: &str = "./tracker";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_WINDOW_TITLE: &str = "Satellite Location Viewer";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config file")]
    Toml(#[from] toml::de::Error),
    #[error("Config contains an invalid 'matches' regex")]
    Regex(#[from] regex::Error),
    #[error("Duplicate configuration entry for category '{0}'")]
    DuplicateCategory(String),
    #[error("Category '{0}' is a reserved tracker mode")]
    ReservedCategory(String),
    #[error("Refresh mode '{0}' doesn't list satellites, use 'listAll' or a category")]
    NotAListingMode(TrackerMode),
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub tracker: Tracker,
    pub map: Map,
    pub refresh: Refresh,
    /// Categories offered for selection, in addition to `listAll`
    #[serde(alias = "category")]
    pub categories: Vec<String>,
    /// Satellite selected on startup
    pub satellite: Option<String>,
    /// Regex selecting the first matching satellite on startup
    pub matches: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Tracker {
    pub program: PathBuf,
    /// Arguments placed before the mode argument, e.g. when the tracker
    /// runs through a wrapper
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Map {
    /// Equirectangular world map image drawn behind the ground track
    pub background: Option<PathBuf>,
    /// Unit of the latitude/longitude values the tracker prints
    pub angle_unit: AngleUnit,
    pub window_title: String,
    pub show_trajectory: bool,
    pub show_graticule: bool,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Refresh {
    #[serde(deserialize_with = "de_duration")]
    pub interval: Duration,
    /// Mode of the first invocation, `listAll` or a category
    #[serde(deserialize_with = "de_mode")]
    pub mode: TrackerMode,
    /// Mode used by the periodic refresh, defaults to the selected category
    #[serde(deserialize_with = "de_opt_mode")]
    pub periodic_mode: Option<TrackerMode>,
    /// Invoke the tracker a single time, no periodic refresh
    pub once: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_str_checked(&content)
    }

    pub fn from_str_checked(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the entries serde can't, also used after command line overrides
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for name in self.categories.iter() {
            if name.parse::<TrackerMode>().ok() != Some(TrackerMode::Category(name.clone())) {
                return Err(ConfigError::ReservedCategory(name.clone()));
            }
            if !names.insert(name) {
                return Err(ConfigError::DuplicateCategory(name.clone()));
            }
        }

        if !self.refresh.mode.replaces_catalog() {
            return Err(ConfigError::NotAListingMode(self.refresh.mode.clone()));
        }

        self.selection_regex()?;

        Ok(())
    }

    pub fn selection_regex(&self) -> Result<Option<Regex>, regex::Error> {
        self.matches.as_deref().map(Regex::new).transpose()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_TRACKER_PROGRAM),
            args: Vec::new(),
            working_dir: None,
        }
    }
}

impl Default for Map {
    fn default() -> Self {
        Self {
            background: None,
            angle_unit: AngleUnit::default(),
            window_title: DEFAULT_WINDOW_TITLE.to_owned(),
            show_trajectory: true,
            show_graticule: true,
        }
    }
}

impl Default for Refresh {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            mode: TrackerMode::ListAll,
            periodic_mode: None,
            once: false,
        }
    }
}

fn de_duration<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let s = String::deserialize(d)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

fn de_mode<'de, D: Deserializer<'de>>(d: D) -> Result<TrackerMode, D::Error> {
    let s = String::deserialize(d)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn de_opt_mode<'de, D: Deserializer<'de>>(d: D) -> Result<Option<TrackerMode>, D::Error> {
    de_mode(d).map(Some)
}
