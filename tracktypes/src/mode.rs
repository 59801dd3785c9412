use std::{fmt, str::FromStr};

pub const LIST_ALL_ARG: &str = "listAll";
pub const UPDATE_ARG: &str = "update";

/// The single mode argument the tracker executable is invoked with
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum TrackerMode {
    /// Every satellite the tracker knows about
    #[default]
    ListAll,
    /// Satellites of a single named category
    Category(String),
    /// Re-propagate the satellites from the last listing
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerModeError {
    #[error("Tracker mode argument cannot be empty")]
    Empty,
}

impl TrackerMode {
    /// The command-line argument passed to the tracker
    pub fn as_arg(&self) -> &str {
        match self {
            TrackerMode::ListAll => LIST_ALL_ARG,
            TrackerMode::Category(c) => c.as_str(),
            TrackerMode::Update => UPDATE_ARG,
        }
    }

    /// Whether the output of this mode replaces the catalog (true) or is
    /// merged into it (false)
    pub fn replaces_catalog(&self) -> bool {
        !matches!(self, TrackerMode::Update)
    }
}

impl FromStr for TrackerMode {
    type Err = TrackerModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            "" => return Err(TrackerModeError::Empty),
            LIST_ALL_ARG => TrackerMode::ListAll,
            UPDATE_ARG => TrackerMode::Update,
            category => TrackerMode::Category(category.to_owned()),
        })
    }
}

impl fmt::Display for TrackerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}
