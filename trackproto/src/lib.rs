extern crate nalgebra as na;

pub use crate::parser::{parse_line, parse_listing, read_listing, LineKey, ListingLine, ParseError};
pub use tracktypes::prelude::*;

pub mod parser;

pub const NAME_TOKEN: &str = "Name:";
pub const ECI_TOKEN: &str = "Position in  ECI";
pub const ECEF_TOKEN: &str = "Position in ECEF";
pub const LLA_TOKEN: &str = "Position in LLA";
pub const TRAJECTORY_TOKEN: &str = "Trajectory in LLA";
pub const GROUND_DISTANCE_TOKEN: &str = "Distance to the ground";
pub const STATION_DISTANCE_TOKEN: &str = "Distance to MIEM";
pub const KEY_VALUE_DELIMITER: char = ':';
pub const LINE_DELIMITER: char = '\n';
