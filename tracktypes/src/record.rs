use crate::lla::Lla;
use derive_more::Display;
use serde::Serialize;

/// Everything the tracker reported about a single satellite.
///
/// Every field is optional, the tracker only prints what it computed.
#[derive(Clone, PartialEq, Debug, Default, Display, Serialize)]
#[display(fmt = "{{name: {}, lla: {:?}, ...}}", "name", "lla")]
pub struct SatelliteRecord {
    pub name: String,

    /// Position in the Earth-Centered Inertial frame
    pub eci: Option<na::Vector3<f64>>,
    /// Position in the Earth-Centered Earth-Fixed frame
    pub ecef: Option<na::Vector3<f64>>,
    /// Current geodetic position
    pub lla: Option<Lla>,
    /// Predicted ground track, oldest point first. Empty when not reported.
    pub trajectory: Vec<Lla>,

    /// Distance from the satellite to the ground
    pub distance_to_ground: Option<f64>,
    /// Distance from the satellite to the MIEM ground station
    pub distance_to_station: Option<f64>,
}

impl SatelliteRecord {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// True when the record has nothing but a name
    pub fn is_empty(&self) -> bool {
        self.eci.is_none()
            && self.ecef.is_none()
            && self.lla.is_none()
            && self.trajectory.is_empty()
            && self.distance_to_ground.is_none()
            && self.distance_to_station.is_none()
    }

    /// Overwrite the fields that `other` carries, keep the rest
    pub fn merge(&mut self, other: SatelliteRecord) {
        if other.eci.is_some() {
            self.eci = other.eci;
        }
        if other.ecef.is_some() {
            self.ecef = other.ecef;
        }
        if other.lla.is_some() {
            self.lla = other.lla;
        }
        if !other.trajectory.is_empty() {
            self.trajectory = other.trajectory;
        }
        if other.distance_to_ground.is_some() {
            self.distance_to_ground = other.distance_to_ground;
        }
        if other.distance_to_station.is_some() {
            self.distance_to_station = other.distance_to_station;
        }
    }
}
