use derive_more::Display;
use serde::Serialize;

/// Geodetic position as reported by the tracker
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display, Serialize)]
#[display(
    fmt = "{{{}, {}, {}}}",
    "latitude",
    "longitude",
    "altitude"
)]
pub struct Lla {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude, in whatever unit the tracker reports (usually km)
    pub altitude: f64,
}

impl Lla {
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Returns a copy with latitude and longitude converted from radians to degrees
    pub fn to_degrees(self) -> Self {
        Self {
            latitude: self.latitude.to_degrees(),
            longitude: self.longitude.to_degrees(),
            altitude: self.altitude,
        }
    }

    /// Longitude wrapped into [-180, 180) degrees
    pub fn wrapped_longitude(&self) -> f64 {
        let lon = (self.longitude + 180.0).rem_euclid(360.0) - 180.0;
        // rem_euclid can land exactly on 360.0 for tiny negative inputs
        if lon >= 180.0 {
            lon - 360.0
        } else {
            lon
        }
    }

    /// Latitude clamped into [-90, 90] degrees
    pub fn clamped_latitude(&self) -> f64 {
        self.latitude.clamp(-90.0, 90.0)
    }
}

impl From<na::Vector3<f64>> for Lla {
    fn from(v: na::Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Lla> for na::Vector3<f64> {
    fn from(v: Lla) -> Self {
        na::Vector3::new(v.latitude, v.longitude, v.altitude)
    }
}
