//! Equirectangular world map geometry.
//!
//! Map coordinates are centred on the map, x to the right and y up,
//! in the same units as the map size (the GUI uses pixels).

use na::Point2;
use serde::Deserialize;
use tracktypes::prelude::Lla;

/// Width over height of an equirectangular world map
pub const MAP_ASPECT_RATIO: f64 = 2.0;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    /// Returns `lla` with latitude and longitude in degrees
    pub fn to_degrees(self, lla: Lla) -> Lla {
        match self {
            AngleUnit::Degrees => lla,
            AngleUnit::Radians => lla.to_degrees(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MapProjection {
    pub width: f64,
    pub height: f64,
}

impl MapProjection {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The largest 2:1 map that fits in the given area minus a margin on every side
    pub fn fit(area_width: f64, area_height: f64, margin: f64) -> Self {
        let w = (area_width - 2.0 * margin).max(0.0);
        let h = (area_height - 2.0 * margin).max(0.0);
        if w / MAP_ASPECT_RATIO <= h {
            Self::new(w, w / MAP_ASPECT_RATIO)
        } else {
            Self::new(h * MAP_ASPECT_RATIO, h)
        }
    }

    /// Project a position given in degrees
    pub fn project(&self, lla: &Lla) -> Point2<f64> {
        self.project_lat_lon(lla.clamped_latitude(), lla.wrapped_longitude())
    }

    fn project_lat_lon(&self, lat: f64, lon: f64) -> Point2<f64> {
        Point2::new(
            lon / 180.0 * self.width / 2.0,
            lat / 90.0 * self.height / 2.0,
        )
    }

    /// Line segments of a graticule with the given spacing in degrees
    pub fn graticule(&self, step: f64) -> Vec<(Point2<f64>, Point2<f64>)> {
        let mut lines = Vec::new();
        if step <= 0.0 {
            return lines;
        }

        let mut lon = -180.0;
        while lon <= 180.0 {
            lines.push((
                self.project_lat_lon(-90.0, lon),
                self.project_lat_lon(90.0, lon),
            ));
            lon += step;
        }

        let mut lat = -90.0;
        while lat <= 90.0 {
            lines.push((
                self.project_lat_lon(lat, -180.0),
                self.project_lat_lon(lat, 180.0),
            ));
            lat += step;
        }

        lines
    }
}

/// Split a ground track (degrees) into polylines that don't wrap around the map.
///
/// When two consecutive points cross the antimeridian, the crossing latitude is
/// interpolated and both segments are extended to the map edge.
pub fn ground_track_segments(track: &[Lla]) -> Vec<Vec<Lla>> {
    let mut segments = Vec::new();
    let mut segment: Vec<Lla> = Vec::new();

    for p in track.iter() {
        let p = Lla::new(p.clamped_latitude(), p.wrapped_longitude(), p.altitude);
        if let Some(prev) = segment.last().copied() {
            let dlon = p.longitude - prev.longitude;
            if dlon.abs() > 180.0 {
                // Going east crosses +180, going west crosses -180
                let edge = if dlon < 0.0 { 180.0 } else { -180.0 };
                let unwrapped = p.longitude + 2.0 * edge;
                let t = (edge - prev.longitude) / (unwrapped - prev.longitude);
                let lat = prev.latitude + t * (p.latitude - prev.latitude);
                let alt = prev.altitude + t * (p.altitude - prev.altitude);

                segment.push(Lla::new(lat, edge, alt));
                segments.push(std::mem::take(&mut segment));
                segment.push(Lla::new(lat, -edge, alt));
            }
        }
        segment.push(p);
    }

    if !segment.is_empty() {
        segments.push(segment);
    }

    segments
}

/// The two lines of an `x` shaped marker centred on `p`
pub fn marker_lines(p: Point2<f64>, half_size: f64) -> [(Point2<f64>, Point2<f64>); 2] {
    [
        (
            Point2::new(p.x - half_size, p.y - half_size),
            Point2::new(p.x + half_size, p.y + half_size),
        ),
        (
            Point2::new(p.x - half_size, p.y + half_size),
            Point2::new(p.x + half_size, p.y - half_size),
        ),
    ]
}
