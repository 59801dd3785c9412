//! A line-oriented parser for the tracker's stdout listing

use crate::{
    ECEF_TOKEN, ECI_TOKEN, GROUND_DISTANCE_TOKEN, KEY_VALUE_DELIMITER, LLA_TOKEN, NAME_TOKEN,
    STATION_DISTANCE_TOKEN, TRAJECTORY_TOKEN,
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{char, space0, space1},
    combinator::{eof, map, opt, rest, value},
    error::ErrorKind,
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
    Err::Error,
};
use std::fmt;
use tracing::{debug, warn};
use tracktypes::prelude::*;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

type Vector3 = na::Vector3<f64>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("Expected 3 vector components, found {0}")]
    VectorLength(usize),
    #[error("Empty satellite name")]
    EmptyName,
    #[error("Parse error ({1:?})")]
    Nom(I, ErrorKind),
}

/// The recognized line prefixes
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LineKey {
    Name,
    Eci,
    Ecef,
    Lla,
    Trajectory,
    GroundDistance,
    StationDistance,
}

/// A classified line of tracker output
#[derive(Clone, Debug, PartialEq)]
pub enum ListingLine<'a> {
    Name(&'a str),
    Eci(Vector3),
    Ecef(Vector3),
    Lla(Lla),
    Trajectory(Vec<Lla>),
    GroundDistance(f64),
    StationDistance(f64),

    /// A known prefix with a value that didn't parse
    Malformed {
        key: LineKey,
        line: &'a str,
        error: ParseError<&'a str>,
    },

    Unsupported(&'a str),
}

impl LineKey {
    pub const fn token(self) -> &'static str {
        use LineKey::*;
        match self {
            Name => NAME_TOKEN,
            Eci => ECI_TOKEN,
            Ecef => ECEF_TOKEN,
            Lla => LLA_TOKEN,
            Trajectory => TRAJECTORY_TOKEN,
            GroundDistance => GROUND_DISTANCE_TOKEN,
            StationDistance => STATION_DISTANCE_TOKEN,
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().trim_end_matches(KEY_VALUE_DELIMITER))
    }
}

/// Classify a single line of tracker output
pub fn parse_line(line: &str) -> ListingLine<'_> {
    let line = line.trim_end_matches('\r');
    let (s, key) = match line_key(line) {
        Ok(v) => v,
        Err(_) => return ListingLine::Unsupported(line),
    };

    match line_value(key, s) {
        Ok((_, l)) => l,
        Err(nom::Err::Error(error) | nom::Err::Failure(error)) => {
            ListingLine::Malformed { key, line, error }
        }
        Err(nom::Err::Incomplete(_)) => ListingLine::Malformed {
            key,
            line,
            error: ParseError::Nom(s, ErrorKind::Complete),
        },
    }
}

/// Parse a whole listing of tracker output into a catalog.
///
/// Lines before the first `Name:` line are ignored, malformed lines are
/// logged and skipped.
pub fn read_listing<I, S>(lines: I) -> Catalog
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    use ListingLine::*;

    let mut catalog = Catalog::new();
    let mut current: Option<String> = None;

    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        match parse_line(line.as_ref()) {
            Name(name) => {
                catalog.reset_record(name);
                current = Some(name.to_owned());
            }
            Malformed { key, line, error } => {
                warn!(line_no, %key, %error, line, "Skipping malformed tracker output line");
                if key == LineKey::Name {
                    current = None;
                }
            }
            Unsupported(line) => {
                if !line.trim().is_empty() {
                    debug!(line_no, line, "Unsupported tracker output line");
                }
            }
            field => match current.as_deref() {
                Some(name) => apply_field(catalog.record_mut(name), field),
                None => debug!(line_no, "Ignoring tracker output before the first satellite name"),
            },
        }
    }

    catalog
}

/// Parse tracker output text into a catalog
pub fn parse_listing(text: &str) -> Catalog {
    read_listing(text.split(crate::LINE_DELIMITER))
}

fn apply_field(rec: &mut SatelliteRecord, field: ListingLine) {
    use ListingLine::*;
    match field {
        Eci(v) => rec.eci = Some(v),
        Ecef(v) => rec.ecef = Some(v),
        Lla(v) => rec.lla = Some(v),
        Trajectory(points) => rec.trajectory.extend(points),
        GroundDistance(d) => rec.distance_to_ground = Some(d),
        StationDistance(d) => rec.distance_to_station = Some(d),
        Name(_) | Malformed { .. } | Unsupported(_) => (),
    }
}

fn line_key(s: &str) -> Result<&str, LineKey> {
    alt((
        map(tag(NAME_TOKEN), |_| LineKey::Name),
        keyed(ECEF_TOKEN, LineKey::Ecef),
        keyed(ECI_TOKEN, LineKey::Eci),
        keyed(LLA_TOKEN, LineKey::Lla),
        keyed(TRAJECTORY_TOKEN, LineKey::Trajectory),
        keyed(GROUND_DISTANCE_TOKEN, LineKey::GroundDistance),
        keyed(STATION_DISTANCE_TOKEN, LineKey::StationDistance),
    ))(s)
}

/// Matches `token`, any free text (units, frame notes) and the key/value delimiter
fn keyed<'a>(token: &'static str, key: LineKey) -> impl FnMut(&'a str) -> Result<&'a str, LineKey> {
    move |s: &'a str| {
        let (s, _) = tag(token)(s)?;
        let (s, _) = take_till(|c| c == KEY_VALUE_DELIMITER)(s)?;
        let (s, _) = char(KEY_VALUE_DELIMITER)(s)?;
        Ok((s, key))
    }
}

fn line_value(key: LineKey, s: &str) -> Result<&str, ListingLine> {
    use LineKey::*;
    match key {
        Name => map(satellite_name, ListingLine::Name)(s),
        Eci => map(whole(v3), ListingLine::Eci)(s),
        Ecef => map(whole(v3), ListingLine::Ecef)(s),
        Lla => map(whole(v3), |v| ListingLine::Lla(v.into()))(s),
        Trajectory => map(whole(trajectory), ListingLine::Trajectory)(s),
        GroundDistance => map(distance, ListingLine::GroundDistance)(s),
        StationDistance => map(distance, ListingLine::StationDistance)(s),
    }
}

/// Requires the value to span the rest of the line, trailing whitespace aside
fn whole<'a, O, F>(mut f: F) -> impl FnMut(&'a str) -> Result<&'a str, O>
where
    F: FnMut(&'a str) -> Result<&'a str, O>,
{
    move |s: &'a str| {
        let (s, _) = space0(s)?;
        let (s, out) = f(s)?;
        let (s, _) = space0(s)?;
        let (s, _) = eof(s)?;
        Ok((s, out))
    }
}

fn satellite_name(s: &str) -> Result<&str, &str> {
    let (s, name) = rest(s)?;
    let name = name.trim();
    if name.is_empty() {
        Err(Error(ParseError::EmptyName))
    } else {
        Ok((s, name))
    }
}

/// A number optionally followed by a unit word, e.g. `412.7 km`
fn distance(s: &str) -> Result<&str, f64> {
    let (s, _) = space0(s)?;
    let (s, d) = double(s)?;
    let (s, _) = alt((value((), pair(space1, rest)), value((), pair(space0, eof))))(s)?;
    Ok((s, d))
}

fn comma(s: &str) -> Result<&str, char> {
    delimited(space0, char(','), space0)(s)
}

fn v3_components(s: &str) -> Result<&str, Vector3> {
    let (s, c) = separated_list1(comma, preceded(space0, double))(s)?;
    match c.as_slice() {
        [x, y, z] => Ok((s, Vector3::new(*x, *y, *z))),
        _ => Err(Error(ParseError::VectorLength(c.len()))),
    }
}

/// `{x, y, z}`, the braces are optional
fn v3(s: &str) -> Result<&str, Vector3> {
    let (s, _) = opt(char('{'))(s)?;
    let (s, v) = v3_components(s)?;
    let (s, _) = space0(s)?;
    let (s, _) = opt(char('}'))(s)?;
    Ok((s, v))
}

fn braced_v3(s: &str) -> Result<&str, Vector3> {
    delimited(
        terminated(char('{'), space0),
        v3_components,
        preceded(space0, char('}')),
    )(s)
}

/// One or more `{lat, lon, alt}` groups separated by commas or whitespace
fn trajectory(s: &str) -> Result<&str, Vec<Lla>> {
    let sep = alt((value((), comma), value((), space1)));
    let (s, points) = separated_list1(sep, braced_v3)(s)?;
    Ok((s, points.into_iter().map(Lla::from).collect()))
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const LISTING: &str = indoc! {r#"
        Tracker v2 started
        Name: ISS (ZARYA)
        Position in  ECI: {-4120.53, 3522.1, 4197.02}
        Position in ECEF: {2541.7, -4930.35, 4197.02}
        Position in LLA: {38.8437, -62.7339, 419.61}
        Trajectory in LLA: {38.84, -62.73, 419.6}, {40.21, -58.11, 420.1} {41.5, -53.3, 420.5}
        Distance to the ground: 419.61 km
        Distance to MIEM: 8123.4 km
        Name: NOAA 19
        Position in LLA (deg, deg, km): {-12.5, 170.25, 850.3}
        Distance to the ground: 850.3
        "#};

    #[test]
    fn parse_keys() {
        assert_eq!(line_key("Name: x"), Ok((" x", LineKey::Name)));
        assert_eq!(line_key("Position in  ECI: {"), Ok((" {", LineKey::Eci)));
        assert_eq!(line_key("Position in ECEF [km]: 1"), Ok((" 1", LineKey::Ecef)));
        assert_eq!(
            line_key("Distance to MIEM: 3 km"),
            Ok((" 3 km", LineKey::StationDistance))
        );
        assert!(line_key("Velocity in ECI: {1, 2, 3}").is_err());
    }

    #[test]
    fn parse_v3() {
        assert_eq!(
            v3("{-4120.53, 3522.1, 4197.02}"),
            Ok(("", na::vector![-4120.53, 3522.1, 4197.02]))
        );
        assert_eq!(v3("1,2,3"), Ok(("", na::vector![1.0, 2.0, 3.0])));
        assert_eq!(
            v3("{ 1.5e3 ,-2 , 3 }"),
            Ok(("", na::vector![1.5e3, -2.0, 3.0]))
        );
        assert_eq!(v3("{1, 2}"), Err(Error(ParseError::VectorLength(2))));
    }

    #[test]
    fn parse_distance() {
        assert_eq!(distance(" 419.61 km"), Ok(("", 419.61)));
        assert_eq!(distance(" 850.3"), Ok(("", 850.3)));
        assert_eq!(distance("850.3  "), Ok(("", 850.3)));
        assert!(distance(" 12km").is_err());
        assert!(distance(" far").is_err());
    }

    #[test]
    fn parse_trajectory() {
        let (s, t) = trajectory("{1, 2, 3},{4, 5, 6}  { 7,8,9 }").unwrap();
        assert_eq!(s, "");
        assert_eq!(
            t,
            vec![
                Lla::new(1.0, 2.0, 3.0),
                Lla::new(4.0, 5.0, 6.0),
                Lla::new(7.0, 8.0, 9.0)
            ]
        );
    }

    #[test]
    fn parse_lines() {
        assert_eq!(parse_line("Name:  GPS BIIR-2  \r"), ListingLine::Name("GPS BIIR-2"));
        assert_eq!(
            parse_line("Position in LLA: {55.75, 37.61, 0.2}"),
            ListingLine::Lla(Lla::new(55.75, 37.61, 0.2))
        );
        assert_eq!(
            parse_line("Distance to MIEM: 1200 km"),
            ListingLine::StationDistance(1200.0)
        );
        assert_eq!(parse_line("hello"), ListingLine::Unsupported("hello"));
        assert!(matches!(
            parse_line("Position in ECEF: {1, 2, x}"),
            ListingLine::Malformed {
                key: LineKey::Ecef,
                ..
            }
        ));
        assert!(matches!(
            parse_line("Name:   "),
            ListingLine::Malformed {
                key: LineKey::Name,
                error: ParseError::EmptyName,
                ..
            }
        ));
        assert!(matches!(
            parse_line("Position in  ECI: {1, 2, 3} trailing"),
            ListingLine::Malformed {
                key: LineKey::Eci,
                ..
            }
        ));
    }

    #[test]
    fn parse_whole_listing() {
        let c = parse_listing(LISTING);
        assert_eq!(c.len(), 2);

        let iss = c.get("ISS (ZARYA)").unwrap();
        assert_eq!(iss.eci, Some(na::vector![-4120.53, 3522.1, 4197.02]));
        assert_eq!(iss.ecef, Some(na::vector![2541.7, -4930.35, 4197.02]));
        assert_eq!(iss.lla, Some(Lla::new(38.8437, -62.7339, 419.61)));
        assert_eq!(iss.trajectory.len(), 3);
        assert_eq!(iss.distance_to_ground, Some(419.61));
        assert_eq!(iss.distance_to_station, Some(8123.4));

        let noaa = c.get("NOAA 19").unwrap();
        assert_eq!(noaa.lla, Some(Lla::new(-12.5, 170.25, 850.3)));
        assert_eq!(noaa.eci, None);
        assert!(noaa.trajectory.is_empty());
        assert_eq!(noaa.distance_to_ground, Some(850.3));
        assert_eq!(noaa.distance_to_station, None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let c = read_listing([
            "Name: A",
            "Position in LLA: {1, 2}",
            "Distance to the ground: 400 km",
            "Name: B",
            "Position in LLA: {3, 4, 5}",
        ]);
        assert_eq!(c.len(), 2);
        let a = c.get("A").unwrap();
        assert_eq!(a.lla, None);
        assert_eq!(a.distance_to_ground, Some(400.0));
        assert_eq!(c.get("B").unwrap().lla, Some(Lla::new(3.0, 4.0, 5.0)));
    }

    #[test]
    fn lines_before_name_are_ignored() {
        let c = read_listing(["Position in LLA: {1, 2, 3}", "Distance to MIEM: 5"]);
        assert!(c.is_empty());
    }

    #[test]
    fn empty_name_detaches_following_lines() {
        let c = read_listing(["Name: A", "Name:", "Position in LLA: {1, 2, 3}"]);
        assert_eq!(c.len(), 1);
        assert!(c.get("A").unwrap().is_empty());
    }

    #[test]
    fn repeated_name_starts_fresh_record() {
        let c = read_listing([
            "Name: A",
            "Distance to MIEM: 5",
            "Name: A",
            "Position in LLA: {1, 2, 3}",
        ]);
        let a = c.get("A").unwrap();
        assert_eq!(a.distance_to_station, None);
        assert_eq!(a.lla, Some(Lla::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn trajectory_lines_accumulate() {
        let c = read_listing([
            "Name: A",
            "Trajectory in LLA: {1, 2, 3}",
            "Trajectory in LLA: {4, 5, 6}",
        ]);
        assert_eq!(
            c.get("A").unwrap().trajectory,
            vec![Lla::new(1.0, 2.0, 3.0), Lla::new(4.0, 5.0, 6.0)]
        );
    }
}
