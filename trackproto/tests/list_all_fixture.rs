//! Parse a listing captured from the tracker in `listAll` mode

use trackproto::*;

const LISTING: &str = include_str!("../test_fixtures/list_all.txt");

#[test]
fn list_all_fixture() {
    let catalog = parse_listing(LISTING);

    assert_eq!(
        catalog.names().collect::<Vec<_>>(),
        vec!["ISS (ZARYA)", "METEOR-M 2", "NOAA 19"]
    );

    let iss = catalog.get("ISS (ZARYA)").unwrap();
    assert_eq!(iss.trajectory.len(), 19);
    assert_eq!(iss.trajectory.first(), iss.lla.as_ref());
    assert_eq!(
        iss.trajectory.last(),
        Some(&Lla::new(-41.000501, -161.350874, 423.501218))
    );
    assert_eq!(iss.distance_to_station, Some(8123.441877));

    let noaa = catalog.get("NOAA 19").unwrap();
    assert!(noaa.trajectory.is_empty());
    assert_eq!(
        noaa.ecef,
        Some(nalgebra::vector![-4201.331004, -3855.870031, -4771.880901])
    );
    assert_eq!(noaa.distance_to_ground, Some(851.027713));

    let meteor = catalog.get("METEOR-M 2").unwrap();
    assert_eq!(meteor.trajectory.len(), 2);
    assert_eq!(meteor.lla.map(|lla| lla.latitude), Some(27.760011));
}

#[test]
fn crlf_listing() {
    let crlf = LISTING.replace('\n', "\r\n");
    assert_eq!(parse_listing(&crlf), parse_listing(LISTING));
}
