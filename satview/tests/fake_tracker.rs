//! Drive the viewer state with a scripted stand-in for the tracker
#![cfg(unix)]

use satview_lib::{app::AppState, refresh::Refresher, tracker::Tracker};
use std::time::Duration;
use tracktypes::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(10);

fn fake_tracker() -> Tracker {
    Tracker::new("sh").with_leading_args(["test_fixtures/fake_tracker.sh"])
}

fn refresh(refresher: &mut Refresher, app: &mut AppState, mode: TrackerMode) {
    assert!(refresher.request(mode).unwrap());
    let outcome = refresher.wait(TIMEOUT).expect("Refresh timed out");
    app.apply(outcome);
}

#[test]
fn list_update_and_switch_category() {
    let mut refresher = Refresher::new(fake_tracker());
    let mut app = AppState::new(&["GPS".to_owned()]);

    refresh(&mut refresher, &mut app, TrackerMode::ListAll);
    assert_eq!(app.catalog().len(), 2);
    assert_eq!(app.selected(), Some("ISS (ZARYA)"));
    let iss = app.selected_record().unwrap();
    assert_eq!(iss.trajectory.len(), 3);
    assert_eq!(iss.lla, Some(Lla::new(38.84, -62.73, 419.61)));

    refresh(&mut refresher, &mut app, TrackerMode::Update);
    assert_eq!(app.catalog().len(), 2);
    let iss = app.selected_record().unwrap();
    assert_eq!(iss.lla, Some(Lla::new(40.01, -55.10, 420.30)));
    assert_eq!(iss.distance_to_station, Some(7901.2));
    // Fields the update didn't report are kept
    assert_eq!(iss.trajectory.len(), 3);
    assert_eq!(iss.distance_to_ground, Some(419.61));

    let mode = app.next_category();
    refresh(&mut refresher, &mut app, mode);
    assert_eq!(app.catalog().names().collect::<Vec<_>>(), vec!["GPS BIIR-2"]);
    assert_eq!(app.info_lines(), vec!["ISS (ZARYA): no data"]);
    assert_eq!(app.select_next(), Some("GPS BIIR-2"));
    assert_eq!(app.refresh_count(), 3);
}

#[test]
fn failing_tracker_renders_nothing() {
    let mut refresher = Refresher::new(fake_tracker());
    let mut app = AppState::default();

    refresh(&mut refresher, &mut app, TrackerMode::ListAll);
    assert!(!app.catalog().is_empty());

    refresh(
        &mut refresher,
        &mut app,
        TrackerMode::Category("unknown".to_owned()),
    );
    assert!(app.catalog().is_empty());
    assert!(app.selected_record().is_none());
    assert!(app.last_error().unwrap().contains("Unknown mode 'unknown'"));
}
