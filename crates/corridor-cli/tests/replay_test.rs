//! Replay driver tests.

use std::io::Cursor;
use std::sync::Arc;

use corridor_cli::{Config, Poll, Replay};
use corridor_core::{CourseStatus, GeoPoint, Route};

fn route() -> Arc<Route> {
    let start = GeoPoint::new(47.0, 11.0, 2000.0);
    let middle = start.destination(0.0, 2000.0);
    let end = middle.destination(90.0, 2000.0);
    Arc::new(Route::new(vec![start, middle, end], vec![100.0, 100.0, 100.0]).unwrap())
}

fn poll(entries: &[(&str, GeoPoint)]) -> Poll {
    entries
        .iter()
        .map(|(name, point)| (name.to_string(), *point))
        .collect()
}

fn config() -> Config {
    Config {
        poll_period_secs: 1.0,
        reacquire_distance_ft: 1000.0,
        stale_after_polls: 3,
    }
}

#[test]
fn completes_and_goes_off_course() {
    let route = route();
    let mut replay = Replay::new(route.clone(), config()).unwrap();

    for step in 0..=20 {
        let on = route.interpolate(step as f64 * 0.1);
        let drifting = route
            .interpolate(step as f64 * 0.1)
            .destination(90.0, 30.0 * step as f64);
        replay
            .observe(&poll(&[("good", on), ("bad", drifting)]))
            .unwrap();
    }

    assert_eq!(replay.status("good"), Some(CourseStatus::Completed));
    assert_eq!(replay.status("bad"), Some(CourseStatus::OffCourse));

    let summaries = replay.finish();
    assert_eq!(summaries.len(), 2);
    let bad = &summaries[0];
    assert_eq!(bad.entity, "bad");
    assert_eq!(bad.label, "OFF-COURSE");
    // 30 ft per poll leaves the 100 ft corridor on the fifth poll
    assert_eq!(bad.elapsed_secs, 4.0);

    let good = &summaries[1];
    assert_eq!(good.label, "COMPLETED");
    assert_eq!(good.elapsed_secs, 20.0);
    assert_eq!(good.samples, 21);
}

#[test]
fn position_jump_starts_a_new_flight() {
    let route = route();
    let mut replay = Replay::new(route.clone(), config()).unwrap();

    replay
        .observe(&poll(&[("plane", route.interpolate(0.2))]))
        .unwrap();
    replay
        .observe(&poll(&[("plane", route.interpolate(0.2).destination(90.0, 5000.0))]))
        .unwrap();

    assert_eq!(replay.tracked(), 1);
    let summaries = replay.finish();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].status, CourseStatus::Nominal);
    assert_eq!(summaries[0].samples, 1);
    assert_eq!(summaries[1].status, CourseStatus::OffCourse);
}

#[test]
fn missing_entities_time_out() {
    let route = route();
    let mut replay = Replay::new(route.clone(), config()).unwrap();

    replay
        .observe(&poll(&[("a", route.interpolate(0.1)), ("b", route.interpolate(0.1))]))
        .unwrap();
    for _ in 0..3 {
        replay.observe(&poll(&[("a", route.interpolate(0.2))])).unwrap();
    }

    assert_eq!(replay.tracked(), 1);
    assert_eq!(replay.status("b"), None);
    let summaries = replay.finish();
    assert_eq!(summaries[0].entity, "b");
    assert_eq!(summaries[1].entity, "a");
}

#[test]
fn entity_back_before_the_stale_limit_keeps_its_flight() {
    let route = route();
    let mut replay = Replay::new(route.clone(), config()).unwrap();

    replay.observe(&poll(&[("a", route.interpolate(0.1))])).unwrap();
    replay.observe(&Poll::new()).unwrap();
    replay.observe(&poll(&[("a", route.interpolate(0.2))])).unwrap();

    let summaries = replay.finish();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].samples, 2);
}

#[test]
fn stale_limit_counts_polls_since_the_last_sample() {
    let route = route();
    let mut replay = Replay::new(route.clone(), config()).unwrap();

    replay.observe(&poll(&[("a", route.interpolate(0.1))])).unwrap();
    replay.observe(&Poll::new()).unwrap();
    replay.observe(&Poll::new()).unwrap();
    // third poll after the last sample: forgotten before this sample is seen
    replay.observe(&poll(&[("a", route.interpolate(0.2))])).unwrap();

    let summaries = replay.finish();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].samples, 1);
    assert_eq!(summaries[1].samples, 1);
}

#[test]
fn simultaneous_timeouts_are_reported_in_name_order() {
    let route = route();
    let mut replay = Replay::new(route.clone(), config()).unwrap();

    let start = route.interpolate(0.1);
    replay
        .observe(&poll(&[
            ("zulu", start),
            ("alpha", start),
            ("mike", start),
            ("kilo", start),
        ]))
        .unwrap();
    for _ in 0..3 {
        replay.observe(&poll(&[("kilo", route.interpolate(0.2))])).unwrap();
    }

    let entities: Vec<_> = replay
        .finish()
        .into_iter()
        .map(|summary| summary.entity)
        .collect();
    assert_eq!(entities, ["alpha", "mike", "zulu", "kilo"]);
}

#[test]
fn reads_json_lines() {
    let route = route();
    let mut replay = Replay::new(route, config()).unwrap();

    let lines = "\
{\"N1\": {\"lat\": 47.0, \"lon\": 11.0, \"alt\": 2000.0}}

{\"N1\": {\"lat\": 47.001, \"lon\": 11.0, \"alt\": 2000.0}}
";
    replay.observe_lines(Cursor::new(lines)).unwrap();
    assert_eq!(replay.status("N1"), Some(CourseStatus::Nominal));

    let err = replay.observe_lines(Cursor::new("not json\n")).unwrap_err();
    assert!(err.to_string().contains("line 1"));
}

#[test]
fn single_vertex_route_is_rejected() {
    let route = Arc::new(Route::new(vec![GeoPoint::new(47.0, 11.0, 0.0)], vec![0.0]).unwrap());
    assert!(Replay::new(route, config()).is_err());
}
