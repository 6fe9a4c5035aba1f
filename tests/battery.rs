//! End-to-end runs through the frame loop into a temporary data directory

use orexin::config::{DigitSpanConfig, DsstConfig, FeelingsConfig, PvtConfig, SleepinessScale};
use orexin::random::ScriptedRandom;
use orexin::tasks::sleepiness::rating_button_rect;
use orexin::tasks::{DigitSpan, Dsst, Feelings, Pvt, Sleepiness};
use orexin::{
    run_assessment, DataStore, HeadlessFrontend, InputEvent, Key, LayoutPolicy, RunState,
    TestKind, Viewport,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;

fn first_key(record: &Value) -> &str {
    record
        .as_object()
        .and_then(|object| object.keys().next())
        .map(String::as_str)
        .unwrap_or_default()
}

#[test]
fn test_full_pvt_run_is_persisted_once() {
    let tmp = TempDir::new().unwrap();
    let store = DataStore::open(tmp.path(), LayoutPolicy::Legacy);

    let rng = ScriptedRandom::new().with_floats(std::iter::repeat(1.0).take(20));
    let mut frontend = HeadlessFrontend::new(60);
    for _ in 0..10 {
        frontend = frontend
            .wait(Duration::from_millis(1250))
            .keys([Key::Char(' ')]);
    }

    let outcome = run_assessment(
        Pvt::new(PvtConfig::default(), rng),
        &mut frontend,
        &store,
        Viewport::default(),
    )
    .unwrap();

    assert!(outcome.completed());
    assert_eq!(outcome.output.len(), 10);
    assert!(outcome
        .output
        .iter()
        .all(|rt| (200.0..=300.0).contains(rt)));
    assert_eq!(outcome.saved_to, Some(store.record_path("pvt")));

    let records = store.load_records(TestKind::Pvt).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(first_key(record), "timestamp");
    assert_eq!(record["test_type"], "psychomotor_vigilance_task");
    assert_eq!(record["completed_trials"], 10);
    assert_eq!(record["false_starts"], 0);
    assert_eq!(record["all_responses"].as_array().unwrap().len(), 10);
    assert!(record["mean_rt_ms"].as_f64().is_some());
}

#[test]
fn test_cancelled_pvt_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = DataStore::open(tmp.path(), LayoutPolicy::Legacy);
    let mut frontend = HeadlessFrontend::new(60)
        .wait(Duration::from_millis(1250))
        .keys([Key::Char(' '), Key::Escape]);

    let outcome = run_assessment(
        Pvt::new(
            PvtConfig::default(),
            ScriptedRandom::new().with_floats([1.0, 1.0]),
        ),
        &mut frontend,
        &store,
        Viewport::default(),
    )
    .unwrap();

    assert_eq!(outcome.state, RunState::Cancelled);
    assert_eq!(outcome.output.len(), 1);
    assert!(store.load_records(TestKind::Pvt).unwrap().is_empty());
}

#[test]
fn test_dsst_time_out_scores_partial_round() {
    let tmp = TempDir::new().unwrap();
    let store = DataStore::open(tmp.path(), LayoutPolicy::Legacy);
    let config = DsstConfig {
        duration: Duration::from_secs(2),
        ..DsstConfig::default()
    };
    let rng = ScriptedRandom::new().with_ints((0..30).map(|i| (i % 6) as u8 + 1));
    let mut frontend = HeadlessFrontend::new(60)
        .type_text("12345612")
        .wait(Duration::from_secs(3));

    let outcome =
        run_assessment(Dsst::new(config, rng), &mut frontend, &store, Viewport::default()).unwrap();

    assert!(outcome.completed());
    assert_eq!(outcome.output.correct_count, 8);
    assert_eq!(outcome.output.total_attempted, 8);

    let records = store.load_records(TestKind::Dsst).unwrap();
    assert_eq!(records[0]["accuracy"], 1.0);
    assert_eq!(records[0]["duration_seconds"], 2.0);
    assert_eq!(records[0]["symbol_map"]["1"], "-");
}

#[test]
fn test_digit_span_writes_session_file() {
    let tmp = TempDir::new().unwrap();
    let store = DataStore::open(tmp.path(), LayoutPolicy::Legacy);
    let config = DigitSpanConfig {
        max_span: 3,
        ..DigitSpanConfig::default()
    };

    // every digit drawn is 0, so "000" is correct in both directions
    let mut frontend = HeadlessFrontend::new(60);
    for _ in 0..4 {
        frontend = frontend
            .keys([Key::Char(' ')])
            .wait(Duration::from_millis(3100))
            .type_text("000")
            .keys([Key::Char(' ')]);
    }

    let outcome = run_assessment(
        DigitSpan::new(config, ScriptedRandom::new()),
        &mut frontend,
        &store,
        Viewport::default(),
    )
    .unwrap();

    assert!(outcome.completed());
    assert_eq!(outcome.output.total_span, 6);

    let saved = outcome.saved_to.unwrap();
    assert_eq!(saved.parent(), Some(store.sessions_dir().as_path()));
    assert!(!store.record_path("digit_span").exists());

    let records = store.load_records(TestKind::DigitSpan).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["forward_span"], 3);
    assert_eq!(records[0]["backward_span"], 3);
    assert_eq!(records[0]["backward_trials"].as_array().unwrap().len(), 2);
}

#[test]
fn test_sleepiness_click_and_feelings_entry() {
    let tmp = TempDir::new().unwrap();
    let store = DataStore::open(tmp.path(), LayoutPolicy::Append);
    let viewport = Viewport::default();

    let (x, y) = rating_button_rect(viewport, 2).center();
    let mut frontend = HeadlessFrontend::new(60)
        .frame([InputEvent::PointerMoved { x, y }])
        .frame([InputEvent::PointerDown { x, y }]);
    let outcome = run_assessment(
        Sleepiness::new(SleepinessScale::stanford(), viewport),
        &mut frontend,
        &store,
        viewport,
    )
    .unwrap();
    assert_eq!(outcome.output, Some(2));
    assert_eq!(outcome.saved_to, Some(store.record_path("sss")));

    let mut frontend = HeadlessFrontend::new(60)
        .type_text(" rested ")
        .keys([Key::Enter]);
    let outcome = run_assessment(
        Feelings::new(FeelingsConfig::default(), viewport),
        &mut frontend,
        &store,
        viewport,
    )
    .unwrap();
    assert_eq!(outcome.output.as_deref(), Some("rested"));

    let records = store.load_records(TestKind::Feelings).unwrap();
    assert_eq!(records[0]["feeling_text"], "rested");
    assert_eq!(records[0]["character_count"], 6);
    assert_eq!(first_key(&records[0]), "timestamp");
}
