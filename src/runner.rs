//! Blocking frame loop shared by every screen
//!
//! A screen is a small state machine advanced by input events and by time.
//! [`run_screen`] drives one until it leaves [`RunState::Running`]:
//! poll input → update → draw → present → pace. [`run_assessment`] adds the
//! single persistence hand-off at the terminal state.

use crate::error::RunError;
use crate::frontend::Frontend;
use crate::scene::Scene;
use crate::storage::DataStore;
use crate::types::{InputEvent, RunState, TestKind, Viewport};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};

/// State machine contract
pub trait Screen {
    /// Value handed back to the caller on any terminal state
    type Output;

    /// Called with the time of the first frame
    fn begin(&mut self, _now: Duration) {}

    fn handle_event(&mut self, event: &InputEvent, now: Duration);

    /// Time-driven transitions, evaluated once per frame
    fn tick(&mut self, _now: Duration) {}

    fn state(&self) -> RunState;

    fn finish(self) -> Self::Output;
}

/// Presenter: reads machine state and emits draw calls
pub trait Render {
    fn render(&self, now: Duration, scene: &mut Scene);
}

/// A screen whose natural completion produces a persisted Session Result
pub trait Assessment: Screen {
    type Record: Serialize;

    fn kind(&self) -> TestKind;

    /// Session Result; `None` unless the machine finished naturally
    fn record(&self) -> Option<Self::Record>;
}

/// Result of one assessment run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome<T> {
    pub output: T,
    pub state: RunState,
    /// Where the record was written, if it was
    pub saved_to: Option<PathBuf>,
}

impl<T> RunOutcome<T> {
    pub fn completed(&self) -> bool {
        self.state == RunState::Finished
    }

    /// Finished naturally but the save failed
    pub fn save_failed(&self) -> bool {
        self.completed() && self.saved_to.is_none()
    }
}

/// Drive `screen` until it reaches a terminal state
pub fn run_screen<S, F>(screen: &mut S, frontend: &mut F, viewport: Viewport) -> Result<(), RunError>
where
    S: Screen + Render,
    F: Frontend + ?Sized,
{
    let mut scene = Scene::new(viewport);
    screen.begin(frontend.now());

    while screen.state().is_running() {
        for event in frontend.poll_events()? {
            screen.handle_event(&event, frontend.now());
            if !screen.state().is_running() {
                break;
            }
        }

        if screen.state().is_running() {
            screen.tick(frontend.now());
        }
        if !screen.state().is_running() {
            break;
        }

        scene.reset();
        screen.render(frontend.now(), &mut scene);
        frontend.present(&scene)?;
        frontend.pace();
    }

    debug!(state = ?screen.state(), "screen loop ended");
    Ok(())
}

/// Run an assessment and persist its record exactly once on natural completion.
///
/// Save failures are logged and reported through [`RunOutcome::saved_to`];
/// they never abort the session.
pub fn run_assessment<A, F>(
    mut test: A,
    frontend: &mut F,
    store: &DataStore,
    viewport: Viewport,
) -> Result<RunOutcome<A::Output>, RunError>
where
    A: Assessment + Render,
    F: Frontend + ?Sized,
{
    let kind = test.kind();
    info!(test = kind.test_type(), "starting test");
    run_screen(&mut test, frontend, viewport)?;

    let state = test.state();
    let saved_to = match state {
        RunState::Finished => persist(&test, store),
        _ => {
            info!(test = kind.test_type(), "test cancelled; nothing saved");
            None
        }
    };

    Ok(RunOutcome {
        output: test.finish(),
        state,
        saved_to,
    })
}

/// Best-effort save of a finished assessment's record
pub fn persist<A: Assessment>(test: &A, store: &DataStore) -> Option<PathBuf> {
    let record = test.record()?;
    match store.save(test.kind(), &record) {
        Ok(path) => Some(path),
        Err(err) => {
            error!(
                test = test.kind().test_type(),
                error = %err,
                "failed to save session; results lost"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::HeadlessFrontend;
    use crate::scene::{Color, TextSize};
    use crate::storage::LayoutPolicy;
    use crate::types::Key;
    use serde::Serialize;
    use tempfile::TempDir;

    /// Finishes after three Enter presses; Escape cancels
    struct Counter {
        presses: u32,
        ticks: u32,
        state: RunState,
    }

    #[derive(Serialize)]
    struct CounterRecord {
        test_type: &'static str,
        presses: u32,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                presses: 0,
                ticks: 0,
                state: RunState::Running,
            }
        }
    }

    impl Screen for Counter {
        type Output = u32;

        fn handle_event(&mut self, event: &InputEvent, _now: Duration) {
            if event.is_cancel() {
                self.state = RunState::Cancelled;
            } else if *event == InputEvent::KeyDown(Key::Enter) {
                self.presses += 1;
                if self.presses == 3 {
                    self.state = RunState::Finished;
                }
            }
        }

        fn tick(&mut self, _now: Duration) {
            self.ticks += 1;
        }

        fn state(&self) -> RunState {
            self.state
        }

        fn finish(self) -> u32 {
            self.presses
        }
    }

    impl Render for Counter {
        fn render(&self, _now: Duration, scene: &mut Scene) {
            scene.clear(Color::WHITE);
            scene.text(format!("{}", self.presses), 0.0, 0.0, TextSize::Normal, Color::BLACK);
        }
    }

    impl Assessment for Counter {
        type Record = CounterRecord;

        fn kind(&self) -> TestKind {
            TestKind::Feelings
        }

        fn record(&self) -> Option<CounterRecord> {
            (self.state == RunState::Finished).then_some(CounterRecord {
                test_type: "counter",
                presses: self.presses,
            })
        }
    }

    #[test]
    fn test_loop_runs_until_finished_and_persists_once() {
        let tmp = TempDir::new().unwrap();
        let store = DataStore::open(tmp.path(), LayoutPolicy::Legacy);
        let mut frontend = HeadlessFrontend::new(60)
            .keys([Key::Enter, Key::Enter])
            .wait(Duration::from_millis(40))
            .keys([Key::Enter]);

        let outcome =
            run_assessment(Counter::new(), &mut frontend, &store, Viewport::default()).unwrap();

        assert_eq!(outcome.output, 3);
        assert!(outcome.completed());
        assert_eq!(outcome.saved_to, Some(store.record_path("feelings")));
        assert_eq!(store.load_appended("feelings").unwrap().len(), 1);
        // the frame carrying the final press is not drawn
        assert_eq!(frontend.frames_presented(), 5);
    }

    #[test]
    fn test_cancel_persists_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = DataStore::open(tmp.path(), LayoutPolicy::Legacy);
        let mut frontend = HeadlessFrontend::new(60)
            .keys([Key::Enter])
            .frame([InputEvent::Quit]);

        let outcome =
            run_assessment(Counter::new(), &mut frontend, &store, Viewport::default()).unwrap();

        assert_eq!(outcome.output, 1);
        assert_eq!(outcome.state, RunState::Cancelled);
        assert!(!outcome.save_failed());
        assert!(!store.record_path("feelings").exists());
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let store = DataStore::open(tmp.path(), LayoutPolicy::Legacy);
        std::fs::write(store.record_path("feelings"), "not json").unwrap();
        let mut frontend = HeadlessFrontend::new(60).keys([Key::Enter; 3]);

        let outcome =
            run_assessment(Counter::new(), &mut frontend, &store, Viewport::default()).unwrap();

        assert_eq!(outcome.output, 3);
        assert!(outcome.save_failed());
    }

    #[test]
    fn test_events_after_terminal_state_are_ignored() {
        let mut counter = Counter::new();
        let mut frontend = HeadlessFrontend::new(60).frame([
            InputEvent::KeyDown(Key::Escape),
            InputEvent::KeyDown(Key::Enter),
        ]);
        run_screen(&mut counter, &mut frontend, Viewport::default()).unwrap();
        assert_eq!(counter.state(), RunState::Cancelled);
        assert_eq!(counter.presses, 0);
        assert_eq!(counter.ticks, 0);
    }
}
