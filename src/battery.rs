//! Menu → test → menu session loop

use crate::config::BatteryConfig;
use crate::error::RunError;
use crate::frontend::Frontend;
use crate::random::ThreadRandom;
use crate::runner::{run_assessment, run_screen, RunOutcome, Screen};
use crate::shell::{Menu, MenuChoice, SetupErrorScreen};
use crate::storage::DataStore;
use crate::tasks::{DigitSpan, Dsst, Feelings, Pvt, ReactionStats, Sleepiness};
use crate::types::{RunState, TestKind};
use std::path::PathBuf;
use tracing::info;

/// What one test run produced, condensed for the menu status line
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub kind: TestKind,
    pub state: RunState,
    pub saved_to: Option<PathBuf>,
    /// Short result text, only for natural completion
    pub result: Option<String>,
}

impl TestSummary {
    fn from_outcome<T>(kind: TestKind, outcome: &RunOutcome<T>, result: Option<String>) -> Self {
        Self {
            kind,
            state: outcome.state,
            saved_to: outcome.saved_to.clone(),
            result: if outcome.completed() { result } else { None },
        }
    }

    pub fn status_line(&self) -> String {
        match (self.state, &self.result) {
            (RunState::Finished, Some(result)) if self.saved_to.is_some() => {
                format!("{}: {}", self.kind.title(), result)
            }
            (RunState::Finished, result) => format!(
                "{}: {} (save failed, see log)",
                self.kind.title(),
                result.as_deref().unwrap_or("finished")
            ),
            _ => format!("{} cancelled; nothing saved", self.kind.title()),
        }
    }
}

/// Hands each test its own random source
#[derive(Debug, Clone)]
pub struct RngFactory {
    seed: Option<u64>,
    issued: u64,
}

impl RngFactory {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed, issued: 0 }
    }

    pub fn next_rng(&mut self) -> ThreadRandom {
        let rng = match self.seed {
            Some(seed) => ThreadRandom::seeded(seed.wrapping_add(self.issued)),
            None => ThreadRandom::new(),
        };
        self.issued += 1;
        rng
    }
}

/// Run a single test and persist its result on natural completion
pub fn run_test<F: Frontend + ?Sized>(
    kind: TestKind,
    config: &BatteryConfig,
    store: &DataStore,
    frontend: &mut F,
    rngs: &mut RngFactory,
) -> Result<TestSummary, RunError> {
    let viewport = config.viewport;
    let summary = match kind {
        TestKind::Pvt => {
            let test = Pvt::new(config.pvt.clone(), rngs.next_rng());
            let outcome = run_assessment(test, frontend, store, viewport)?;
            let result = ReactionStats::from_times(&outcome.output).map(|stats| {
                format!(
                    "{} trials, mean {:.0} ms",
                    outcome.output.len(),
                    stats.mean_ms
                )
            });
            TestSummary::from_outcome(kind, &outcome, result)
        }
        TestKind::DigitSpan => {
            let test = DigitSpan::new(config.digit_span.clone(), rngs.next_rng());
            let outcome = run_assessment(test, frontend, store, viewport)?;
            let score = outcome.output;
            let result = format!(
                "forward {}, backward {}, total {}",
                score.forward_span, score.backward_span, score.total_span
            );
            TestSummary::from_outcome(kind, &outcome, Some(result))
        }
        TestKind::Dsst => {
            let test = Dsst::new(config.dsst.clone(), rngs.next_rng());
            let outcome = run_assessment(test, frontend, store, viewport)?;
            let score = outcome.output;
            let result = format!(
                "{}/{} correct ({:.0}%)",
                score.correct_count,
                score.total_attempted,
                score.accuracy * 100.0
            );
            TestSummary::from_outcome(kind, &outcome, Some(result))
        }
        TestKind::Sleepiness => {
            let test = Sleepiness::new(config.sleepiness.clone(), viewport);
            let outcome = run_assessment(test, frontend, store, viewport)?;
            let result = outcome.output.map(|rating| format!("rated {rating}"));
            TestSummary::from_outcome(kind, &outcome, result)
        }
        TestKind::Feelings => {
            let test = Feelings::new(config.feelings.clone(), viewport);
            let outcome = run_assessment(test, frontend, store, viewport)?;
            let result = outcome
                .output
                .as_ref()
                .map(|text| format!("{} characters saved", text.chars().count()));
            TestSummary::from_outcome(kind, &outcome, result)
        }
    };
    info!(status = %summary.status_line(), "test returned to menu");
    Ok(summary)
}

/// Loop menu → test → menu until the subject quits
pub fn run_battery<F: Frontend + ?Sized>(
    config: &BatteryConfig,
    store: &DataStore,
    frontend: &mut F,
    rngs: &mut RngFactory,
) -> Result<Vec<TestSummary>, RunError> {
    let mut history: Vec<TestSummary> = Vec::new();

    loop {
        let mut menu = Menu::new(config.viewport);
        if let Some(last) = history.last() {
            menu = menu.with_status(last.status_line());
        }
        run_screen(&mut menu, frontend, config.viewport)?;

        match menu.finish() {
            MenuChoice::Test(kind) => {
                history.push(run_test(kind, config, store, frontend, rngs)?);
            }
            MenuChoice::Quit => {
                info!(tests_run = history.len(), "leaving battery");
                return Ok(history);
            }
        }
    }
}

/// Show the setup error until the subject acknowledges it
pub fn show_setup_error<F: Frontend + ?Sized>(
    config: &BatteryConfig,
    message: &str,
    frontend: &mut F,
) -> Result<(), RunError> {
    let mut screen = SetupErrorScreen::new(config.viewport, message);
    run_screen(&mut screen, frontend, config.viewport)
}
