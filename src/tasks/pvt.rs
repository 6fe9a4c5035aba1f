//! Psychomotor vigilance task
//!
//! The subject presses Space as soon as a red circle appears. Each trial
//! waits a random delay, shows the stimulus and measures the response time.
//! Presses during the wait are logged as false starts and restart the wait
//! without counting toward the trial total.

use crate::config::PvtConfig;
use crate::random::RandomSource;
use crate::runner::{Assessment, Screen};
use crate::types::{InputEvent, Key, RunState, TestKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Where the task is within the current trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PvtPhase {
    /// Counting down `delay` from `since` before showing the stimulus
    Waiting { since: Duration, delay: Duration },
    /// Stimulus visible since `since`
    StimulusShown { since: Duration },
    Finished,
    Cancelled,
}

/// One entry of the raw response log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PvtResponse {
    Correct {
        trial: u32,
        reaction_time_ms: f64,
        /// Offset from the start of the task
        at_ms: f64,
    },
    FalseStart {
        trial: u32,
        time_since_wait_start_ms: f64,
        at_ms: f64,
    },
}

/// Summary statistics over the collected reaction times
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionStats {
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl ReactionStats {
    /// `None` for an empty list
    pub fn from_times(times: &[f64]) -> Option<Self> {
        if times.is_empty() {
            return None;
        }
        let sum: f64 = times.iter().sum();
        Some(Self {
            mean_ms: sum / times.len() as f64,
            min_ms: times.iter().copied().fold(f64::INFINITY, f64::min),
            max_ms: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Persisted Session Result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvtRecord {
    pub test_type: String,
    pub session_id: Uuid,
    pub completed_trials: u32,
    pub false_starts: usize,
    pub total_responses: usize,
    pub reaction_times_ms: Vec<f64>,
    pub false_start_times_ms: Vec<f64>,
    pub all_responses: Vec<PvtResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_rt_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rt_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rt_ms: Option<f64>,
}

/// Reaction-time state machine
#[derive(Debug, Clone)]
pub struct Pvt<R: RandomSource> {
    config: PvtConfig,
    rng: R,
    session_id: Uuid,
    phase: PvtPhase,
    started_at: Duration,
    trial_count: u32,
    reaction_times_ms: Vec<f64>,
    false_starts_ms: Vec<f64>,
    responses: Vec<PvtResponse>,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl<R: RandomSource> Pvt<R> {
    pub fn new(config: PvtConfig, mut rng: R) -> Self {
        let delay = draw_delay(&config, &mut rng);
        Self {
            config,
            rng,
            session_id: Uuid::new_v4(),
            phase: PvtPhase::Waiting {
                since: Duration::ZERO,
                delay,
            },
            started_at: Duration::ZERO,
            trial_count: 0,
            reaction_times_ms: Vec::new(),
            false_starts_ms: Vec::new(),
            responses: Vec::new(),
        }
    }

    pub fn phase(&self) -> PvtPhase {
        self.phase
    }

    pub fn config(&self) -> &PvtConfig {
        &self.config
    }

    /// Completed (non false-start) trials so far
    pub fn trial_count(&self) -> u32 {
        self.trial_count
    }

    pub fn stimulus_shown(&self) -> bool {
        matches!(self.phase, PvtPhase::StimulusShown { .. })
    }

    pub fn reaction_times_ms(&self) -> &[f64] {
        &self.reaction_times_ms
    }

    pub fn false_start_times_ms(&self) -> &[f64] {
        &self.false_starts_ms
    }

    pub fn responses(&self) -> &[PvtResponse] {
        &self.responses
    }

    pub fn stats(&self) -> Option<ReactionStats> {
        ReactionStats::from_times(&self.reaction_times_ms)
    }

    fn restart_wait(&mut self, now: Duration) {
        let delay = draw_delay(&self.config, &mut self.rng);
        self.phase = PvtPhase::Waiting { since: now, delay };
    }

    fn respond(&mut self, now: Duration) {
        let at_ms = millis(now.saturating_sub(self.started_at));
        match self.phase {
            PvtPhase::StimulusShown { since } => {
                let reaction_time_ms = millis(now.saturating_sub(since));
                self.reaction_times_ms.push(reaction_time_ms);
                self.responses.push(PvtResponse::Correct {
                    trial: self.trial_count + 1,
                    reaction_time_ms,
                    at_ms,
                });
                self.trial_count += 1;
                debug!(trial = self.trial_count, reaction_time_ms, "pvt response");

                if self.trial_count >= self.config.max_trials {
                    self.phase = PvtPhase::Finished;
                } else {
                    self.restart_wait(now);
                }
            }
            PvtPhase::Waiting { since, .. } => {
                let early_ms = millis(now.saturating_sub(since));
                self.false_starts_ms.push(early_ms);
                self.responses.push(PvtResponse::FalseStart {
                    trial: self.trial_count + 1,
                    time_since_wait_start_ms: early_ms,
                    at_ms,
                });
                debug!(trial = self.trial_count + 1, early_ms, "pvt false start");
                self.restart_wait(now);
            }
            PvtPhase::Finished | PvtPhase::Cancelled => {}
        }
    }
}

fn draw_delay<R: RandomSource>(config: &PvtConfig, rng: &mut R) -> Duration {
    let seconds = rng.uniform(
        config.min_delay.as_secs_f64(),
        config.max_delay.as_secs_f64(),
    );
    Duration::from_secs_f64(seconds.max(0.0))
}

impl<R: RandomSource> Screen for Pvt<R> {
    /// Reaction times collected so far, including after cancellation
    type Output = Vec<f64>;

    fn begin(&mut self, now: Duration) {
        self.started_at = now;
        if self.config.max_trials == 0 {
            self.phase = PvtPhase::Finished;
            return;
        }
        if let PvtPhase::Waiting { delay, .. } = self.phase {
            self.phase = PvtPhase::Waiting { since: now, delay };
        }
    }

    fn handle_event(&mut self, event: &InputEvent, now: Duration) {
        if !self.state().is_running() {
            return;
        }
        if event.is_cancel() {
            self.phase = PvtPhase::Cancelled;
            return;
        }
        if let InputEvent::KeyDown(Key::Char(' ')) = event {
            self.respond(now);
        }
    }

    fn tick(&mut self, now: Duration) {
        if let PvtPhase::Waiting { since, delay } = self.phase {
            if now.saturating_sub(since) >= delay {
                self.phase = PvtPhase::StimulusShown { since: now };
            }
        }
    }

    fn state(&self) -> RunState {
        match self.phase {
            PvtPhase::Finished => RunState::Finished,
            PvtPhase::Cancelled => RunState::Cancelled,
            _ => RunState::Running,
        }
    }

    fn finish(self) -> Vec<f64> {
        self.reaction_times_ms
    }
}

impl<R: RandomSource> Assessment for Pvt<R> {
    type Record = PvtRecord;

    fn kind(&self) -> TestKind {
        TestKind::Pvt
    }

    fn record(&self) -> Option<PvtRecord> {
        if self.phase != PvtPhase::Finished {
            return None;
        }
        let stats = self.stats();
        Some(PvtRecord {
            test_type: TestKind::Pvt.test_type().to_string(),
            session_id: self.session_id,
            completed_trials: self.trial_count,
            false_starts: self.false_starts_ms.len(),
            total_responses: self.responses.len(),
            reaction_times_ms: self.reaction_times_ms.clone(),
            false_start_times_ms: self.false_starts_ms.clone(),
            all_responses: self.responses.clone(),
            mean_rt_ms: stats.map(|s| s.mean_ms),
            min_rt_ms: stats.map(|s| s.min_ms),
            max_rt_ms: stats.map(|s| s.max_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use pretty_assertions::assert_eq;

    const SPACE: InputEvent = InputEvent::KeyDown(Key::Char(' '));

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Every delay is exactly one second
    fn one_second_pvt() -> Pvt<ScriptedRandom> {
        let rng = ScriptedRandom::new().with_floats(std::iter::repeat(1.0).take(64));
        Pvt::new(PvtConfig::default(), rng)
    }

    /// Run one trial starting at `t` with the given reaction time; returns
    /// the time of the response.
    fn complete_trial(pvt: &mut Pvt<ScriptedRandom>, t: u64, rt: u64) -> u64 {
        pvt.tick(ms(t + 999));
        assert!(!pvt.stimulus_shown());
        pvt.tick(ms(t + 1000));
        assert!(pvt.stimulus_shown());
        pvt.handle_event(&SPACE, ms(t + 1000 + rt));
        t + 1000 + rt
    }

    #[test]
    fn test_stimulus_appears_after_delay() {
        let mut pvt = one_second_pvt();
        pvt.begin(ms(500));
        pvt.tick(ms(1499));
        assert!(!pvt.stimulus_shown());
        pvt.tick(ms(1500));
        assert_eq!(pvt.phase(), PvtPhase::StimulusShown { since: ms(1500) });
    }

    #[test]
    fn test_ten_trials_persist_statistics() {
        let rts = [250, 300, 275, 310, 220, 400, 330, 290, 260, 305];
        let mut pvt = one_second_pvt();
        pvt.begin(ms(0));

        let mut t = 0;
        for rt in rts {
            t = complete_trial(&mut pvt, t, rt);
        }

        assert_eq!(pvt.state(), RunState::Finished);
        let record = pvt.record().unwrap();
        let expected: Vec<f64> = rts.iter().map(|&v| v as f64).collect();
        assert_eq!(record.completed_trials, 10);
        assert_eq!(record.reaction_times_ms, expected);
        assert_eq!(
            record.mean_rt_ms,
            Some(expected.iter().sum::<f64>() / expected.len() as f64)
        );
        assert_eq!(record.min_rt_ms, Some(220.0));
        assert_eq!(record.max_rt_ms, Some(400.0));
        assert_eq!(record.false_starts, 0);
        assert_eq!(record.total_responses, 10);
        assert_eq!(record.test_type, "psychomotor_vigilance_task");
    }

    #[test]
    fn test_false_start_restarts_wait_without_counting() {
        let mut pvt = one_second_pvt();
        pvt.begin(ms(0));
        pvt.handle_event(&SPACE, ms(400));

        assert_eq!(pvt.trial_count(), 0);
        assert_eq!(pvt.false_start_times_ms(), &[400.0]);
        assert_eq!(
            pvt.phase(),
            PvtPhase::Waiting {
                since: ms(400),
                delay: ms(1000)
            }
        );
        // the wait restarted, so the old deadline no longer triggers
        pvt.tick(ms(1000));
        assert!(!pvt.stimulus_shown());
        pvt.tick(ms(1400));
        assert!(pvt.stimulus_shown());

        match &pvt.responses()[0] {
            PvtResponse::FalseStart {
                trial,
                time_since_wait_start_ms,
                ..
            } => {
                assert_eq!(*trial, 1);
                assert_eq!(*time_since_wait_start_ms, 400.0);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_cancel_returns_partial_times_without_record() {
        let mut pvt = one_second_pvt();
        pvt.begin(ms(0));
        complete_trial(&mut pvt, 0, 250);
        pvt.handle_event(&InputEvent::KeyDown(Key::Escape), ms(1500));

        assert_eq!(pvt.state(), RunState::Cancelled);
        assert!(pvt.record().is_none());
        assert_eq!(pvt.finish(), vec![250.0]);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut pvt = one_second_pvt();
        pvt.begin(ms(0));
        pvt.handle_event(&InputEvent::KeyDown(Key::Enter), ms(100));
        pvt.handle_event(&InputEvent::PointerDown { x: 1.0, y: 1.0 }, ms(200));
        assert!(pvt.responses().is_empty());
    }

    #[test]
    fn test_response_log_serializes_with_type_tag() {
        let mut pvt = one_second_pvt();
        pvt.begin(ms(0));
        pvt.handle_event(&SPACE, ms(100));
        let value = serde_json::to_value(&pvt.responses()[0]).unwrap();
        assert_eq!(value["type"], "false_start");
        assert_eq!(value["trial"], 1);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(ReactionStats::from_times(&[]), None);
        let stats = ReactionStats::from_times(&[5.0]).unwrap();
        assert_eq!((stats.mean_ms, stats.min_ms, stats.max_ms), (5.0, 5.0, 5.0));
    }

    #[test]
    fn test_zero_trials_finish_immediately() {
        let config = PvtConfig {
            max_trials: 0,
            ..PvtConfig::default()
        };
        let mut pvt = Pvt::new(config, ScriptedRandom::new());
        pvt.begin(ms(0));
        assert_eq!(pvt.state(), RunState::Finished);
        let record = pvt.record().unwrap();
        assert_eq!(record.mean_rt_ms, None);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("mean_rt_ms").is_none());
    }
}
