//! Digit span memory test
//!
//! A random sequence of digits is shown one at a time and the subject types
//! it back: verbatim in the forward direction, reversed in the backward one.
//! Span length grows while at least one of the trials at the current length
//! is answered correctly.

use crate::config::DigitSpanConfig;
use crate::random::RandomSource;
use crate::runner::{Assessment, Screen};
use crate::types::{InputEvent, Key, RunState, TestKind};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Recall direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

/// Answer the subject must type for `sequence` in `direction`
pub fn expected_response(sequence: &[u8], direction: Direction) -> Vec<u8> {
    match direction {
        Direction::Forward => sequence.to_vec(),
        Direction::Backward => sequence.iter().rev().copied().collect(),
    }
}

pub fn check_answer(sequence: &[u8], answer: &[u8], direction: Direction) -> bool {
    expected_response(sequence, direction) == answer
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DigitSpanPhase {
    /// Waiting for Space before the next sequence
    Instructions,
    /// Digit `index` visible since `since`
    Showing { index: usize, since: Duration },
    Input,
    Feedback { since: Duration, correct: bool },
    Finished,
    Cancelled,
}

/// One answered sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanTrial {
    pub span: usize,
    pub sequence: Vec<u8>,
    pub user_input: Vec<u8>,
    pub correct: bool,
    pub forward: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitSpanScore {
    pub forward_span: usize,
    pub backward_span: usize,
    pub total_span: usize,
    pub forward_trials: usize,
    pub backward_trials: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitSpanRecord {
    pub test_type: String,
    pub session_id: Uuid,
    pub forward_span: usize,
    pub backward_span: usize,
    pub total_span: usize,
    pub forward_trial_count: usize,
    pub backward_trial_count: usize,
    pub forward_trials: Vec<SpanTrial>,
    pub backward_trials: Vec<SpanTrial>,
}

#[derive(Debug, Clone)]
pub struct DigitSpan<R: RandomSource> {
    config: DigitSpanConfig,
    rng: R,
    session_id: Uuid,
    phase: DigitSpanPhase,
    direction: Direction,
    span: usize,
    /// Trial index within the current span
    trial: usize,
    sequence: Vec<u8>,
    input: Vec<u8>,
    forward_span: usize,
    backward_span: usize,
    forward_trials: Vec<SpanTrial>,
    backward_trials: Vec<SpanTrial>,
}

impl<R: RandomSource> DigitSpan<R> {
    pub fn new(config: DigitSpanConfig, rng: R) -> Self {
        let span = config.start_span;
        let mut test = Self {
            config,
            rng,
            session_id: Uuid::new_v4(),
            phase: DigitSpanPhase::Instructions,
            direction: Direction::Forward,
            span,
            trial: 0,
            sequence: Vec::new(),
            input: Vec::new(),
            forward_span: 0,
            backward_span: 0,
            forward_trials: Vec::new(),
            backward_trials: Vec::new(),
        };
        test.generate_sequence();
        test
    }

    pub fn phase(&self) -> DigitSpanPhase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn span(&self) -> usize {
        self.span
    }

    /// Zero-based trial index within the current span
    pub fn trial(&self) -> usize {
        self.trial
    }

    pub fn trials_per_span(&self) -> usize {
        self.config.trials_per_span
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Digit currently on screen while showing
    pub fn current_digit(&self) -> Option<u8> {
        match self.phase {
            DigitSpanPhase::Showing { index, .. } => self.sequence.get(index).copied(),
            _ => None,
        }
    }

    pub fn expected(&self) -> Vec<u8> {
        expected_response(&self.sequence, self.direction)
    }

    pub fn trials(&self, direction: Direction) -> &[SpanTrial] {
        match direction {
            Direction::Forward => &self.forward_trials,
            Direction::Backward => &self.backward_trials,
        }
    }

    pub fn score(&self) -> DigitSpanScore {
        DigitSpanScore {
            forward_span: self.forward_span,
            backward_span: self.backward_span,
            total_span: self.forward_span + self.backward_span,
            forward_trials: self.forward_trials.len(),
            backward_trials: self.backward_trials.len(),
        }
    }

    fn generate_sequence(&mut self) {
        let span = self.span;
        self.sequence = (0..span).map(|_| self.rng.int_inclusive(0, 9)).collect();
        self.input.clear();
    }

    fn submit(&mut self, now: Duration) {
        while self.input.len() < self.span {
            self.input.push(0);
        }
        let correct = check_answer(&self.sequence, &self.input, self.direction);
        let trial = SpanTrial {
            span: self.span,
            sequence: self.sequence.clone(),
            user_input: self.input.clone(),
            correct,
            forward: self.direction == Direction::Forward,
        };
        debug!(span = self.span, correct, direction = ?self.direction, "digit span trial");
        match self.direction {
            Direction::Forward => self.forward_trials.push(trial),
            Direction::Backward => self.backward_trials.push(trial),
        }
        self.phase = DigitSpanPhase::Feedback {
            since: now,
            correct,
        };
    }

    /// Move past feedback: progress span or direction, or finish
    fn advance(&mut self) {
        self.trial += 1;

        if self.trial >= self.config.trials_per_span {
            self.trial = 0;
            let span = self.span;
            let passed = self
                .trials(self.direction)
                .iter()
                .any(|t| t.span == span && t.correct);

            let direction_over = if passed {
                match self.direction {
                    Direction::Forward => self.forward_span = span,
                    Direction::Backward => self.backward_span = span,
                }
                self.span += 1;
                self.span > self.config.max_span
            } else {
                true
            };

            if direction_over {
                match self.direction {
                    Direction::Forward => {
                        info!(forward_span = self.forward_span, "forward digit span complete");
                        self.direction = Direction::Backward;
                        self.span = self.config.start_span;
                    }
                    Direction::Backward => {
                        self.phase = DigitSpanPhase::Finished;
                        return;
                    }
                }
            }
        }

        self.generate_sequence();
        self.phase = DigitSpanPhase::Instructions;
    }

    fn handle_key(&mut self, key: Key, now: Duration) {
        match self.phase {
            DigitSpanPhase::Instructions => {
                if key.is_space() {
                    self.phase = DigitSpanPhase::Showing {
                        index: 0,
                        since: now,
                    };
                }
            }
            DigitSpanPhase::Input => match key {
                Key::Backspace => {
                    self.input.pop();
                }
                Key::Enter if !self.input.is_empty() => self.submit(now),
                key => {
                    if let Some(digit) = key.digit() {
                        self.input.push(digit);
                        if self.input.len() >= self.span {
                            self.submit(now);
                        }
                    }
                }
            },
            DigitSpanPhase::Feedback { .. } => {
                if key.is_space() {
                    self.advance();
                }
            }
            _ => {}
        }
    }
}

impl<R: RandomSource> Screen for DigitSpan<R> {
    type Output = DigitSpanScore;

    fn handle_event(&mut self, event: &InputEvent, now: Duration) {
        if !self.state().is_running() {
            return;
        }
        if event.is_cancel() {
            self.phase = DigitSpanPhase::Cancelled;
            return;
        }
        if let InputEvent::KeyDown(key) = event {
            self.handle_key(*key, now);
        }
    }

    fn tick(&mut self, now: Duration) {
        match self.phase {
            DigitSpanPhase::Showing { index, since } => {
                if now.saturating_sub(since) >= self.config.digit_duration {
                    let next = index + 1;
                    self.phase = if next >= self.sequence.len() {
                        DigitSpanPhase::Input
                    } else {
                        DigitSpanPhase::Showing {
                            index: next,
                            since: now,
                        }
                    };
                }
            }
            DigitSpanPhase::Feedback { since, .. } => {
                if now.saturating_sub(since) >= self.config.feedback_duration {
                    self.advance();
                }
            }
            _ => {}
        }
    }

    fn state(&self) -> RunState {
        match self.phase {
            DigitSpanPhase::Finished => RunState::Finished,
            DigitSpanPhase::Cancelled => RunState::Cancelled,
            _ => RunState::Running,
        }
    }

    fn finish(self) -> DigitSpanScore {
        self.score()
    }
}

impl<R: RandomSource> Assessment for DigitSpan<R> {
    type Record = DigitSpanRecord;

    fn kind(&self) -> TestKind {
        TestKind::DigitSpan
    }

    fn record(&self) -> Option<DigitSpanRecord> {
        if self.phase != DigitSpanPhase::Finished {
            return None;
        }
        let score = self.score();
        Some(DigitSpanRecord {
            test_type: TestKind::DigitSpan.test_type().to_string(),
            session_id: self.session_id,
            forward_span: score.forward_span,
            backward_span: score.backward_span,
            total_span: score.total_span,
            forward_trial_count: score.forward_trials,
            backward_trial_count: score.backward_trials,
            forward_trials: self.forward_trials.clone(),
            backward_trials: self.backward_trials.clone(),
        })
    }
}
