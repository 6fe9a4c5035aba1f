//! Digit symbol substitution test
//!
//! Rounds of glyphs are shown against a fixed digit-to-glyph key; the
//! subject types the digit for each glyph left to right until the timer runs
//! out.

use crate::config::{DsstConfig, SymbolMap};
use crate::random::RandomSource;
use crate::runner::{Assessment, Screen};
use crate::types::{InputEvent, Key, RunState, TestKind};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DsstScore {
    pub correct_count: usize,
    pub total_attempted: usize,
    /// `correct / attempted`, or 0 when nothing was attempted
    pub accuracy: f64,
}

impl DsstScore {
    pub fn new(correct_count: usize, total_attempted: usize) -> Self {
        let accuracy = if total_attempted == 0 {
            0.0
        } else {
            correct_count as f64 / total_attempted as f64
        };
        Self {
            correct_count,
            total_attempted,
            accuracy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DsstRecord {
    pub test_type: String,
    pub session_id: Uuid,
    pub duration_seconds: f64,
    pub correct_count: usize,
    pub total_attempted: usize,
    pub accuracy: f64,
    pub symbol_map: SymbolMap,
}

#[derive(Debug, Clone)]
pub struct Dsst<R: RandomSource> {
    config: DsstConfig,
    rng: R,
    session_id: Uuid,
    started_at: Option<Duration>,
    /// Glyphs of the current round
    glyphs: Vec<char>,
    /// Digit entered at each position of the current round
    responses: Vec<Option<u8>>,
    position: usize,
    /// Glyphs in fully completed rounds
    completed: usize,
    /// Correct answers in fully completed rounds
    committed_correct: usize,
    state: RunState,
    final_score: Option<DsstScore>,
}

impl<R: RandomSource> Dsst<R> {
    pub fn new(config: DsstConfig, rng: R) -> Self {
        let mut test = Self {
            config,
            rng,
            session_id: Uuid::new_v4(),
            started_at: None,
            glyphs: Vec::new(),
            responses: Vec::new(),
            position: 0,
            completed: 0,
            committed_correct: 0,
            state: RunState::Running,
            final_score: None,
        };
        test.new_round();
        test
    }

    pub fn symbols(&self) -> &SymbolMap {
        &self.config.symbols
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    pub fn responses(&self) -> &[Option<u8>] {
        &self.responses
    }

    /// Next position to fill in the current round
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the response at `index` matches its glyph
    pub fn is_correct_at(&self, index: usize) -> Option<bool> {
        let digit = self.responses.get(index).copied().flatten()?;
        let glyph = self.glyphs.get(index)?;
        Some(self.config.symbols.glyph(digit) == Some(*glyph))
    }

    fn round_correct(&self) -> usize {
        (0..self.position)
            .filter(|&i| self.is_correct_at(i) == Some(true))
            .count()
    }

    /// Live score: committed rounds plus the current round's filled positions
    pub fn score(&self) -> DsstScore {
        if let Some(score) = self.final_score {
            return score;
        }
        DsstScore::new(
            self.committed_correct + self.round_correct(),
            self.completed + self.position,
        )
    }

    /// Time left on the clock at `now`
    pub fn remaining(&self, now: Duration) -> Duration {
        match self.started_at {
            Some(start) => self
                .config
                .duration
                .saturating_sub(now.saturating_sub(start)),
            None => self.config.duration,
        }
    }

    fn new_round(&mut self) {
        let len = self.config.round_length;
        let symbols = &self.config.symbols;
        let rng = &mut self.rng;
        self.glyphs = (0..len)
            .filter_map(|_| symbols.glyph(rng.int_inclusive(1, 9)))
            .collect();
        self.responses = vec![None; self.glyphs.len()];
        self.position = 0;
    }

    fn enter(&mut self, digit: u8) {
        if !(1..=9).contains(&digit) || self.position >= self.glyphs.len() {
            return;
        }
        self.responses[self.position] = Some(digit);
        self.position += 1;

        if self.position >= self.glyphs.len() {
            self.committed_correct += self.round_correct();
            self.completed += self.glyphs.len();
            debug!(completed = self.completed, correct = self.committed_correct, "dsst round complete");
            self.new_round();
        }
    }

    fn retract(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.responses[self.position] = None;
        }
    }

    fn check_timer(&mut self, now: Duration) {
        if self.state.is_running() && self.remaining(now).is_zero() {
            self.final_score = Some(self.score());
            self.state = RunState::Finished;
        }
    }
}

impl<R: RandomSource> Screen for Dsst<R> {
    type Output = DsstScore;

    fn begin(&mut self, now: Duration) {
        self.started_at = Some(now);
    }

    fn handle_event(&mut self, event: &InputEvent, now: Duration) {
        self.check_timer(now);
        if !self.state.is_running() {
            return;
        }
        if event.is_cancel() {
            self.state = RunState::Cancelled;
            return;
        }
        match event {
            InputEvent::KeyDown(Key::Backspace) => self.retract(),
            InputEvent::KeyDown(key) => {
                if let Some(digit) = key.digit() {
                    self.enter(digit);
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, now: Duration) {
        self.check_timer(now);
    }

    fn state(&self) -> RunState {
        self.state
    }

    fn finish(self) -> DsstScore {
        self.score()
    }
}

impl<R: RandomSource> Assessment for Dsst<R> {
    type Record = DsstRecord;

    fn kind(&self) -> TestKind {
        TestKind::Dsst
    }

    fn record(&self) -> Option<DsstRecord> {
        let score = self.final_score?;
        Some(DsstRecord {
            test_type: TestKind::Dsst.test_type().to_string(),
            session_id: self.session_id,
            duration_seconds: self.config.duration.as_secs_f64(),
            correct_count: score.correct_count,
            total_attempted: score.total_attempted,
            accuracy: score.accuracy,
            symbol_map: self.config.symbols.clone(),
        })
    }
}
