//! Render/input adapter boundary
//!
//! The frame loop only talks to the host through [`Frontend`]: a clock read,
//! a per-frame event queue, a present call for the finished [`Scene`], and a
//! pacing call that caps the loop rate.

use crate::error::RunError;
use crate::scene::Scene;
use crate::types::{InputEvent, Key};
use std::collections::VecDeque;
use std::time::Duration;

/// Host graphics and input toolkit as seen by the frame loop
pub trait Frontend {
    /// Elapsed time since an arbitrary fixed origin
    fn now(&self) -> Duration;

    /// Events queued since the previous call; empty is a valid frame
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, RunError>;

    /// Display the finished frame
    fn present(&mut self, scene: &Scene) -> Result<(), RunError>;

    /// Wait out the rest of the frame budget
    fn pace(&mut self);
}

/// Scripted frontend for driving state machines without a terminal.
///
/// Each queued frame delivers its events in one poll. Virtual time advances
/// by one frame interval per [`Frontend::pace`] call. Once the frame limit is
/// reached every poll returns [`InputEvent::Quit`], so a stalled script can
/// never hang a test.
#[derive(Debug, Clone)]
pub struct HeadlessFrontend {
    now: Duration,
    frame: Duration,
    script: VecDeque<Vec<InputEvent>>,
    frames_presented: usize,
    frame_limit: usize,
    last_scene: Option<Scene>,
}

impl HeadlessFrontend {
    pub const DEFAULT_FRAME_LIMIT: usize = 60 * 60 * 10;

    pub fn new(frame_rate: u32) -> Self {
        Self {
            now: Duration::ZERO,
            frame: Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64),
            script: VecDeque::new(),
            frames_presented: 0,
            frame_limit: Self::DEFAULT_FRAME_LIMIT,
            last_scene: None,
        }
    }

    pub fn with_frame_limit(mut self, limit: usize) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Queue one frame carrying `events`
    pub fn frame(mut self, events: impl IntoIterator<Item = InputEvent>) -> Self {
        self.script.push_back(events.into_iter().collect());
        self
    }

    /// Queue idle frames covering at least `duration`
    pub fn wait(mut self, duration: Duration) -> Self {
        let frames = (duration.as_secs_f64() / self.frame.as_secs_f64()).ceil() as usize;
        for _ in 0..frames {
            self.script.push_back(Vec::new());
        }
        self
    }

    /// Queue one key press per frame
    pub fn keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        for key in keys {
            self.script.push_back(vec![InputEvent::KeyDown(key)]);
        }
        self
    }

    /// Queue one character key press per frame
    pub fn type_text(self, text: &str) -> Self {
        self.keys(text.chars().map(Key::Char))
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame
    }

    pub fn last_scene(&self) -> Option<&Scene> {
        self.last_scene.as_ref()
    }

    /// Frames still queued
    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl Frontend for HeadlessFrontend {
    fn now(&self) -> Duration {
        self.now
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>, RunError> {
        if self.frames_presented >= self.frame_limit {
            return Ok(vec![InputEvent::Quit]);
        }
        Ok(self.script.pop_front().unwrap_or_default())
    }

    fn present(&mut self, scene: &Scene) -> Result<(), RunError> {
        self.frames_presented += 1;
        self.last_scene = Some(scene.clone());
        Ok(())
    }

    fn pace(&mut self) {
        self.now += self.frame;
    }
}
