//! Free-text feelings entry

use crate::config::FeelingsConfig;
use crate::runner::{Assessment, Screen};
use crate::types::{InputEvent, Key, Rect, RunState, TestKind, Viewport};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Fixed geometry of the entry form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeelingsLayout {
    pub text_box: Rect,
    pub submit: Rect,
    pub cancel: Rect,
}

impl FeelingsLayout {
    const BOX_WIDTH: f32 = 600.0;
    const BOX_HEIGHT: f32 = 100.0;
    const BOX_TOP: f32 = 300.0;
    const BUTTON_WIDTH: f32 = 120.0;
    const BUTTON_HEIGHT: f32 = 40.0;

    pub fn new(viewport: Viewport) -> Self {
        let text_box = Rect::new(
            (viewport.width - Self::BOX_WIDTH) / 2.0,
            Self::BOX_TOP,
            Self::BOX_WIDTH,
            Self::BOX_HEIGHT,
        );
        let buttons_y = text_box.y + text_box.height + 20.0;
        Self {
            text_box,
            submit: Rect::new(
                text_box.x + text_box.width - Self::BUTTON_WIDTH,
                buttons_y,
                Self::BUTTON_WIDTH,
                Self::BUTTON_HEIGHT,
            ),
            cancel: Rect::new(text_box.x, buttons_y, Self::BUTTON_WIDTH, Self::BUTTON_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeelingsRecord {
    pub test_type: String,
    pub session_id: Uuid,
    pub feeling_text: String,
    pub character_count: usize,
}

#[derive(Debug, Clone)]
pub struct Feelings {
    config: FeelingsConfig,
    layout: FeelingsLayout,
    session_id: Uuid,
    text: String,
    /// Last edit or focus; the cursor blink restarts here
    cursor_reset_at: Duration,
    state: RunState,
}

impl Feelings {
    pub fn new(config: FeelingsConfig, viewport: Viewport) -> Self {
        Self {
            config,
            layout: FeelingsLayout::new(viewport),
            session_id: Uuid::new_v4(),
            text: String::new(),
            cursor_reset_at: Duration::ZERO,
            state: RunState::Running,
        }
    }

    pub fn layout(&self) -> &FeelingsLayout {
        &self.layout
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_chars(&self) -> usize {
        self.config.max_chars
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Submission needs something other than whitespace
    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn cursor_visible(&self, now: Duration) -> bool {
        let blink = self.config.cursor_blink.as_millis().max(1);
        let elapsed = now.saturating_sub(self.cursor_reset_at).as_millis();
        (elapsed / blink) % 2 == 0
    }

    fn push(&mut self, c: char, now: Duration) {
        if c.is_control() || self.char_count() >= self.config.max_chars {
            return;
        }
        self.text.push(c);
        self.cursor_reset_at = now;
    }

    fn submit(&mut self) {
        if self.can_submit() {
            self.state = RunState::Finished;
        }
    }
}

impl Screen for Feelings {
    /// Trimmed text on submission
    type Output = Option<String>;

    fn begin(&mut self, now: Duration) {
        self.cursor_reset_at = now;
    }

    fn handle_event(&mut self, event: &InputEvent, now: Duration) {
        if !self.state.is_running() {
            return;
        }
        if event.is_cancel() {
            self.state = RunState::Cancelled;
            return;
        }
        match *event {
            InputEvent::KeyDown(Key::Enter) => self.submit(),
            InputEvent::KeyDown(Key::Backspace) => {
                self.text.pop();
                self.cursor_reset_at = now;
            }
            InputEvent::KeyDown(Key::Char(c)) => self.push(c, now),
            InputEvent::PointerDown { x, y } => {
                if self.layout.submit.contains(x, y) {
                    self.submit();
                } else if self.layout.cancel.contains(x, y) {
                    self.state = RunState::Cancelled;
                } else if self.layout.text_box.contains(x, y) {
                    self.cursor_reset_at = now;
                }
            }
            _ => {}
        }
    }

    fn state(&self) -> RunState {
        self.state
    }

    fn finish(self) -> Option<String> {
        match self.state {
            RunState::Finished => Some(self.text.trim().to_string()),
            _ => None,
        }
    }
}

impl Assessment for Feelings {
    type Record = FeelingsRecord;

    fn kind(&self) -> TestKind {
        TestKind::Feelings
    }

    fn record(&self) -> Option<FeelingsRecord> {
        if self.state != RunState::Finished {
            return None;
        }
        let feeling_text = self.text.trim().to_string();
        Some(FeelingsRecord {
            test_type: TestKind::Feelings.test_type().to_string(),
            session_id: self.session_id,
            character_count: feeling_text.chars().count(),
            feeling_text,
        })
    }
}
