//! Stanford Sleepiness Scale
//!
//! Single-shot 1-7 rating. A digit key or a click on a rating button
//! submits immediately; moving the pointer over a button only previews its
//! description.

use crate::config::SleepinessScale;
use crate::runner::{Assessment, Screen};
use crate::types::{InputEvent, Key, Rect, RunState, TestKind, Viewport};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

const BUTTON_WIDTH: f32 = 60.0;
const BUTTON_HEIGHT: f32 = 50.0;
const BUTTON_GAP: f32 = 10.0;

/// Hit area of the button for `rating` (1-7)
pub fn rating_button_rect(viewport: Viewport, rating: u8) -> Rect {
    let count = SleepinessScale::MAX_RATING as f32;
    let row_width = count * BUTTON_WIDTH + (count - 1.0) * BUTTON_GAP;
    let start_x = viewport.center_x() - row_width / 2.0;
    let offset = rating.saturating_sub(1) as f32;
    Rect::new(
        start_x + offset * (BUTTON_WIDTH + BUTTON_GAP),
        viewport.center_y() + 50.0,
        BUTTON_WIDTH,
        BUTTON_HEIGHT,
    )
}

/// Rating whose button contains the point
pub fn rating_at(viewport: Viewport, x: f32, y: f32) -> Option<u8> {
    (SleepinessScale::MIN_RATING..=SleepinessScale::MAX_RATING)
        .find(|&rating| rating_button_rect(viewport, rating).contains(x, y))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepinessRecord {
    pub test_type: String,
    pub session_id: Uuid,
    pub rating: u8,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Sleepiness {
    scale: SleepinessScale,
    viewport: Viewport,
    session_id: Uuid,
    selected: Option<u8>,
    hovered: Option<u8>,
    state: RunState,
}

impl Sleepiness {
    pub fn new(scale: SleepinessScale, viewport: Viewport) -> Self {
        Self {
            scale,
            viewport,
            session_id: Uuid::new_v4(),
            selected: None,
            hovered: None,
            state: RunState::Running,
        }
    }

    pub fn scale(&self) -> &SleepinessScale {
        &self.scale
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selected(&self) -> Option<u8> {
        self.selected
    }

    pub fn hovered(&self) -> Option<u8> {
        self.hovered
    }

    /// Description to show: the hovered rating wins over the selected one
    pub fn preview(&self) -> Option<&'static str> {
        self.hovered
            .or(self.selected)
            .and_then(|rating| self.scale.description(rating))
    }

    fn select(&mut self, rating: u8) {
        if self.scale.description(rating).is_some() {
            self.selected = Some(rating);
            self.state = RunState::Finished;
        }
    }
}

impl Screen for Sleepiness {
    type Output = Option<u8>;

    fn handle_event(&mut self, event: &InputEvent, _now: Duration) {
        if !self.state.is_running() {
            return;
        }
        if event.is_cancel() {
            self.state = RunState::Cancelled;
            return;
        }
        match *event {
            InputEvent::KeyDown(key @ Key::Char(_)) => {
                if let Some(rating) = key.digit() {
                    self.select(rating);
                }
            }
            InputEvent::PointerDown { x, y } => {
                if let Some(rating) = rating_at(self.viewport, x, y) {
                    self.select(rating);
                }
            }
            InputEvent::PointerMoved { x, y } => {
                self.hovered = rating_at(self.viewport, x, y);
            }
            _ => {}
        }
    }

    fn state(&self) -> RunState {
        self.state
    }

    fn finish(self) -> Option<u8> {
        match self.state {
            RunState::Finished => self.selected,
            _ => None,
        }
    }
}

impl Assessment for Sleepiness {
    type Record = SleepinessRecord;

    fn kind(&self) -> TestKind {
        TestKind::Sleepiness
    }

    fn record(&self) -> Option<SleepinessRecord> {
        if self.state != RunState::Finished {
            return None;
        }
        let rating = self.selected?;
        Some(SleepinessRecord {
            test_type: TestKind::Sleepiness.test_type().to_string(),
            session_id: self.session_id,
            rating,
            description: self.scale.description(rating)?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sss() -> Sleepiness {
        Sleepiness::new(SleepinessScale::stanford(), Viewport::default())
    }

    fn now() -> Duration {
        Duration::ZERO
    }

    #[test]
    fn test_button_layout() {
        let viewport = Viewport::default();
        let first = rating_button_rect(viewport, 1);
        let last = rating_button_rect(viewport, 7);
        assert_eq!(first, Rect::new(160.0, 350.0, 60.0, 50.0));
        assert_eq!(last.x, 160.0 + 6.0 * 70.0);
        assert_eq!(rating_at(viewport, 165.0, 360.0), Some(1));
        assert_eq!(rating_at(viewport, 225.0, 360.0), None);
        assert_eq!(rating_at(viewport, 165.0, 100.0), None);
    }

    #[test]
    fn test_key_selects_immediately() {
        let mut test = sss();
        test.handle_event(&InputEvent::KeyDown(Key::Char('4')), now());
        assert_eq!(test.state(), RunState::Finished);
        let record = test.record().unwrap();
        assert_eq!(record.rating, 4);
        assert_eq!(record.description, "Somewhat foggy, let down");
        assert_eq!(test.finish(), Some(4));
    }

    #[test]
    fn test_out_of_range_keys_ignored() {
        let mut test = sss();
        test.handle_event(&InputEvent::KeyDown(Key::Char('8')), now());
        test.handle_event(&InputEvent::KeyDown(Key::Char('0')), now());
        test.handle_event(&InputEvent::KeyDown(Key::Enter), now());
        assert_eq!(test.state(), RunState::Running);
    }

    #[test]
    fn test_hover_previews_without_selecting() {
        let mut test = sss();
        let (x, y) = rating_button_rect(test.viewport(), 6).center();
        test.handle_event(&InputEvent::PointerMoved { x, y }, now());
        assert_eq!(test.hovered(), Some(6));
        assert_eq!(test.state(), RunState::Running);
        assert_eq!(
            test.preview(),
            Some("Sleepy, woozy, fighting sleep; prefer to lie down")
        );
        test.handle_event(&InputEvent::PointerMoved { x: 0.0, y: 0.0 }, now());
        assert_eq!(test.preview(), None);
    }

    #[test]
    fn test_click_selects() {
        let mut test = sss();
        let (x, y) = rating_button_rect(test.viewport(), 2).center();
        test.handle_event(&InputEvent::PointerDown { x, y }, now());
        assert_eq!(test.finish(), Some(2));
    }

    #[test]
    fn test_cancel_returns_nothing() {
        let mut test = sss();
        test.handle_event(&InputEvent::Quit, now());
        assert!(test.record().is_none());
        assert_eq!(test.finish(), None);
    }
}
