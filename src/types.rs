//! Core types shared by every test
//!
//! This module defines the input events the frontend delivers once per frame,
//! the screen geometry the presenters and hit-tests agree on, and the
//! identifiers used to tag and file each Session Result.

use serde::{Deserialize, Serialize};

/// Symbolic key identifier delivered with a key-down event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character, including digits and the space bar
    Char(char),
    Enter,
    Backspace,
    Escape,
    Tab,
    Up,
    Down,
    Other,
}

impl Key {
    /// Numeric value of a digit key (`0`-`9`)
    pub fn digit(&self) -> Option<u8> {
        match self {
            Key::Char(c) => c.to_digit(10).map(|d| d as u8),
            _ => None,
        }
    }

    pub fn is_space(&self) -> bool {
        matches!(self, Key::Char(' '))
    }
}

/// Discrete input event, polled once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    /// Primary pointer button pressed at logical coordinates
    PointerDown { x: f32, y: f32 },
    /// Pointer moved to logical coordinates
    PointerMoved { x: f32, y: f32 },
    /// Window close / process quit request
    Quit,
}

impl InputEvent {
    /// Explicit quit input: window close or Escape
    pub fn is_cancel(&self) -> bool {
        matches!(self, InputEvent::Quit | InputEvent::KeyDown(Key::Escape))
    }
}

/// Lifecycle of a state machine as seen by the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Terminal state reached naturally; results may be persisted
    Finished,
    /// Quit or escape; nothing is persisted
    Cancelled,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

/// Axis-aligned rectangle in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment test, matching pixel hit-testing
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Logical drawing surface size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.height / 2.0
    }
}

/// Identifier for each test in the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Pvt,
    DigitSpan,
    Dsst,
    Sleepiness,
    Feelings,
}

impl TestKind {
    pub const ALL: [TestKind; 5] = [
        TestKind::Pvt,
        TestKind::DigitSpan,
        TestKind::Dsst,
        TestKind::Sleepiness,
        TestKind::Feelings,
    ];

    /// Value of the `test_type` field in persisted records
    pub fn test_type(&self) -> &'static str {
        match self {
            TestKind::Pvt => "psychomotor_vigilance_task",
            TestKind::DigitSpan => "digit_span",
            TestKind::Dsst => "digit_symbol_substitution_test",
            TestKind::Sleepiness => "stanford_sleepiness_scale",
            TestKind::Feelings => "subjective_feelings",
        }
    }

    /// File stem used for this test's store
    pub fn file_stem(&self) -> &'static str {
        match self {
            TestKind::Pvt => "pvt",
            TestKind::DigitSpan => "digit_span",
            TestKind::Dsst => "dsst",
            TestKind::Sleepiness => "sss",
            TestKind::Feelings => "feelings",
        }
    }

    /// Human readable title
    pub fn title(&self) -> &'static str {
        match self {
            TestKind::Pvt => "Psychomotor Vigilance Task",
            TestKind::DigitSpan => "Digit Span",
            TestKind::Dsst => "Digit Symbol Substitution",
            TestKind::Sleepiness => "Stanford Sleepiness Scale",
            TestKind::Feelings => "Subjective Feelings",
        }
    }

    /// Parse either a file stem or a `test_type` tag
    pub fn from_name(name: &str) -> Option<TestKind> {
        TestKind::ALL
            .into_iter()
            .find(|kind| kind.file_stem() == name || kind.test_type() == name)
    }
}
