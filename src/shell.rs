//! Navigation shell
//!
//! The menu that picks the next test, and the full-screen error shown when
//! the data directory cannot be used.

use crate::runner::Screen;
use crate::types::{InputEvent, Key, Rect, RunState, TestKind, Viewport};
use std::time::Duration;

/// What the subject picked from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Test(TestKind),
    Quit,
}

impl MenuChoice {
    /// Menu entries in display order
    pub const ENTRIES: [MenuChoice; 6] = [
        MenuChoice::Test(TestKind::Pvt),
        MenuChoice::Test(TestKind::DigitSpan),
        MenuChoice::Test(TestKind::Dsst),
        MenuChoice::Test(TestKind::Sleepiness),
        MenuChoice::Test(TestKind::Feelings),
        MenuChoice::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::Test(kind) => kind.title(),
            MenuChoice::Quit => "Quit",
        }
    }

    pub fn test(&self) -> Option<TestKind> {
        match self {
            MenuChoice::Test(kind) => Some(*kind),
            MenuChoice::Quit => None,
        }
    }
}

const MENU_BUTTON_WIDTH: f32 = 360.0;
const MENU_BUTTON_HEIGHT: f32 = 50.0;
const MENU_TOP: f32 = 130.0;
const MENU_STEP: f32 = 62.0;

/// Hit area of the menu entry at `index`
pub fn menu_button_rect(viewport: Viewport, index: usize) -> Rect {
    Rect::new(
        viewport.center_x() - MENU_BUTTON_WIDTH / 2.0,
        MENU_TOP + index as f32 * MENU_STEP,
        MENU_BUTTON_WIDTH,
        MENU_BUTTON_HEIGHT,
    )
}

/// Test picker
#[derive(Debug, Clone)]
pub struct Menu {
    viewport: Viewport,
    status: Option<String>,
    /// Entry under the pointer or keyboard focus
    highlighted: Option<usize>,
    choice: Option<MenuChoice>,
}

impl Menu {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            status: None,
            highlighted: None,
            choice: None,
        }
    }

    /// Summary line of the previous run
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn entry_at(&self, x: f32, y: f32) -> Option<usize> {
        (0..MenuChoice::ENTRIES.len()).find(|&i| menu_button_rect(self.viewport, i).contains(x, y))
    }

    fn choose(&mut self, index: usize) {
        self.choice = MenuChoice::ENTRIES.get(index).copied();
    }

    fn move_highlight(&mut self, forward: bool) {
        let count = MenuChoice::ENTRIES.len();
        self.highlighted = Some(match (self.highlighted, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
    }
}

impl Screen for Menu {
    type Output = MenuChoice;

    fn handle_event(&mut self, event: &InputEvent, _now: Duration) {
        if self.choice.is_some() {
            return;
        }
        if event.is_cancel() {
            self.choice = Some(MenuChoice::Quit);
            return;
        }
        match *event {
            InputEvent::KeyDown(Key::Down) | InputEvent::KeyDown(Key::Tab) => {
                self.move_highlight(true)
            }
            InputEvent::KeyDown(Key::Up) => self.move_highlight(false),
            InputEvent::KeyDown(Key::Enter) => {
                if let Some(index) = self.highlighted {
                    self.choose(index);
                }
            }
            InputEvent::KeyDown(Key::Char('q')) => self.choice = Some(MenuChoice::Quit),
            InputEvent::KeyDown(key) => {
                if let Some(digit @ 1..=5) = key.digit() {
                    self.choose(digit as usize - 1);
                }
            }
            InputEvent::PointerDown { x, y } => {
                if let Some(index) = self.entry_at(x, y) {
                    self.choose(index);
                }
            }
            InputEvent::PointerMoved { x, y } => {
                if let Some(index) = self.entry_at(x, y) {
                    self.highlighted = Some(index);
                }
            }
            InputEvent::Quit => {}
        }
    }

    fn state(&self) -> RunState {
        match self.choice {
            Some(_) => RunState::Finished,
            None => RunState::Running,
        }
    }

    fn finish(self) -> MenuChoice {
        self.choice.unwrap_or(MenuChoice::Quit)
    }
}

/// Full-screen report of a failed data directory check
#[derive(Debug, Clone)]
pub struct SetupErrorScreen {
    viewport: Viewport,
    message: String,
    acknowledged: bool,
}

impl SetupErrorScreen {
    pub fn new(viewport: Viewport, message: impl Into<String>) -> Self {
        Self {
            viewport,
            message: message.into(),
            acknowledged: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_button(&self) -> Rect {
        Rect::new(
            self.viewport.center_x() - 100.0,
            self.viewport.height - 150.0,
            200.0,
            50.0,
        )
    }
}

impl Screen for SetupErrorScreen {
    type Output = ();

    fn handle_event(&mut self, event: &InputEvent, _now: Duration) {
        self.acknowledged |= match *event {
            InputEvent::Quit => true,
            InputEvent::KeyDown(Key::Enter | Key::Escape | Key::Char(' ')) => true,
            InputEvent::PointerDown { x, y } => self.exit_button().contains(x, y),
            _ => false,
        };
    }

    fn state(&self) -> RunState {
        if self.acknowledged {
            RunState::Finished
        } else {
            RunState::Running
        }
    }

    fn finish(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(c: char) -> InputEvent {
        InputEvent::KeyDown(Key::Char(c))
    }

    #[test]
    fn test_digit_keys_pick_tests() {
        for (c, kind) in ('1'..='5').zip(TestKind::ALL) {
            let mut menu = Menu::new(Viewport::default());
            menu.handle_event(&key(c), Duration::ZERO);
            assert_eq!(menu.finish(), MenuChoice::Test(kind));
        }
        let mut menu = Menu::new(Viewport::default());
        menu.handle_event(&key('6'), Duration::ZERO);
        assert_eq!(menu.state(), RunState::Running);
    }

    #[test]
    fn test_click_and_hover() {
        let mut menu = Menu::new(Viewport::default());
        let (x, y) = menu_button_rect(menu.viewport(), 2).center();
        menu.handle_event(&InputEvent::PointerMoved { x, y }, Duration::ZERO);
        assert_eq!(menu.highlighted(), Some(2));
        menu.handle_event(&InputEvent::PointerDown { x, y }, Duration::ZERO);
        assert_eq!(menu.finish(), MenuChoice::Test(TestKind::Dsst));
    }

    #[test]
    fn test_keyboard_focus_wraps() {
        let mut menu = Menu::new(Viewport::default());
        menu.handle_event(&InputEvent::KeyDown(Key::Up), Duration::ZERO);
        assert_eq!(menu.highlighted(), Some(5));
        menu.handle_event(&InputEvent::KeyDown(Key::Down), Duration::ZERO);
        assert_eq!(menu.highlighted(), Some(0));
        menu.handle_event(&InputEvent::KeyDown(Key::Enter), Duration::ZERO);
        assert_eq!(menu.finish(), MenuChoice::Test(TestKind::Pvt));
    }

    #[test]
    fn test_escape_quits() {
        let mut menu = Menu::new(Viewport::default());
        menu.handle_event(&InputEvent::KeyDown(Key::Escape), Duration::ZERO);
        assert_eq!(menu.finish(), MenuChoice::Quit);
    }

    #[test]
    fn test_setup_error_acknowledgement() {
        let mut screen = SetupErrorScreen::new(Viewport::default(), "cannot write");
        screen.handle_event(&key('x'), Duration::ZERO);
        screen.handle_event(&InputEvent::PointerDown { x: 0.0, y: 0.0 }, Duration::ZERO);
        assert_eq!(screen.state(), RunState::Running);

        let (x, y) = screen.exit_button().center();
        screen.handle_event(&InputEvent::PointerDown { x, y }, Duration::ZERO);
        assert_eq!(screen.state(), RunState::Finished);
    }
}
