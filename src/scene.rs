//! Retained draw list handed to the frontend once per frame
//!
//! Presenters fill a [`Scene`] from machine state; frontends rasterise it.
//! Coordinates are logical pixels with the origin at the top-left corner.

use crate::types::{Rect, Viewport};

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(255, 255, 255);
    pub const BLACK: Color = Color(0, 0, 0);
    pub const RED: Color = Color(255, 0, 0);
    pub const GREEN: Color = Color(0, 255, 0);
    pub const BLUE: Color = Color(70, 130, 180);
    pub const LIGHT_BLUE: Color = Color(173, 216, 230);
    pub const GRAY: Color = Color(128, 128, 128);
    pub const LIGHT_GRAY: Color = Color(200, 200, 200);
}

/// Font size class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Normal,
    Title,
    Large,
}

impl TextSize {
    /// Nominal line height in logical pixels
    pub fn line_height(&self) -> f32 {
        match self {
            TextSize::Small => 18.0,
            TextSize::Normal => 26.0,
            TextSize::Title => 34.0,
            TextSize::Large => 50.0,
        }
    }

    /// Fixed advance per character used for layout and wrapping
    pub fn char_width(&self) -> f32 {
        self.line_height() * 0.5
    }

    pub fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width()
    }
}

/// Horizontal anchor of a text run relative to its x coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
}

/// One draw primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: TextSize,
        color: Color,
        anchor: Anchor,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        width: f32,
    },
}

/// Ordered draw list for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop the previous frame's commands
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, color, width });
    }

    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: TextSize, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            size,
            color,
            anchor: Anchor::Left,
        });
    }

    /// Text horizontally centred on `cx`
    pub fn text_centered(
        &mut self,
        text: impl Into<String>,
        cx: f32,
        y: f32,
        size: TextSize,
        color: Color,
    ) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            x: cx,
            y,
            size,
            color,
            anchor: Anchor::Center,
        });
    }

    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            cx,
            cy,
            radius,
            color,
        });
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    /// Filled, outlined button with a centred label
    pub fn button(&mut self, rect: Rect, label: &str, fill: Color, text_color: Color) {
        self.fill_rect(rect, fill);
        self.stroke_rect(rect, Color::BLACK, 2.0);
        let (cx, cy) = rect.center();
        let size = TextSize::Normal;
        self.text_centered(label, cx, cy - size.line_height() / 2.0, size, text_color);
    }

    /// All text runs in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_emits_fill_outline_and_label() {
        let mut scene = Scene::new(Viewport::default());
        scene.button(Rect::new(0.0, 0.0, 100.0, 40.0), "Start", Color::BLUE, Color::WHITE);
        assert_eq!(scene.commands().len(), 3);
        assert!(scene.contains_text("Start"));
    }

    #[test]
    fn test_reset_drops_commands() {
        let mut scene = Scene::new(Viewport::default());
        scene.clear(Color::WHITE);
        scene.circle(1.0, 1.0, 1.0, Color::RED);
        scene.reset();
        assert!(scene.commands().is_empty());
    }

    #[test]
    fn test_measure_uses_fixed_advance() {
        assert_eq!(TextSize::Normal.measure("abcd"), 4.0 * TextSize::Normal.char_width());
        assert_eq!(TextSize::Small.measure(""), 0.0);
    }
}
