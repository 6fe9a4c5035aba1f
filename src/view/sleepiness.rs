use super::wrap_text;
use crate::runner::Render;
use crate::scene::{Color, Scene, TextSize};
use crate::tasks::sleepiness::{rating_button_rect, Sleepiness};
use std::time::Duration;

/// Width the description preview wraps at
pub const DESCRIPTION_WIDTH: f32 = 600.0;

impl Render for Sleepiness {
    fn render(&self, _now: Duration, scene: &mut Scene) {
        let viewport = scene.viewport();
        let cx = viewport.center_x();

        scene.clear(Color::WHITE);
        scene.text_centered("Stanford Sleepiness Scale", cx, 30.0, TextSize::Title, Color::BLACK);
        scene.text_centered("How do you feel right now?", cx, 100.0, TextSize::Normal, Color::BLACK);

        for rating in self.scale().ratings() {
            let rect = rating_button_rect(viewport, rating);
            let (fill, text) = if self.selected() == Some(rating) {
                (Color::GREEN, Color::WHITE)
            } else if self.hovered() == Some(rating) {
                (Color::LIGHT_BLUE, Color::BLACK)
            } else {
                (Color::LIGHT_GRAY, Color::BLACK)
            };
            scene.button(rect, &rating.to_string(), fill, text);
        }

        if let Some(description) = self.preview() {
            let top = viewport.center_y() + 120.0;
            for (i, line) in wrap_text(description, DESCRIPTION_WIDTH, TextSize::Normal)
                .into_iter()
                .enumerate()
            {
                scene.text_centered(line, cx, top + i as f32 * 30.0, TextSize::Normal, Color::BLACK);
            }
        }

        let footer = [
            "Click a number or press 1-7 to select your rating",
            "Press ESC to cancel",
        ];
        for (i, line) in footer.iter().enumerate() {
            scene.text_centered(
                *line,
                cx,
                viewport.height - 60.0 + i as f32 * 25.0,
                TextSize::Small,
                Color::GRAY,
            );
        }
    }
}
