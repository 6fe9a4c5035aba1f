use super::{visible_lines, wrap_text};
use crate::runner::Render;
use crate::scene::{Color, Scene, TextSize};
use crate::tasks::Feelings;
use std::time::Duration;

const PADDING: f32 = 10.0;

impl Render for Feelings {
    fn render(&self, now: Duration, scene: &mut Scene) {
        let viewport = scene.viewport();
        let cx = viewport.center_x();
        let layout = *self.layout();
        let text_box = layout.text_box;

        scene.clear(Color::WHITE);
        scene.text_centered("How Are You Feeling?", cx, 150.0, TextSize::Title, Color::BLACK);
        scene.text_centered(
            "Please describe how you're feeling right now:",
            cx,
            220.0,
            TextSize::Normal,
            Color::BLACK,
        );

        scene.fill_rect(text_box, Color::WHITE);
        scene.stroke_rect(text_box, Color::BLACK, 2.0);

        let size = TextSize::Normal;
        let cursor_on = self.cursor_visible(now);
        if self.text().is_empty() && !cursor_on {
            scene.text(
                "Type here...",
                text_box.x + PADDING,
                text_box.y + PADDING,
                TextSize::Small,
                Color::GRAY,
            );
        } else {
            let lines = wrap_text(self.text(), text_box.width - 2.0 * PADDING, size);
            let fits = visible_lines(text_box.height - 2.0 * PADDING, size);
            let x = text_box.x + PADDING;
            let line_height = size.line_height();

            for (i, line) in lines.iter().take(fits).enumerate() {
                scene.text(line.as_str(), x, text_box.y + PADDING + i as f32 * line_height, size, Color::BLACK);
            }

            // cursor sits after the last line, hidden once the text overflows
            let last_index = lines.len().saturating_sub(1);
            if cursor_on && last_index < fits {
                let last = lines.last().map(String::as_str).unwrap_or("");
                let cursor_x = x + size.measure(last);
                let cursor_y = text_box.y + PADDING + last_index as f32 * line_height;
                scene.line(
                    (cursor_x, cursor_y),
                    (cursor_x, cursor_y + line_height),
                    Color::BLACK,
                    2.0,
                );
            }
        }

        let submit_fill = if self.can_submit() {
            Color::GREEN
        } else {
            Color::GRAY
        };
        scene.button(layout.submit, "Submit", submit_fill, Color::WHITE);
        scene.button(layout.cancel, "Cancel", Color::GRAY, Color::WHITE);

        let footer = [
            "Press Enter to submit, Escape to cancel".to_string(),
            format!("Maximum {} characters", self.max_chars()),
        ];
        for (i, line) in footer.into_iter().enumerate() {
            scene.text_centered(line, cx, 500.0 + i as f32 * 25.0, TextSize::Small, Color::GRAY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeelingsConfig;
    use crate::runner::Screen;
    use crate::scene::DrawCommand;
    use crate::types::{InputEvent, Key, Viewport};

    fn draw(test: &Feelings, now: Duration) -> Scene {
        let mut scene = Scene::new(Viewport::default());
        test.render(now, &mut scene);
        scene
    }

    fn has_cursor(scene: &Scene) -> bool {
        scene
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Line { .. }))
    }

    #[test]
    fn test_placeholder_when_empty_and_cursor_off() {
        let mut test = Feelings::new(FeelingsConfig::default(), Viewport::default());
        test.begin(Duration::ZERO);
        assert!(!draw(&test, Duration::ZERO).contains_text("Type here..."));
        assert!(draw(&test, Duration::from_millis(600)).contains_text("Type here..."));
    }

    #[test]
    fn test_overflowing_text_is_capped_to_box() {
        let mut test = Feelings::new(FeelingsConfig::default(), Viewport::default());
        test.begin(Duration::ZERO);
        for _ in 0..40 {
            for c in "word ".chars() {
                test.handle_event(&InputEvent::KeyDown(Key::Char(c)), Duration::ZERO);
            }
        }
        let scene = draw(&test, Duration::ZERO);
        // 80px of box height holds three 26px lines
        let body_lines = scene.texts().filter(|t| t.starts_with("word")).count();
        assert_eq!(body_lines, 3);
        assert!(!has_cursor(&scene));
    }

    #[test]
    fn test_cursor_follows_text() {
        let mut test = Feelings::new(FeelingsConfig::default(), Viewport::default());
        test.begin(Duration::ZERO);
        test.handle_event(&InputEvent::KeyDown(Key::Char('a')), Duration::ZERO);
        assert!(has_cursor(&draw(&test, Duration::ZERO)));
        assert!(!has_cursor(&draw(&test, Duration::from_millis(500))));
    }
}
