use crate::random::RandomSource;
use crate::runner::Render;
use crate::scene::{Color, Scene, TextSize};
use crate::tasks::Dsst;
use crate::types::Rect;
use std::time::Duration;

const CELL_WIDTH: f32 = 80.0;
const KEY_CELL_WIDTH: f32 = 70.0;

impl<R: RandomSource> Render for Dsst<R> {
    fn render(&self, now: Duration, scene: &mut Scene) {
        let viewport = scene.viewport();
        let cx = viewport.center_x();

        scene.clear(Color::WHITE);
        scene.text_centered("Digit Symbol Substitution Test", cx, 10.0, TextSize::Normal, Color::BLACK);

        let left = self.remaining(now).as_secs_f64();
        scene.text(
            format!("Time: {left:.1}s"),
            viewport.width - 120.0,
            10.0,
            TextSize::Normal,
            Color::BLACK,
        );
        let score = self.score();
        scene.text(
            format!("Score: {}/{}", score.correct_count, score.total_attempted),
            20.0,
            10.0,
            TextSize::Normal,
            Color::BLACK,
        );

        // current round
        let row_y = viewport.center_y() - 30.0;
        let start_x = cx - self.glyphs().len() as f32 * CELL_WIDTH / 2.0;
        for (i, glyph) in self.glyphs().iter().enumerate() {
            let x = start_x + i as f32 * CELL_WIDTH;
            let center = x + CELL_WIDTH / 2.0;
            if i == self.position() {
                scene.stroke_rect(
                    Rect::new(x - 5.0, row_y - 5.0, CELL_WIDTH - 10.0, 60.0),
                    Color::BLUE,
                    3.0,
                );
            }
            scene.text_centered(glyph.to_string(), center, row_y, TextSize::Large, Color::BLACK);

            if let Some(digit) = self.responses().get(i).copied().flatten() {
                let color = match self.is_correct_at(i) {
                    Some(true) => Color::GREEN,
                    _ => Color::RED,
                };
                scene.text_centered(digit.to_string(), center, row_y + 40.0, TextSize::Normal, color);
            }
        }

        // reference key
        let key_y = viewport.height - 120.0;
        scene.text_centered(
            "Reference (Symbol above, Key below):",
            cx,
            key_y,
            TextSize::Small,
            Color::BLACK,
        );
        let key_start = cx - 9.0 * KEY_CELL_WIDTH / 2.0;
        for (i, (digit, glyph)) in self.symbols().pairs().enumerate() {
            let x = key_start + i as f32 * KEY_CELL_WIDTH;
            let y = key_y + 25.0;
            let center = x + KEY_CELL_WIDTH / 2.0;
            scene.text_centered(glyph.to_string(), center, y, TextSize::Normal, Color::BLACK);
            scene.text_centered(digit.to_string(), center, y + 35.0, TextSize::Small, Color::BLACK);
            scene.stroke_rect(Rect::new(x + 5.0, y, 60.0, 55.0), Color::BLACK, 1.0);
        }

        let instructions = [
            "Type the digit (1-9) that corresponds to each symbol",
            "Backspace to go back, ESC to quit",
        ];
        for (i, line) in instructions.iter().enumerate() {
            scene.text_centered(*line, cx, 80.0 + i as f32 * 25.0, TextSize::Small, Color::GRAY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DsstConfig;
    use crate::random::ScriptedRandom;
    use crate::runner::Screen;
    use crate::scene::DrawCommand;
    use crate::types::{InputEvent, Key, Viewport};

    #[test]
    fn test_responses_are_colour_coded() {
        let rng = ScriptedRandom::new().with_ints([1, 2, 3, 4, 5, 6]);
        let mut test = Dsst::new(DsstConfig::default(), rng);
        test.begin(Duration::ZERO);
        test.handle_event(&InputEvent::KeyDown(Key::Char('1')), Duration::from_secs(1));
        test.handle_event(&InputEvent::KeyDown(Key::Char('3')), Duration::from_secs(1));

        let mut scene = Scene::new(Viewport::default());
        test.render(Duration::from_secs(30), &mut scene);

        assert!(scene.contains_text("Time: 60.0s"));
        assert!(scene.contains_text("Score: 1/2"));
        let colour_of = |needle: &str| {
            scene.commands().iter().find_map(|c| match c {
                DrawCommand::Text { text, color, size: TextSize::Normal, .. } if text == needle => {
                    Some(*color)
                }
                _ => None,
            })
        };
        assert_eq!(colour_of("1"), Some(Color::GREEN));
        assert_eq!(colour_of("3"), Some(Color::RED));
    }
}
