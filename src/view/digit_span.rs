use super::spaced_digits;
use crate::random::RandomSource;
use crate::runner::Render;
use crate::scene::{Color, Scene, TextSize};
use crate::tasks::digit_span::{DigitSpan, DigitSpanPhase, Direction};
use std::time::Duration;

impl<R: RandomSource> Render for DigitSpan<R> {
    fn render(&self, _now: Duration, scene: &mut Scene) {
        let viewport = scene.viewport();
        let cx = viewport.center_x();
        let cy = viewport.center_y();
        let direction = self.direction();

        scene.clear(Color::WHITE);
        let title = match direction {
            Direction::Forward => "Forward Digit Span",
            Direction::Backward => "Backward Digit Span",
        };
        scene.text_centered(title, cx, 20.0, TextSize::Title, Color::BLACK);
        scene.text(
            format!(
                "Span: {} | Trial: {}/{}",
                self.span(),
                self.trial() + 1,
                self.trials_per_span()
            ),
            20.0,
            20.0,
            TextSize::Small,
            Color::BLACK,
        );
        let score = self.score();
        scene.text(
            format!(
                "Forward: {} | Backward: {}",
                score.forward_span, score.backward_span
            ),
            20.0,
            45.0,
            TextSize::Small,
            Color::BLACK,
        );

        match self.phase() {
            DigitSpanPhase::Instructions => {
                let order = match direction {
                    Direction::Forward => "Type them back in the SAME order.",
                    Direction::Backward => "Type them back in REVERSE order.",
                };
                let lines = [
                    "You will see a sequence of digits.",
                    "Remember them in order.",
                    order,
                    "",
                    "Press SPACE to start",
                ];
                for (i, line) in lines.iter().enumerate() {
                    if !line.is_empty() {
                        scene.text_centered(*line, cx, 180.0 + i as f32 * 35.0, TextSize::Normal, Color::BLACK);
                    }
                }
            }
            DigitSpanPhase::Showing { index, .. } => {
                if let Some(digit) = self.current_digit() {
                    scene.text_centered(digit.to_string(), cx, cy - 25.0, TextSize::Large, Color::BLACK);
                }
                scene.text_centered(
                    format!("{}/{}", index + 1, self.sequence().len()),
                    cx,
                    cy + 60.0,
                    TextSize::Small,
                    Color::GRAY,
                );
            }
            DigitSpanPhase::Input => {
                let order = match direction {
                    Direction::Forward => "forward",
                    Direction::Backward => "backward",
                };
                scene.text_centered(
                    format!("Enter digits in {order} order:"),
                    cx,
                    cy - 80.0,
                    TextSize::Normal,
                    Color::BLACK,
                );
                scene.text_centered(spaced_digits(self.input()), cx, cy - 25.0, TextSize::Large, Color::BLUE);
                scene.text_centered(
                    format!("Expected length: {}", self.span()),
                    cx,
                    cy + 50.0,
                    TextSize::Small,
                    Color::GRAY,
                );
            }
            DigitSpanPhase::Feedback { correct, .. } => {
                let (label, color) = if correct {
                    ("Correct!", Color::GREEN)
                } else {
                    ("Incorrect", Color::RED)
                };
                scene.text_centered(label, cx, cy - 80.0, TextSize::Title, color);
                scene.text_centered(
                    format!("Correct: {}", spaced_digits(&self.expected())),
                    cx,
                    cy - 20.0,
                    TextSize::Normal,
                    Color::BLACK,
                );
                scene.text_centered(
                    format!("Your answer: {}", spaced_digits(self.input())),
                    cx,
                    cy + 20.0,
                    TextSize::Normal,
                    Color::BLACK,
                );
                scene.text_centered("Press SPACE to continue", cx, cy + 80.0, TextSize::Small, Color::GRAY);
            }
            DigitSpanPhase::Finished | DigitSpanPhase::Cancelled => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DigitSpanConfig;
    use crate::random::ScriptedRandom;
    use crate::runner::Screen;
    use crate::types::{InputEvent, Key, Viewport};

    fn draw(test: &DigitSpan<ScriptedRandom>) -> Scene {
        let mut scene = Scene::new(Viewport::default());
        test.render(Duration::ZERO, &mut scene);
        scene
    }

    #[test]
    fn test_phases_render_expected_prompts() {
        let rng = ScriptedRandom::new().with_ints([7, 2, 5]);
        let mut test = DigitSpan::new(DigitSpanConfig::default(), rng);
        assert!(draw(&test).contains_text("Press SPACE to start"));
        assert!(draw(&test).contains_text("SAME order"));

        test.handle_event(&InputEvent::KeyDown(Key::Char(' ')), Duration::ZERO);
        let showing = draw(&test);
        assert!(showing.contains_text("7"));
        assert!(showing.contains_text("1/3"));

        for t in 1..=3 {
            test.tick(Duration::from_secs(t));
        }
        assert!(draw(&test).contains_text("Expected length: 3"));

        for c in ['7', '2', '4'] {
            test.handle_event(&InputEvent::KeyDown(Key::Char(c)), Duration::from_secs(3));
        }
        let feedback = draw(&test);
        assert!(feedback.contains_text("Incorrect"));
        assert!(feedback.contains_text("Correct: 7 2 5"));
        assert!(feedback.contains_text("Your answer: 7 2 4"));
    }
}
