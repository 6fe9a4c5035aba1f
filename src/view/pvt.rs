use crate::random::RandomSource;
use crate::runner::Render;
use crate::scene::{Color, Scene, TextSize};
use crate::tasks::Pvt;
use std::time::Duration;

const INSTRUCTIONS: [&str; 3] = [
    "Press SPACE as quickly as possible when you see the red circle",
    "Do NOT press before the circle appears",
    "ESC to quit",
];

const STIMULUS_RADIUS: f32 = 50.0;

impl<R: RandomSource> Render for Pvt<R> {
    fn render(&self, _now: Duration, scene: &mut Scene) {
        let viewport = scene.viewport();
        let cx = viewport.center_x();
        let cy = viewport.center_y();

        scene.clear(Color::WHITE);
        scene.text_centered("Psychomotor Vigilance Task", cx, 50.0, TextSize::Title, Color::BLACK);

        if self.trial_count() == 0 {
            for (i, line) in INSTRUCTIONS.iter().enumerate() {
                scene.text_centered(*line, cx, 150.0 + i as f32 * 30.0, TextSize::Normal, Color::BLACK);
            }
        }

        let max_trials = self.config().max_trials;
        let shown_trial = (self.trial_count() + 1).min(max_trials.max(1));
        scene.text(
            format!("Trial: {shown_trial}/{max_trials}"),
            20.0,
            20.0,
            TextSize::Normal,
            Color::BLACK,
        );

        if self.stimulus_shown() {
            scene.circle(cx, cy, STIMULUS_RADIUS, Color::RED);
            scene.text_centered("PRESS SPACE NOW!", cx, cy + 80.0, TextSize::Normal, Color::RED);
        } else {
            scene.text_centered("Wait for the red circle...", cx, cy, TextSize::Normal, Color::BLACK);
        }

        let times = self.reaction_times_ms();
        if let Some(last) = times.last() {
            scene.text(format!("Last RT: {last:.0}ms"), 20.0, 50.0, TextSize::Normal, Color::BLACK);
            if times.len() > 1 {
                if let Some(stats) = self.stats() {
                    scene.text(
                        format!("Avg RT: {:.0}ms", stats.mean_ms),
                        20.0,
                        80.0,
                        TextSize::Normal,
                        Color::BLACK,
                    );
                }
            }
        }
    }
}
