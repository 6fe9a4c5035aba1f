use super::wrap_text;
use crate::runner::Render;
use crate::scene::{Color, Scene, TextSize};
use crate::shell::{menu_button_rect, Menu, MenuChoice, SetupErrorScreen};
use std::time::Duration;

impl Render for Menu {
    fn render(&self, _now: Duration, scene: &mut Scene) {
        let viewport = scene.viewport();
        let cx = viewport.center_x();

        scene.clear(Color::WHITE);
        scene.text_centered("Orexin Data Collection", cx, 30.0, TextSize::Title, Color::BLACK);
        scene.text_centered("Psychological Testing Suite", cx, 75.0, TextSize::Normal, Color::GRAY);

        for (i, choice) in MenuChoice::ENTRIES.iter().enumerate() {
            let rect = menu_button_rect(viewport, i);
            let label = match choice {
                MenuChoice::Test(_) => format!("{}. {}", i + 1, choice.label()),
                MenuChoice::Quit => choice.label().to_string(),
            };
            let (fill, text) = if self.highlighted() == Some(i) {
                (Color::LIGHT_BLUE, Color::BLACK)
            } else {
                (Color::BLUE, Color::WHITE)
            };
            scene.button(rect, &label, fill, text);
        }

        if let Some(status) = self.status() {
            scene.text_centered(status, cx, viewport.height - 50.0, TextSize::Small, Color::GRAY);
        }
    }
}

impl Render for SetupErrorScreen {
    fn render(&self, _now: Duration, scene: &mut Scene) {
        let viewport = scene.viewport();
        let cx = viewport.center_x();

        scene.clear(Color::WHITE);
        scene.text_centered("Data Setup Error", cx, 80.0, TextSize::Title, Color::RED);
        for (i, line) in wrap_text(self.message(), viewport.width - 100.0, TextSize::Normal)
            .into_iter()
            .enumerate()
        {
            scene.text_centered(line, cx, 170.0 + i as f32 * 30.0, TextSize::Normal, Color::BLACK);
        }
        scene.button(self.exit_button(), "Exit", Color::GRAY, Color::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Viewport;

    #[test]
    fn test_menu_lists_every_test_and_status() {
        let menu = Menu::new(Viewport::default()).with_status("Last PVT: mean 250 ms");
        let mut scene = Scene::new(Viewport::default());
        menu.render(Duration::ZERO, &mut scene);
        assert!(scene.contains_text("1. Psychomotor Vigilance Task"));
        assert!(scene.contains_text("5. Subjective Feelings"));
        assert!(scene.contains_text("Quit"));
        assert!(scene.contains_text("Last PVT: mean 250 ms"));
    }

    #[test]
    fn test_setup_error_shows_message_and_exit() {
        let screen = SetupErrorScreen::new(Viewport::default(), "Cannot write to data directory");
        let mut scene = Scene::new(Viewport::default());
        screen.render(Duration::ZERO, &mut scene);
        assert!(scene.contains_text("Cannot write to data directory"));
        assert!(scene.contains_text("Exit"));
    }
}
