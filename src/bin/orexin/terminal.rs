//! Terminal frontend
//!
//! Rasterises each [`Scene`] onto a ratatui braille canvas spanning the
//! whole terminal and translates crossterm key and mouse events into
//! logical-pixel [`InputEvent`]s.

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Rect as CellRect, Size};
use ratatui::style::{Color as TermColor, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Rectangle};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use orexin::clock::{FramePacer, MonotonicClock};
use orexin::scene::{Anchor, Color, DrawCommand, Scene};
use orexin::{Frontend, InputEvent, Key, RunError, Viewport};

/// Braille dots per terminal row
const DOTS_PER_ROW: f64 = 4.0;

pub struct TerminalFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    clock: MonotonicClock,
    pacer: FramePacer,
    viewport: Viewport,
    /// Terminal area used by the last presented frame
    area: CellRect,
}

impl TerminalFrontend {
    pub fn new(viewport: Viewport, frame_rate: u32) -> io::Result<Self> {
        enable_raw_mode()?;
        let (terminal, size) = undo_on_error(enter_screen(), || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            let _ = disable_raw_mode();
        })?;

        Ok(Self {
            terminal,
            clock: MonotonicClock::new(),
            pacer: FramePacer::new(frame_rate),
            viewport,
            area: CellRect::new(0, 0, size.width, size.height),
        })
    }

    fn to_logical(&self, column: u16, row: u16) -> (f32, f32) {
        cell_to_logical(column, row, self.area, self.viewport)
    }

    fn translate(&self, event: Event) -> Option<InputEvent> {
        match event {
            Event::Key(key) => translate_key(key),
            Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => {
                let (x, y) = self.to_logical(column, row);
                match kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PointerDown { x, y }),
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        Some(InputEvent::PointerMoved { x, y })
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

impl Frontend for TerminalFrontend {
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>, RunError> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Some(translated) = self.translate(event::read()?) {
                events.push(translated);
            }
        }
        Ok(events)
    }

    fn present(&mut self, scene: &Scene) -> Result<(), RunError> {
        let viewport = self.viewport;
        let mut area = self.area;
        self.terminal.draw(|frame| {
            let drawn = frame.area();
            area = drawn;
            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .background_color(background(scene))
                .x_bounds([0.0, viewport.width as f64])
                .y_bounds([0.0, viewport.height as f64])
                .paint(move |ctx| paint(ctx, scene, viewport, drawn));
            frame.render_widget(canvas, drawn);
        })?;
        self.area = area;
        Ok(())
    }

    fn pace(&mut self) {
        self.pacer.wait();
    }
}

fn enter_screen() -> io::Result<(Terminal<CrosstermBackend<Stdout>>, Size)> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    let size = terminal.size()?;
    Ok((terminal, size))
}

/// Run `undo` before handing back a failed setup step
fn undo_on_error<T>(result: io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        undo();
    }
    result
}

fn translate_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }
    let mapped = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        _ => Key::Other,
    };
    Some(InputEvent::KeyDown(mapped))
}

/// Centre of a terminal cell in logical pixels
pub fn cell_to_logical(column: u16, row: u16, area: CellRect, viewport: Viewport) -> (f32, f32) {
    let width = area.width.max(1) as f32;
    let height = area.height.max(1) as f32;
    let column = column.saturating_sub(area.x) as f32;
    let row = row.saturating_sub(area.y) as f32;
    (
        (column + 0.5) / width * viewport.width,
        (row + 0.5) / height * viewport.height,
    )
}

fn term_color(color: Color) -> TermColor {
    let Color(r, g, b) = color;
    TermColor::Rgb(r, g, b)
}

fn background(scene: &Scene) -> TermColor {
    scene
        .commands()
        .iter()
        .find_map(|command| match command {
            DrawCommand::Clear(color) => Some(term_color(*color)),
            _ => None,
        })
        .unwrap_or(TermColor::Reset)
}

/// Draw every command with the y axis flipped: scenes grow downwards, the
/// canvas grows upwards.
fn paint(ctx: &mut Context, scene: &Scene, viewport: Viewport, area: CellRect) {
    let height = viewport.height as f64;
    let cell_width = viewport.width / area.width.max(1) as f32;
    let fill_step = height / (area.height.max(1) as f64 * DOTS_PER_ROW);

    for command in scene.commands() {
        match command {
            DrawCommand::Clear(_) => {}
            DrawCommand::FillRect { rect, color } => {
                let color = term_color(*color);
                let left = rect.x as f64;
                let right = (rect.x + rect.width) as f64;
                let mut y = rect.y as f64;
                while y < (rect.y + rect.height) as f64 {
                    ctx.draw(&CanvasLine {
                        x1: left,
                        y1: height - y,
                        x2: right,
                        y2: height - y,
                        color,
                    });
                    y += fill_step;
                }
            }
            DrawCommand::StrokeRect { rect, color, .. } => ctx.draw(&Rectangle {
                x: rect.x as f64,
                y: height - (rect.y + rect.height) as f64,
                width: rect.width as f64,
                height: rect.height as f64,
                color: term_color(*color),
            }),
            DrawCommand::Circle {
                cx,
                cy,
                radius,
                color,
            } => ctx.draw(&Circle {
                x: *cx as f64,
                y: height - *cy as f64,
                radius: *radius as f64,
                color: term_color(*color),
            }),
            DrawCommand::Line {
                from, to, color, ..
            } => ctx.draw(&CanvasLine {
                x1: from.0 as f64,
                y1: height - from.1 as f64,
                x2: to.0 as f64,
                y2: height - to.1 as f64,
                color: term_color(*color),
            }),
            DrawCommand::Text { .. } => {}
        }
    }

    ctx.layer();
    for command in scene.commands() {
        if let DrawCommand::Text {
            text,
            x,
            y,
            size,
            color,
            anchor,
        } = command
        {
            let left = match anchor {
                Anchor::Left => *x,
                // the terminal draws one cell per character
                Anchor::Center => *x - text.chars().count() as f32 * cell_width / 2.0,
            };
            let baseline = height - (*y + size.line_height() / 2.0) as f64;
            ctx.print(
                left as f64,
                baseline,
                Line::styled(text.clone(), Style::default().fg(term_color(*color))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_mapping_covers_viewport() {
        let area = CellRect::new(0, 0, 100, 50);
        let viewport = Viewport::default();
        assert_eq!(cell_to_logical(0, 0, area, viewport), (4.0, 6.0));
        assert_eq!(cell_to_logical(99, 49, area, viewport), (796.0, 594.0));
    }

    #[test]
    fn test_failed_setup_runs_undo() {
        let mut undone = false;
        let failed: io::Result<()> = Err(io::Error::other("no tty"));
        assert!(undo_on_error(failed, || undone = true).is_err());
        assert!(undone);

        let mut undone = false;
        assert_eq!(undo_on_error(Ok(3), || undone = true).unwrap(), 3);
        assert!(!undone);
    }

    #[test]
    fn test_ctrl_c_quits_and_release_is_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(ctrl_c), Some(InputEvent::Quit));

        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(translate_key(release), None);

        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(translate_key(space), Some(InputEvent::KeyDown(Key::Char(' '))));
    }
}
