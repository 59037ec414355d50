use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine};
use std::io::{self, stdout};
use std::time::{Duration, Instant};
use tracing::info;

use super::player::{Flow, Player};
use crate::color::{ARM_COLOR, CIRCLE_COLOR};
use crate::config::DisplayConfig;
use crate::path::Viewport;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

pub fn run(player: Player, display: &DisplayConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, player, display);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut player: Player,
    display: &DisplayConfig,
) -> Result<()> {
    let viewport = display.viewport();
    let circle_cutoff = display.circle_radius_cutoff;
    let frame_interval = Duration::from_secs_f64(display.frame_interval());
    let fps = display.fps;
    let mut last_frame = Instant::now();

    info!(
        harmonics = player.tracer.harmonics().len(),
        fps,
        "starting playback"
    );

    loop {
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        player.tick(dt);

        terminal.draw(|frame| {
            let area = frame.area();
            let drawing = fit_viewport(area, viewport);
            render_epicycles(frame, drawing, &player, viewport, circle_cutoff);
            render_status(frame, area, &player);
            if player.show_debug {
                render_debug(frame, area, &player);
            }
        })?;

        // Wait out the rest of the frame, reacting to keys as they arrive
        let deadline = now + frame_interval;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                break;
            }
            if let Event::Key(key) = event::read()? {
                if player.handle_key(key) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

/// Largest sub-rectangle of `area`, centered, that shows `viewport` without
/// stretching it.
fn fit_viewport(area: Rect, viewport: Viewport) -> Rect {
    // Leave the first row for the status line
    let area = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
    if area.width == 0 || area.height == 0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return area;
    }

    let visual_width = area.width as f64 / CELL_ASPECT;
    let scale = (visual_width / viewport.width).min(area.height as f64 / viewport.height);
    let width = ((viewport.width * scale * CELL_ASPECT).round() as u16).clamp(1, area.width);
    let height = ((viewport.height * scale).round() as u16).clamp(1, area.height);

    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Canvas y grows upwards, screen y grows downwards.
fn canvas_y(y: f64, viewport: Viewport) -> f64 {
    viewport.height - y
}

fn render_epicycles(
    frame: &mut Frame,
    area: Rect,
    player: &Player,
    viewport: Viewport,
    circle_cutoff: f64,
) {
    let tracer = &player.tracer;
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(|ctx| {
            if player.show_circles {
                let chain = tracer.circle_chain();
                for (center, radius) in chain.iter().zip(tracer.circle_radii()) {
                    if radius >= circle_cutoff {
                        ctx.draw(&Circle {
                            x: center.re,
                            y: canvas_y(center.im, viewport),
                            radius,
                            color: rgb(CIRCLE_COLOR),
                        });
                    }
                }
                for arm in chain.windows(2) {
                    ctx.draw(&CanvasLine::new(
                        arm[0].re,
                        canvas_y(arm[0].im, viewport),
                        arm[1].re,
                        canvas_y(arm[1].im, viewport),
                        rgb(ARM_COLOR),
                    ));
                }
                ctx.layer();
            }

            let points = tracer.trace_polyline();
            let segments = points.iter().zip(points.iter().skip(1));
            for ((a, b), age) in segments.zip(tracer.trail_ages().skip(1)) {
                let color = player.color_scheme.trail_color(age, player.fade);
                ctx.draw(&CanvasLine::new(
                    a.re,
                    canvas_y(a.im, viewport),
                    b.re,
                    canvas_y(b.im, viewport),
                    rgb(color),
                ));
            }
        });

    frame.render_widget(canvas, area);
}

fn write_row(frame: &mut Frame, area: Rect, row: u16, text: &str, color: Color) {
    if row >= area.height {
        return;
    }
    for (i, ch) in text.chars().enumerate() {
        if i >= area.width as usize {
            break;
        }
        let cell = frame.buffer_mut().cell_mut((area.x + i as u16, area.y + row));
        if let Some(cell) = cell {
            cell.set_char(ch);
            cell.set_fg(color);
        }
    }
}

fn render_status(frame: &mut Frame, area: Rect, player: &Player) {
    write_row(frame, area, 0, &player.status_line(), Color::DarkGray);
}

fn render_debug(frame: &mut Frame, area: Rect, player: &Player) {
    for (i, line) in player.debug_lines().iter().enumerate() {
        write_row(frame, area, i as u16 + 1, line, Color::Gray);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_viewport_is_twice_as_wide_in_cells() {
        let area = Rect::new(0, 0, 120, 41);
        let fitted = fit_viewport(area, Viewport::new(700.0, 700.0));
        assert_eq!(fitted.height, 40);
        assert_eq!(fitted.width, 80);
        assert_eq!(fitted.x, 20);
        assert_eq!(fitted.y, 1);
    }

    #[test]
    fn degenerate_area_is_passed_through() {
        let area = Rect::new(0, 0, 10, 1);
        let fitted = fit_viewport(area, Viewport::new(700.0, 700.0));
        assert_eq!(fitted.height, 0);
    }
}
