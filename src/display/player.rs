use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::color::ColorScheme;
use crate::config::DisplayConfig;
use crate::tracer::{SpeedChange, Tracer};

/// Whether the frame loop should keep going after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything the frame loop mutates: the tracer plus the view toggles.
pub struct Player {
    pub tracer: Tracer,
    pub paused: bool,
    pub show_circles: bool,
    pub fade: bool,
    pub show_debug: bool,
    pub color_scheme: ColorScheme,
    /// Smoothed frames per second, for the debug overlay.
    pub fps: f64,
    dt_limit: f64,
}

impl Player {
    pub fn new(tracer: Tracer, display: &DisplayConfig) -> Self {
        Self {
            tracer,
            paused: display.start_paused,
            show_circles: display.show_circles,
            fade: display.fade,
            show_debug: false,
            color_scheme: display.color_scheme,
            fps: display.fps as f64,
            dt_limit: display.dt_limit(),
        }
    }

    /// Advance one frame that took `dt` seconds of wall time.
    pub fn tick(&mut self, dt: f64) {
        if dt > 0.0 {
            self.fps = 0.9 * self.fps + 0.1 / dt;
        }
        if !self.paused {
            self.tracer.advance(dt.min(self.dt_limit));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Flow::Quit
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => self.paused = !self.paused,
            KeyCode::Char('c') => self.show_circles = !self.show_circles,
            KeyCode::Char('+') | KeyCode::Char('=') => self.tracer.change_speed(SpeedChange::Faster),
            KeyCode::Char('-') => self.tracer.change_speed(SpeedChange::Slower),
            KeyCode::Char('r') => self.tracer.reverse_direction(),
            KeyCode::Backspace => self.tracer.erase(),
            KeyCode::Char('f') => self.fade = !self.fade,
            KeyCode::Char('s') => self.color_scheme = self.color_scheme.next(),
            KeyCode::Char('d') | KeyCode::F(1) => self.show_debug = !self.show_debug,
            _ => {}
        }
        Flow::Continue
    }

    pub fn status_line(&self) -> String {
        format!(
            " [space] {} | [+/-] {} rad/s | [r]everse | [c]ircles | [f]ade | [s]cheme: {} | [q]uit ",
            if self.paused { "play" } else { "pause" },
            self.tracer.angular_velocity(),
            self.color_scheme.name(),
        )
    }

    pub fn debug_lines(&self) -> Vec<String> {
        vec![
            format!("fps: {}", self.fps.round() as i64),
            format!("angular velocity: {} rad/s", self.tracer.angular_velocity()),
            format!("angle: {:.2} rad", self.tracer.angle()),
            format!("oldest angle: {:.2} rad", self.tracer.oldest_angle()),
            format!("number of points: {}", self.tracer.trace_polyline().len()),
            format!("harmonics: {}", self.tracer.harmonics().len()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::{Decomposition, Direction, Harmonic};
    use crate::tracer::{TracerSettings, DEFAULT_SPEED_INDEX};
    use rustfft::num_complex::Complex64;

    fn player() -> Player {
        let decomposition = Decomposition {
            harmonics: vec![Harmonic::new(Complex64::new(100.0, 0.0), 1)],
            offset: Complex64::new(0.0, 0.0),
        };
        let tracer = Tracer::new(
            decomposition,
            Complex64::new(350.0, 350.0),
            Direction::Forward,
            DEFAULT_SPEED_INDEX,
            TracerSettings::default(),
        )
        .unwrap();
        Player::new(tracer, &DisplayConfig::default())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn paused_player_does_not_advance() {
        let mut p = player();
        p.handle_key(press(KeyCode::Char(' ')));
        assert!(p.paused);
        p.tick(1.0 / 30.0);
        assert_eq!(p.tracer.angle(), 0.0);

        p.handle_key(press(KeyCode::Char('p')));
        p.tick(1.0 / 30.0);
        assert!(p.tracer.angle() > 0.0);
    }

    #[test]
    fn stalls_are_clamped() {
        let mut p = player();
        p.tick(5.0);
        assert!((p.tracer.angle() - 2.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn keys_drive_the_tracer() {
        let mut p = player();
        p.handle_key(press(KeyCode::Char('+')));
        assert_eq!(p.tracer.angular_velocity(), 2.0);
        p.handle_key(press(KeyCode::Char('r')));
        assert_eq!(p.tracer.angular_velocity(), -2.0);
        p.handle_key(press(KeyCode::Char('-')));
        assert_eq!(p.tracer.angular_velocity(), -1.0);

        for _ in 0..10 {
            p.tick(1.0 / 30.0);
        }
        p.handle_key(press(KeyCode::Backspace));
        assert_eq!(p.tracer.trace_polyline().len(), 2);
    }

    #[test]
    fn toggles_and_quit() {
        let mut p = player();
        assert!(p.show_circles);
        p.handle_key(press(KeyCode::Char('c')));
        assert!(!p.show_circles);
        p.handle_key(press(KeyCode::Char('f')));
        assert!(p.fade);
        p.handle_key(press(KeyCode::F(1)));
        assert!(p.show_debug);
        assert_eq!(p.handle_key(press(KeyCode::Char('x'))), Flow::Continue);
        assert_eq!(p.handle_key(press(KeyCode::Esc)), Flow::Quit);
        assert_eq!(
            p.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
    }

    #[test]
    fn overlay_text() {
        let p = player();
        assert!(p.status_line().contains("1 rad/s"));
        let lines = p.debug_lines();
        assert_eq!(lines[4], "number of points: 2");
        assert_eq!(lines[5], "harmonics: 1");
    }
}
