//! Incremental tracing of a harmonic sum.
//!
//! The [`Tracer`] owns the phase angle and a rolling [`TraceBuffer`] of
//! points traced during roughly the last revolution. Each call to
//! [`Tracer::advance`] moves the phase forward by `angular_velocity * dt` and
//! extends the buffer so that consecutive points stay within
//! `max_distance` of each other, bisecting the angle interval when a frame
//! step is too large.

mod buffer;
mod speed;

pub use buffer::TraceBuffer;
pub use speed::{SpeedChange, SpeedLadder, DEFAULT_SPEED_INDEX, DEFAULT_SPEED_LADDER};

use std::collections::VecDeque;
use std::f64::consts::TAU;

use rustfft::num_complex::Complex64;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fourier::{Decomposition, Direction, Harmonic};

/// Samples closer than this to the previous point are skipped.
pub const DEFAULT_MIN_DISTANCE: f64 = 1.0;

/// Consecutive points farther apart than this get intermediate points.
pub const DEFAULT_MAX_DISTANCE: f64 = 5.0;

/// Nesting limit for bisection; at the limit the current chord is accepted.
pub const DEFAULT_MAX_BISECTION_DEPTH: usize = 16;

/// The unwrapped angle is pulled back toward zero after this many turns.
const REBASE_TURNS: f64 = 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TracerSettings {
    pub min_distance: f64,
    pub max_distance: f64,
    pub max_bisection_depth: usize,
    pub speed_ladder: Vec<f64>,
}

impl Default for TracerSettings {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            max_bisection_depth: DEFAULT_MAX_BISECTION_DEPTH,
            speed_ladder: DEFAULT_SPEED_LADDER.to_vec(),
        }
    }
}

impl TracerSettings {
    fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(Error::InvalidTracerSettings(format!(
                "max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !(self.min_distance >= 0.0 && self.min_distance < self.max_distance) {
            return Err(Error::InvalidTracerSettings(format!(
                "min_distance must be in [0, {}), got {}",
                self.max_distance, self.min_distance
            )));
        }
        if self.max_bisection_depth == 0 {
            return Err(Error::InvalidTracerSettings(
                "max_bisection_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct Tracer {
    harmonics: Vec<Harmonic>,
    /// `anchor + offset`; the center of the first circle.
    pivot: Complex64,
    /// Circle centers at the current angle, `pivot` first.
    chain: Vec<Complex64>,
    /// Unwrapped phase angle in radians.
    angle: f64,
    direction: Direction,
    speed: SpeedLadder,
    buffer: TraceBuffer,
    min_distance: f64,
    max_distance: f64,
    max_bisection_depth: usize,
    /// Bisection worklist, kept between frames to avoid reallocating.
    pending: Vec<(Complex64, f64, usize)>,
}

impl Tracer {
    pub fn new(
        decomposition: Decomposition,
        anchor: Complex64,
        direction: Direction,
        speed_index: usize,
        settings: TracerSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let speed = SpeedLadder::new(settings.speed_ladder, speed_index)?;

        let Decomposition { harmonics, offset } = decomposition;
        let pivot = anchor + offset;
        let mut tracer = Self {
            chain: vec![pivot; harmonics.len() + 1],
            harmonics,
            pivot,
            angle: 0.0,
            direction,
            speed,
            buffer: TraceBuffer::seeded(pivot, 0.0),
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
            max_bisection_depth: settings.max_bisection_depth,
            pending: Vec::with_capacity(settings.max_bisection_depth + 1),
        };
        tracer.refresh_chain();
        let start = tracer.tip();
        tracer.buffer.reset(start, 0.0);

        debug!(
            harmonics = tracer.harmonics.len(),
            ?direction,
            speed = tracer.speed.speed(),
            "tracer ready"
        );
        Ok(tracer)
    }

    /// Position of the chain's tip at `angle`.
    #[inline]
    pub fn evaluate_at(&self, angle: f64) -> Complex64 {
        self.harmonics
            .iter()
            .fold(self.pivot, |center, h| center + h.rotor(angle))
    }

    /// Move the phase forward by `dt` seconds and extend the trace.
    ///
    /// Non-positive or non-finite `dt` does nothing.
    pub fn advance(&mut self, dt: f64) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }

        let next_angle = self.angle + self.angular_velocity() * dt;
        let next_point = self.evaluate_at(next_angle);
        let (last_point, last_angle) = self.buffer.last();
        let distance = (next_point - last_point).norm();

        if distance >= self.min_distance {
            if distance > self.max_distance {
                self.interpolate(last_point, last_angle, next_point, next_angle);
            }
            self.buffer.push(next_point, next_angle);
        }

        self.angle = next_angle;
        self.trim();
        self.rebase();
        self.refresh_chain();
    }

    /// Append points between `from` and `to` until no chord exceeds
    /// `max_distance`. `to` itself is left to the caller.
    fn interpolate(&mut self, from: Complex64, from_angle: f64, to: Complex64, to_angle: f64) {
        // Right endpoints of the spans still to emit, nearest on top, each
        // tagged with how many halvings produced the span ending there.
        let mut pending = std::mem::take(&mut self.pending);
        pending.clear();
        pending.push((to, to_angle, 0));

        let (mut lo, mut lo_angle) = (from, from_angle);
        while let Some(&(hi, hi_angle, depth)) = pending.last() {
            let too_long = (hi - lo).norm() > self.max_distance;
            if too_long && depth < self.max_bisection_depth {
                let mid_angle = 0.5 * (lo_angle + hi_angle);
                let top = pending.len() - 1;
                pending[top].2 = depth + 1;
                pending.push((self.evaluate_at(mid_angle), mid_angle, depth + 1));
                continue;
            }

            pending.pop();
            if pending.is_empty() {
                break;
            }
            self.buffer.push(hi, hi_angle);
            lo = hi;
            lo_angle = hi_angle;
        }

        self.pending = pending;
    }

    /// Forget everything more than one revolution behind the current angle.
    fn trim(&mut self) {
        let angle = self.angle;
        match self.direction {
            Direction::Forward => self.buffer.trim_front_while(|a| a < angle - TAU),
            Direction::Reverse => self.buffer.trim_front_while(|a| a > angle + TAU),
        };
    }

    fn rebase(&mut self) {
        if self.angle.abs() < REBASE_TURNS * TAU {
            return;
        }
        let shift = (self.angle / TAU).trunc() * TAU;
        self.angle -= shift;
        self.buffer.shift_angles(-shift);
        debug!(shift, "rebased phase angle");
    }

    fn refresh_chain(&mut self) {
        let angle = self.angle;
        let mut center = self.pivot;
        self.chain[0] = center;
        for (slot, h) in self.chain[1..].iter_mut().zip(&self.harmonics) {
            center += h.rotor(angle);
            *slot = center;
        }
    }

    fn tip(&self) -> Complex64 {
        self.chain[self.chain.len() - 1]
    }

    /// Flip the rotation direction. The trail is erased because its angles
    /// run the wrong way for the new direction.
    pub fn reverse_direction(&mut self) {
        self.direction = self.direction.flipped();
        self.erase();
        debug!(direction = ?self.direction, "reversed rotation");
    }

    /// Step along the speed ladder. The trail is kept.
    pub fn change_speed(&mut self, change: SpeedChange) {
        if self.speed.step(change) {
            debug!(speed = self.speed.speed(), "changed speed");
        }
    }

    /// Clear the trail without touching the phase.
    ///
    /// The newest point is kept twice, re-stamped with the current angle so
    /// later angles continue monotonically from here.
    pub fn erase(&mut self) {
        // Suppressed samples leave the pen less than min_distance from last_point.
        let (last_point, _) = self.buffer.last();
        self.buffer.reset(last_point, self.angle);
    }

    /// The traced polyline, oldest point first.
    pub fn trace_polyline(&self) -> &VecDeque<Complex64> {
        self.buffer.points()
    }

    pub fn trace(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Circle centers at the current angle: the pivot, then one per
    /// harmonic, ending at the pen tip.
    pub fn circle_chain(&self) -> &[Complex64] {
        &self.chain
    }

    /// Radius of the circle around each non-tip center of the chain.
    pub fn circle_radii(&self) -> impl Iterator<Item = f64> + '_ {
        self.harmonics.iter().map(Harmonic::radius)
    }

    /// For each traced point, how far behind the current angle it lies as a
    /// fraction of a revolution: 0 for the newest, 1 for one turn old.
    pub fn trail_ages(&self) -> impl Iterator<Item = f64> + '_ {
        let angle = self.angle;
        let sign = self.direction.sign();
        self.buffer
            .angles()
            .iter()
            .map(move |a| (sign * (angle - a) / TAU).clamp(0.0, 1.0))
    }

    /// Phase angle normalized to `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.angle.rem_euclid(TAU)
    }

    /// Angle of the oldest traced point, normalized to `[0, 2π)`.
    pub fn oldest_angle(&self) -> f64 {
        self.buffer.oldest_angle().rem_euclid(TAU)
    }

    /// Signed angular velocity in rad/s.
    pub fn angular_velocity(&self) -> f64 {
        self.speed.speed() * self.direction.sign()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn speed_index(&self) -> usize {
        self.speed.index()
    }

    pub fn harmonics(&self) -> &[Harmonic] {
        &self.harmonics
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn single(radius: f64) -> Decomposition {
        Decomposition {
            harmonics: vec![Harmonic::new(Complex64::new(radius, 0.0), 1)],
            offset: Complex64::new(0.0, 0.0),
        }
    }

    fn tracer(decomposition: Decomposition) -> Tracer {
        Tracer::new(
            decomposition,
            Complex64::new(0.0, 0.0),
            Direction::Forward,
            DEFAULT_SPEED_INDEX,
            TracerSettings::default(),
        )
        .unwrap()
    }

    fn assert_close(a: Complex64, b: Complex64) {
        assert!((a - b).norm() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn single_harmonic_positions() {
        let t = tracer(single(100.0));
        assert_close(t.evaluate_at(0.0), Complex64::new(100.0, 0.0));
        assert_close(t.evaluate_at(FRAC_PI_2), Complex64::new(0.0, 100.0));
        assert_close(t.evaluate_at(PI), Complex64::new(-100.0, 0.0));
    }

    #[test]
    fn chain_starts_at_anchor_plus_offset() {
        let decomposition = Decomposition {
            harmonics: vec![
                Harmonic::new(Complex64::new(10.0, 0.0), 1),
                Harmonic::new(Complex64::new(0.0, 5.0), -2),
            ],
            offset: Complex64::new(1.0, 1.0),
        };
        let t = Tracer::new(
            decomposition,
            Complex64::new(350.0, 350.0),
            Direction::Forward,
            0,
            TracerSettings::default(),
        )
        .unwrap();
        let chain = t.circle_chain();
        assert_eq!(chain.len(), 3);
        assert_close(chain[0], Complex64::new(351.0, 351.0));
        assert_close(chain[1], Complex64::new(361.0, 351.0));
        assert_close(chain[2], Complex64::new(361.0, 356.0));
        assert_close(chain[2], t.evaluate_at(0.0));
        assert_eq!(t.circle_radii().collect::<Vec<_>>(), vec![10.0, 5.0]);
    }

    #[test]
    fn zero_harmonics_stay_at_pivot() {
        let decomposition = Decomposition {
            harmonics: Vec::new(),
            offset: Complex64::new(2.0, 3.0),
        };
        let mut t = Tracer::new(
            decomposition,
            Complex64::new(10.0, 10.0),
            Direction::Forward,
            DEFAULT_SPEED_INDEX,
            TracerSettings::default(),
        )
        .unwrap();
        for _ in 0..100 {
            t.advance(1.0 / 30.0);
        }
        assert_close(t.evaluate_at(1.0), Complex64::new(12.0, 13.0));
        assert_eq!(t.trace_polyline().len(), 2);
        assert_eq!(t.circle_chain(), &[Complex64::new(12.0, 13.0)]);
    }

    #[test]
    fn starts_seeded_with_two_copies() {
        let t = tracer(single(100.0));
        let points = t.trace_polyline();
        assert_eq!(points.len(), 2);
        assert_close(points[0], Complex64::new(100.0, 0.0));
        assert_close(points[1], Complex64::new(100.0, 0.0));
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut t = tracer(single(100.0));
        t.advance(0.0);
        t.advance(-1.0);
        t.advance(f64::NAN);
        assert_eq!(t.angle(), 0.0);
        assert_eq!(t.trace_polyline().len(), 2);
    }

    #[test]
    fn large_step_is_bisected_under_max_distance() {
        let mut t = tracer(single(100.0));
        t.advance(0.5);
        let points = t.trace_polyline();
        assert!(points.len() > 10);
        for i in 1..points.len() {
            assert!((points[i] - points[i - 1]).norm() <= DEFAULT_MAX_DISTANCE + 1e-9);
        }
        assert_close(points[points.len() - 1], t.evaluate_at(0.5));

        let angles = t.trace().angles();
        assert!(angles.iter().zip(angles.iter().skip(1)).all(|(a, b)| a <= b));
    }

    #[test]
    fn depth_cap_accepts_long_chords() {
        let settings = TracerSettings {
            max_bisection_depth: 1,
            ..TracerSettings::default()
        };
        let mut t = Tracer::new(
            single(100.0),
            Complex64::new(0.0, 0.0),
            Direction::Forward,
            DEFAULT_SPEED_INDEX,
            settings,
        )
        .unwrap();
        t.advance(1.0);
        // One midpoint plus the new point.
        assert_eq!(t.trace_polyline().len(), 4);
    }

    #[test]
    fn tiny_steps_are_suppressed() {
        let mut t = tracer(single(100.0));
        t.advance(0.1);
        let len = t.trace_polyline().len();
        // 1e-4 rad on a radius of 100 moves the tip by 0.01
        for _ in 0..20 {
            t.advance(1e-4);
        }
        assert_eq!(t.trace_polyline().len(), len);
        assert!(t.angle() > 0.1);
    }

    #[test]
    fn reverse_resets_to_seed() {
        let mut t = tracer(single(100.0));
        for _ in 0..60 {
            t.advance(1.0 / 30.0);
        }
        assert!(t.trace_polyline().len() > 2);
        let before = t.angular_velocity();

        t.reverse_direction();
        assert_eq!(t.trace_polyline().len(), 2);
        assert_eq!(t.direction(), Direction::Reverse);
        assert_eq!(t.angular_velocity(), -before);

        let angle = t.angle();
        t.advance(1.0 / 30.0);
        assert!(t.angle() < angle);
        let angles = t.trace().angles();
        assert!(angles.iter().zip(angles.iter().skip(1)).all(|(a, b)| a >= b));
    }

    #[test]
    fn erase_keeps_phase() {
        let mut t = tracer(single(100.0));
        for _ in 0..30 {
            t.advance(1.0 / 30.0);
        }
        let angle = t.angle();
        let tip = t.trace_polyline()[t.trace_polyline().len() - 1];
        t.erase();
        assert_eq!(t.angle(), angle);
        assert_eq!(t.trace_polyline().len(), 2);
        assert_close(t.trace_polyline()[0], tip);
        assert_close(t.trace_polyline()[1], tip);
    }

    #[test]
    fn speed_changes_keep_direction_and_trail() {
        let mut t = tracer(single(100.0));
        t.reverse_direction();
        for _ in 0..10 {
            t.advance(1.0 / 30.0);
        }
        let len = t.trace_polyline().len();
        t.change_speed(SpeedChange::Faster);
        assert_eq!(t.angular_velocity(), -2.0);
        t.change_speed(SpeedChange::Slower);
        t.change_speed(SpeedChange::Slower);
        assert_eq!(t.angular_velocity(), -0.5);
        assert_eq!(t.speed_index(), DEFAULT_SPEED_INDEX - 1);
        assert_eq!(t.trace_polyline().len(), len);
    }

    #[test]
    fn trims_to_one_revolution() {
        let mut t = tracer(single(100.0));
        for _ in 0..(30 * 20) {
            t.advance(1.0 / 30.0);
        }
        let angles = t.trace().angles();
        let newest = angles[angles.len() - 1];
        assert!(newest - angles[0] <= TAU);
        assert!(t.trail_ages().all(|age| (0.0..=1.0).contains(&age)));
    }

    #[test]
    fn rebase_preserves_positions() {
        let mut t = tracer(single(100.0));
        t.change_speed(SpeedChange::Faster);
        t.change_speed(SpeedChange::Faster);
        // Jump close to the rebase threshold without tracing every frame.
        t.angle = REBASE_TURNS * TAU - 0.01;
        t.erase();
        t.advance(1.0 / 30.0);
        assert!(t.angle < TAU);
        assert!(t.trace().angles().iter().all(|a| a.abs() < 2.0 * TAU));
        let (point, angle) = t.trace().last();
        assert!((t.evaluate_at(angle) - point).norm() < 1e-6);
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(matches!(
            Tracer::new(
                single(1.0),
                Complex64::new(0.0, 0.0),
                Direction::Forward,
                99,
                TracerSettings::default(),
            ),
            Err(Error::InvalidSpeedIndex { index: 99, .. })
        ));
        let settings = TracerSettings {
            min_distance: 10.0,
            max_distance: 5.0,
            ..TracerSettings::default()
        };
        assert!(matches!(
            Tracer::new(
                single(1.0),
                Complex64::new(0.0, 0.0),
                Direction::Forward,
                0,
                settings,
            ),
            Err(Error::InvalidTracerSettings(_))
        ));
    }
}
