use std::collections::VecDeque;

use rustfft::num_complex::Complex64;

/// Rolling history of traced points and the phase angles they were traced at.
///
/// Never holds fewer than [`TraceBuffer::MIN_LEN`] entries so a renderer
/// always has at least one segment to draw.
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    points: VecDeque<Complex64>,
    angles: VecDeque<f64>,
}

impl TraceBuffer {
    pub const MIN_LEN: usize = 2;

    /// A buffer holding `point` twice.
    pub fn seeded(point: Complex64, angle: f64) -> Self {
        let mut buffer = Self {
            points: VecDeque::with_capacity(256),
            angles: VecDeque::with_capacity(256),
        };
        buffer.reset(point, angle);
        buffer
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &VecDeque<Complex64> {
        &self.points
    }

    pub fn angles(&self) -> &VecDeque<f64> {
        &self.angles
    }

    /// Newest point and its angle.
    pub fn last(&self) -> (Complex64, f64) {
        let i = self.len() - 1;
        (self.points[i], self.angles[i])
    }

    pub fn oldest_angle(&self) -> f64 {
        self.angles[0]
    }

    pub fn push(&mut self, point: Complex64, angle: f64) {
        self.points.push_back(point);
        self.angles.push_back(angle);
    }

    /// Drop entries from the old end while `expired` holds for their angle.
    /// Returns how many were removed.
    pub fn trim_front_while(&mut self, expired: impl Fn(f64) -> bool) -> usize {
        let mut removed = 0;
        while self.len() > Self::MIN_LEN && expired(self.angles[0]) {
            self.points.pop_front();
            self.angles.pop_front();
            removed += 1;
        }
        removed
    }

    /// Replace the whole history with `point` twice.
    pub fn reset(&mut self, point: Complex64, angle: f64) {
        self.points.clear();
        self.angles.clear();
        for _ in 0..Self::MIN_LEN {
            self.push(point, angle);
        }
    }

    pub fn shift_angles(&mut self, delta: f64) {
        for angle in self.angles.iter_mut() {
            *angle += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> TraceBuffer {
        let mut buffer = TraceBuffer::seeded(Complex64::new(0.0, 0.0), 0.0);
        for i in 1..=5 {
            buffer.push(Complex64::new(i as f64, 0.0), i as f64);
        }
        buffer
    }

    #[test]
    fn seeded_buffer_has_two_entries() {
        let buffer = TraceBuffer::seeded(Complex64::new(1.0, 2.0), 0.5);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.points()[0], buffer.points()[1]);
        assert_eq!(buffer.last(), (Complex64::new(1.0, 2.0), 0.5));
    }

    #[test]
    fn trim_removes_expired_prefix_only() {
        let mut buffer = filled();
        let removed = buffer.trim_front_while(|a| a < 3.0);
        assert_eq!(removed, 4);
        assert_eq!(buffer.oldest_angle(), 3.0);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn trim_keeps_minimum_length() {
        let mut buffer = filled();
        buffer.trim_front_while(|_| true);
        assert_eq!(buffer.len(), TraceBuffer::MIN_LEN);
        assert_eq!(buffer.last().1, 5.0);
    }

    #[test]
    fn reset_and_shift() {
        let mut buffer = filled();
        buffer.reset(Complex64::new(9.0, 9.0), 2.0);
        assert_eq!(buffer.len(), 2);
        buffer.shift_angles(-1.5);
        assert!(buffer.angles().iter().all(|&a| a == 0.5));
    }
}
