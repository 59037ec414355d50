use rustfft::{num_complex::Complex64, FftPlanner};
use tracing::debug;

use super::{Decomposition, Direction, Harmonic};
use crate::error::{Error, Result};

/// Harmonics smaller than this (in path units) are dropped by default.
pub const DEFAULT_AMPLITUDE_CUTOFF: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecomposeOptions {
    /// Keep at most this many harmonics. `None` and `Some(0)` keep all of them.
    pub limit: Option<usize>,
    /// Drop harmonics with `|amplitude|` below this. `0.0` keeps everything.
    pub amplitude_cutoff: f64,
    /// `Reverse` negates every assigned frequency.
    pub direction: Direction,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            limit: None,
            amplitude_cutoff: DEFAULT_AMPLITUDE_CUTOFF,
            direction: Direction::Forward,
        }
    }
}

impl DecomposeOptions {
    /// No filtering and no truncation: every coefficient becomes a harmonic.
    pub fn exact() -> Self {
        Self {
            amplitude_cutoff: 0.0,
            ..Self::default()
        }
    }
}

/// Interpret a raw harmonic limit from user input.
///
/// `0` is the unlimited sentinel, positive values are limits and negative
/// values are rejected.
pub fn limit_from_raw(raw: i64) -> Result<Option<usize>> {
    match raw {
        0 => Ok(None),
        n if n > 0 => Ok(Some(n as usize)),
        n => Err(Error::InvalidHarmonicLimit(n)),
    }
}

/// Turn one traversal of a closed path into rotating vectors.
///
/// Runs the inverse DFT over `points`. Coefficient 0 becomes the offset. The
/// rest are consumed alternately from the front and the back of the spectrum
/// and assigned frequencies `+1, -1, +2, -2, ...` in that order, which is
/// also the order of the returned harmonics.
pub fn decompose(points: &[Complex64], options: &DecomposeOptions) -> Result<Decomposition> {
    if points.is_empty() {
        return Err(Error::EmptyPath);
    }

    let n = points.len();
    let mut spectrum = points.to_vec();
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut spectrum);

    // rustfft does not normalize
    let scale = 1.0 / n as f64;
    for coefficient in spectrum.iter_mut() {
        *coefficient *= scale;
    }

    let offset = spectrum[0];
    let sign = match options.direction {
        Direction::Forward => 1,
        Direction::Reverse => -1,
    };

    let mut harmonics = Vec::with_capacity(n - 1);
    let mut front = 1;
    let mut back = n - 1;
    let mut turns = 1i32;
    let mut from_front = true;
    let mut dropped = 0usize;

    while front <= back {
        let (index, frequency) = if from_front {
            let index = front;
            front += 1;
            (index, turns)
        } else {
            let index = back;
            let frequency = -turns;
            back -= 1;
            turns += 1;
            (index, frequency)
        };
        from_front = !from_front;

        let amplitude = spectrum[index];
        if amplitude.norm() >= options.amplitude_cutoff {
            harmonics.push(Harmonic::new(amplitude, sign * frequency));
        } else {
            dropped += 1;
        }
    }

    if let Some(limit) = options.limit.filter(|&limit| limit > 0) {
        harmonics.truncate(limit);
    }

    debug!(
        points = n,
        harmonics = harmonics.len(),
        dropped,
        "decomposed path"
    );

    Ok(Decomposition { harmonics, offset })
}
