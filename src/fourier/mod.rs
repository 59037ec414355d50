mod decompose;

pub use decompose::{decompose, limit_from_raw, DecomposeOptions, DEFAULT_AMPLITUDE_CUTOFF};

use clap::ValueEnum;
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Rotation direction shared by the decomposer and the tracer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// One rotating vector of the chain.
///
/// `amplitude` is the vector at phase 0, so `|amplitude|` is the circle radius.
/// `frequency` counts full turns per revolution of the phase angle; its sign
/// is the turning direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    pub amplitude: Complex64,
    pub frequency: i32,
}

impl Harmonic {
    pub fn new(amplitude: Complex64, frequency: i32) -> Self {
        Self { amplitude, frequency }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.amplitude.norm()
    }

    /// The vector this harmonic contributes at `angle`.
    #[inline]
    pub fn rotor(&self, angle: f64) -> Complex64 {
        self.amplitude * Complex64::cis(self.frequency as f64 * angle)
    }
}

/// Output of [`decompose`]: the ranked harmonics plus the DC term.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub harmonics: Vec<Harmonic>,
    /// Mean position of the path; the first circle is centered here.
    pub offset: Complex64,
}

impl Decomposition {
    pub fn len(&self) -> usize {
        self.harmonics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.harmonics.is_empty()
    }

    /// Evaluate the full sum at `angle` with the chain anchored at the origin.
    pub fn evaluate(&self, angle: f64) -> Complex64 {
        self.harmonics
            .iter()
            .fold(self.offset, |acc, h| acc + h.rotor(angle))
    }
}
