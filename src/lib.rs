//! Draw closed paths with chains of rotating circles.
//!
//! A path sampled at uniform steps is split into rotating vectors by
//! [`fourier::decompose`]; a [`tracer::Tracer`] then turns those vectors frame
//! by frame and keeps an error-bounded polyline of what the pen has drawn.

pub mod cli;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod fourier;
pub mod path;
pub mod tracer;

pub use error::{Error, Result};
pub use fourier::{decompose, DecomposeOptions, Decomposition, Direction, Harmonic};
pub use rustfft::num_complex::Complex64;
pub use tracer::{SpeedChange, Tracer, TracerSettings};

use config::Config;

/// Lay out raw input points, decompose them and build a tracer anchored at
/// the viewport center.
pub fn build_tracer(points: Vec<Complex64>, config: &Config) -> Result<Tracer> {
    let options = config.decompose_options()?;
    let points = path::layout(points, &config.layout_options())?;
    let decomposition = decompose(&points, &options)?;
    Tracer::new(
        decomposition,
        config.display.viewport().center(),
        config.tracer.direction,
        config.tracer.speed_index,
        config.tracer_settings(),
    )
}
