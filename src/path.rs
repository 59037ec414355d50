//! Loading a path from disk and fitting it into a viewport.

use std::path::Path;

use rustfft::num_complex::Complex64;
use tracing::debug;

use crate::error::{Error, Result};

/// Drawing area the path is laid out in, in path units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Complex64 {
        Complex64::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned bounding box of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Complex64,
    pub max: Complex64,
}

impl Bounds {
    pub fn of(points: &[Complex64]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().skip(1).fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, p| Bounds {
                min: Complex64::new(b.min.re.min(p.re), b.min.im.min(p.im)),
                max: Complex64::new(b.max.re.max(p.re), b.max.im.max(p.im)),
            },
        ))
    }

    pub fn width(&self) -> f64 {
        self.max.re - self.min.re
    }

    pub fn height(&self) -> f64 {
        self.max.im - self.min.im
    }

    pub fn center(&self) -> Complex64 {
        (self.min + self.max) / 2.0
    }
}

/// Parse `x y` pairs, one per line.
///
/// Blank lines and lines starting with `#` are ignored.
pub fn parse_points(text: &str) -> Result<Vec<Complex64>> {
    let mut points = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let malformed = || Error::MalformedLine {
            line: i + 1,
            content: line.to_string(),
        };
        let mut fields = trimmed.split_whitespace();
        let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed());
        };
        let x: f64 = x.parse().map_err(|_| malformed())?;
        let y: f64 = y.parse().map_err(|_| malformed())?;
        if !x.is_finite() || !y.is_finite() {
            return Err(malformed());
        }
        points.push(Complex64::new(x, y));
    }

    if points.is_empty() {
        return Err(Error::EmptyPath);
    }
    Ok(points)
}

pub fn load_points(path: &Path) -> Result<Vec<Complex64>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let points = parse_points(&content)?;
    debug!(path = %path.display(), points = points.len(), "loaded path");
    Ok(points)
}

/// Negate every y coordinate, for input drawn with y pointing down.
pub fn flip_y(points: &mut [Complex64]) {
    for p in points.iter_mut() {
        *p = p.conj();
    }
}

/// Move the bounding-box center of `points` to the origin.
pub fn center(points: &mut [Complex64]) -> Option<Bounds> {
    let bounds = Bounds::of(points)?;
    let shift = bounds.center();
    for p in points.iter_mut() {
        *p -= shift;
    }
    Bounds::of(points)
}

/// Scale centered `points` so the shape fills `scale_factor` of the viewport
/// along whichever axis runs out of room first.
///
/// A factor of 0 leaves the points untouched.
pub fn scale(points: &mut [Complex64], scale_factor: f64, viewport: Viewport) -> Result<()> {
    if !(0.0..=1.0).contains(&scale_factor) {
        return Err(Error::InvalidScaleFactor(scale_factor));
    }
    if scale_factor == 0.0 {
        return Ok(());
    }
    let Some(bounds) = Bounds::of(points) else {
        return Ok(());
    };

    let ratios = [
        (bounds.width(), viewport.width),
        (bounds.height(), viewport.height),
    ]
    .into_iter()
    .filter(|(extent, _)| *extent > 0.0)
    .map(|(extent, room)| scale_factor * room / extent);

    let Some(ratio) = ratios.reduce(f64::min) else {
        // A single repeated point has nothing to scale.
        return Ok(());
    };
    for p in points.iter_mut() {
        *p *= ratio;
    }
    Ok(())
}

/// How raw input points are prepared before decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub flip_y: bool,
    pub scale_factor: f64,
    pub viewport: Viewport,
}

/// Flip, center and scale `points` for display. The result is centered on
/// the origin; anchor the tracer at [`Viewport::center`].
pub fn layout(mut points: Vec<Complex64>, options: &LayoutOptions) -> Result<Vec<Complex64>> {
    if points.is_empty() {
        return Err(Error::EmptyPath);
    }
    if options.flip_y {
        flip_y(&mut points);
    }
    center(&mut points);
    scale(&mut points, options.scale_factor, options.viewport)?;
    Ok(points)
}
