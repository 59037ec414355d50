use std::path::PathBuf;

/// Errors raised while loading a path, decomposing it, or building a tracer.
///
/// Everything here is detected up front. Once a [`crate::tracer::Tracer`]
/// exists, per-frame operations cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path contains no points")]
    EmptyPath,

    #[error("harmonic limit must be positive or 0 for unlimited, got {0}")]
    InvalidHarmonicLimit(i64),

    #[error("scale factor must be between 0 and 1 (0 disables scaling), got {0}")]
    InvalidScaleFactor(f64),

    #[error("speed index {index} is outside the speed ladder (0..{len})")]
    InvalidSpeedIndex { index: usize, len: usize },

    #[error("invalid tracer settings: {0}")]
    InvalidTracerSettings(String),

    #[error("line {line}: expected two numbers `x y`, got {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// True for errors caused by bad caller input rather than the environment.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, Error::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
