use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::Args;
use crate::color::ColorScheme;
use crate::fourier::{self, DecomposeOptions, Direction, DEFAULT_AMPLITUDE_CUTOFF};
use crate::path::{LayoutOptions, Viewport};
use crate::tracer::{
    TracerSettings, DEFAULT_MAX_BISECTION_DEPTH, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE,
    DEFAULT_SPEED_INDEX, DEFAULT_SPEED_LADDER,
};

pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_SCALE_FACTOR: f64 = 0.8;
pub const DEFAULT_VIEWPORT_SIZE: f64 = 700.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub decompose: DecomposeConfig,
    pub tracer: TracerConfig,
    pub display: DisplayConfig,
    pub path: PathConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Maximum number of harmonics, 0 for all
    pub harmonics: i64,
    pub amplitude_cutoff: f64,
    /// Negate every frequency so all circles turn the other way
    pub mirror: bool,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            harmonics: 0,
            amplitude_cutoff: DEFAULT_AMPLITUDE_CUTOFF,
            mirror: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TracerConfig {
    pub min_distance: f64,
    pub max_distance: f64,
    pub max_bisection_depth: usize,
    /// Angular speeds in rad/s, strictly ascending
    pub speed_ladder: Vec<f64>,
    pub speed_index: usize,
    pub direction: Direction,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            max_bisection_depth: DEFAULT_MAX_BISECTION_DEPTH,
            speed_ladder: DEFAULT_SPEED_LADDER.to_vec(),
            speed_index: DEFAULT_SPEED_INDEX,
            direction: Direction::Forward,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub fps: u32,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub scale_factor: f64,
    pub show_circles: bool,
    /// Circles smaller than this are not drawn
    pub circle_radius_cutoff: f64,
    pub fade: bool,
    pub start_paused: bool,
    pub color_scheme: ColorScheme,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            viewport_width: DEFAULT_VIEWPORT_SIZE,
            viewport_height: DEFAULT_VIEWPORT_SIZE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            show_circles: true,
            circle_radius_cutoff: 1.0,
            fade: false,
            start_paused: false,
            color_scheme: ColorScheme::Classic,
        }
    }
}

impl DisplayConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// Nominal seconds per frame.
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.fps.max(1) as f64
    }

    /// Longest time step handed to the tracer in one frame.
    pub fn dt_limit(&self) -> f64 {
        2.0 * self.frame_interval()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathConfig {
    /// Input y axis points down (image coordinates)
    pub flip_y: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/epicycles/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("epicycles").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists.
    /// Returns None if the file doesn't exist and warns on parse errors.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Failed to parse config at {}: {}. Using defaults.", path.display(), e);
                None
            }
        }
    }

    /// Write the config template to the XDG path and return that path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::generate_config_template())?;

        Ok(path)
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# Epicycles Configuration
# This file is auto-generated. Edit as needed.

[decompose]
# Maximum number of harmonics (circles), 0 for all
harmonics = 0
# Harmonics with a radius below this are dropped
amplitude_cutoff = 0.1
# Negate every frequency so all circles turn the other way
mirror = false

[tracer]
# Samples closer than this to the previous point are skipped
min_distance = 1.0
# Consecutive points farther apart than this get intermediate points
max_distance = 5.0
# Bisection nesting limit for one frame step
max_bisection_depth = 16
# Angular speeds in rad/s, strictly ascending; +/- step through them
speed_ladder = [0.0625, 0.125, 0.25, 0.5, 1.0, 2.0, 4.0]
# Initial rung on the ladder (0 is slowest)
speed_index = 4
# Initial rotation: "forward" or "reverse"
direction = "forward"

[display]
# Target frames per second
fps = 30
# Virtual drawing area the path is fitted into
viewport_width = 700.0
viewport_height = 700.0
# Share of the viewport the shape occupies (0-1, 0 disables scaling)
scale_factor = 0.8
# Draw the circles and their arms
show_circles = true
# Circles smaller than this are not drawn
circle_radius_cutoff = 1.0
# Fade the line so it vanishes after one revolution
fade = false
# Start paused
start_paused = false
# Color scheme: "classic", "spectrum", "rainbow", "fire", "ocean", "monochrome"
color_scheme = "classic"

[path]
# Input y axis points down (image coordinates)
flip_y = false
"#
        .to_string()
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &Args) {
        if let Some(n) = args.harmonics {
            self.decompose.harmonics = n;
        }
        if args.mirror {
            self.decompose.mirror = true;
        }

        if args.reverse {
            self.tracer.direction = Direction::Reverse;
        }
        if let Some(index) = args.speed_index {
            self.tracer.speed_index = index;
        }

        if let Some(scale) = args.scale_factor {
            self.display.scale_factor = scale;
        }
        if let Some(fps) = args.fps {
            self.display.fps = fps;
        }
        if args.fade {
            self.display.fade = true;
        }
        if args.paused {
            self.display.start_paused = true;
        }
        if args.no_circles {
            self.display.show_circles = false;
        }
        if let Some(scheme) = args.colors {
            self.display.color_scheme = scheme;
        }

        if args.flip_y {
            self.path.flip_y = true;
        }
    }

    pub fn decompose_options(&self) -> crate::Result<DecomposeOptions> {
        Ok(DecomposeOptions {
            limit: fourier::limit_from_raw(self.decompose.harmonics)?,
            amplitude_cutoff: self.decompose.amplitude_cutoff,
            direction: if self.decompose.mirror {
                Direction::Reverse
            } else {
                Direction::Forward
            },
        })
    }

    pub fn tracer_settings(&self) -> TracerSettings {
        TracerSettings {
            min_distance: self.tracer.min_distance,
            max_distance: self.tracer.max_distance,
            max_bisection_depth: self.tracer.max_bisection_depth,
            speed_ladder: self.tracer.speed_ladder.clone(),
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            flip_y: self.path.flip_y,
            scale_factor: self.display.scale_factor,
            viewport: self.display.viewport(),
        }
    }
}
