use clap::Parser;
use std::path::PathBuf;

use crate::color::ColorScheme;

#[derive(Parser, Debug, Default)]
#[command(name = "epicycles")]
#[command(author, version, about = "Draw a closed path with a chain of rotating circles")]
pub struct Args {
    /// File with one `x y` point per line describing one traversal of a closed path
    #[arg(required_unless_present = "init_config")]
    pub file: Option<PathBuf>,

    /// Maximum number of harmonics (circles), 0 for all
    #[arg(short = 'n', long = "harmonics", allow_negative_numbers = true)]
    pub harmonics: Option<i64>,

    /// Share of the window the shape should occupy, between 0 and 1 (0 disables scaling)
    #[arg(short, long = "scale", allow_negative_numbers = true)]
    pub scale_factor: Option<f64>,

    /// Fade the line so it vanishes after one revolution
    #[arg(short, long)]
    pub fade: bool,

    /// Start rotating in reverse
    #[arg(short, long)]
    pub reverse: bool,

    /// Mirror the decomposition so every circle turns the other way
    #[arg(short, long)]
    pub mirror: bool,

    /// Start paused
    #[arg(short, long)]
    pub paused: bool,

    /// Hide the circles and show only the traced line
    #[arg(long)]
    pub no_circles: bool,

    /// Input y axis points down (image coordinates)
    #[arg(long)]
    pub flip_y: bool,

    /// Color scheme: classic, spectrum, rainbow, fire, ocean, mono
    #[arg(long)]
    pub colors: Option<ColorScheme>,

    /// Target frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Initial rung on the speed ladder (0 is slowest)
    #[arg(long)]
    pub speed_index: Option<usize>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a commented default config to ~/.config/epicycles/config.toml and exit
    #[arg(long)]
    pub init_config: bool,
}
