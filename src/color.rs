use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Circles and arms are drawn in a neutral gray.
pub const CIRCLE_COLOR: (u8, u8, u8) = (170, 170, 170);
pub const ARM_COLOR: (u8, u8, u8) = (110, 110, 110);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Classic,
    Spectrum,
    Rainbow,
    Fire,
    Ocean,
    Monochrome,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" | "red" => Ok(Self::Classic),
            "spectrum" => Ok(Self::Spectrum),
            "rainbow" => Ok(Self::Rainbow),
            "fire" => Ok(Self::Fire),
            "ocean" => Ok(Self::Ocean),
            "mono" | "monochrome" => Ok(Self::Monochrome),
            _ => Err(format!("Unknown color scheme: {}", s)),
        }
    }
}

impl ColorScheme {
    /// Color of the trail at `age`, where 0 is the pen tip and 1 is one
    /// revolution old. With `fade` the color darkens toward black with age.
    pub fn trail_color(&self, age: f64, fade: bool) -> (u8, u8, u8) {
        let age = age.clamp(0.0, 1.0) as f32;
        let position = 1.0 - age;
        let (h, s, l) = match self {
            ColorScheme::Classic => (0.0, 1.0, 0.5),
            ColorScheme::Spectrum => {
                // purple -> blue -> cyan -> green -> yellow -> red toward the tip
                (270.0 - position * 270.0, 0.9, 0.55)
            }
            ColorScheme::Rainbow => (position * 360.0, 0.85, 0.6),
            ColorScheme::Fire => (position * 60.0, 0.95, 0.5),
            ColorScheme::Ocean => (180.0 + position * 60.0, 0.8, 0.55),
            ColorScheme::Monochrome => (0.0, 0.0, 0.9),
        };
        let l = if fade { l * (1.0 - age) } else { l };

        let hsl = Hsl::new(h, s, l);
        let rgb: Srgb = hsl.into_color();

        (
            (rgb.red * 255.0).round() as u8,
            (rgb.green * 255.0).round() as u8,
            (rgb.blue * 255.0).round() as u8,
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Classic => "classic",
            ColorScheme::Spectrum => "spectrum",
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::Fire => "fire",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Monochrome => "monochrome",
        }
    }

    pub fn all() -> &'static [ColorScheme] {
        &[
            ColorScheme::Classic,
            ColorScheme::Spectrum,
            ColorScheme::Rainbow,
            ColorScheme::Fire,
            ColorScheme::Ocean,
            ColorScheme::Monochrome,
        ]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|c| c == self).unwrap_or(0);
        all[(current + 1) % all.len()]
    }
}
