//! Light and dark color palettes for both views.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Fixed colors for one theme.
#[derive(Debug)]
pub struct Palette {
    pub background: Rgb,
    pub axis: Rgb,
    pub grid: Rgb,
    /// Color stops for the surface, low to high.
    pub surface_map: &'static [Rgb],
    /// Color stops for the contour heatmap, low to high.
    pub heatmap_map: &'static [Rgb],
    pub tangent: Rgb,
    pub point: Rgb,
    pub gradient: Rgb,
    pub vectors: Rgb,
    pub iso_lines: Rgb,
}

/// Catppuccin Latte base with a blue-to-yellow surface.
pub const LIGHT: Palette = Palette {
    background: Rgb(239, 241, 245),
    axis: Rgb(76, 79, 105),
    grid: Rgb(188, 192, 204),
    surface_map: &[
        Rgb(30, 102, 245),
        Rgb(4, 165, 229),
        Rgb(23, 146, 153),
        Rgb(64, 160, 43),
        Rgb(223, 142, 29),
    ],
    heatmap_map: &[
        Rgb(220, 224, 232),
        Rgb(153, 209, 219),
        Rgb(114, 135, 253),
        Rgb(136, 57, 239),
    ],
    tangent: Rgb(254, 100, 11),
    point: Rgb(210, 15, 57),
    gradient: Rgb(210, 15, 57),
    vectors: Rgb(92, 95, 119),
    iso_lines: Rgb(76, 79, 105),
};

/// Catppuccin Mocha base with a viridis-like surface.
pub const DARK: Palette = Palette {
    background: Rgb(30, 30, 46),
    axis: Rgb(88, 91, 112),
    grid: Rgb(49, 50, 68),
    surface_map: &[
        Rgb(68, 1, 84),
        Rgb(59, 82, 139),
        Rgb(33, 145, 140),
        Rgb(94, 201, 98),
        Rgb(253, 231, 37),
    ],
    heatmap_map: &[
        Rgb(24, 24, 37),
        Rgb(69, 71, 90),
        Rgb(116, 199, 236),
        Rgb(249, 226, 175),
    ],
    tangent: Rgb(250, 179, 135),
    point: Rgb(243, 139, 168),
    gradient: Rgb(243, 139, 168),
    vectors: Rgb(166, 173, 200),
    iso_lines: Rgb(205, 214, 244),
};

/// Linear interpolation through `stops` at `t` in [0, 1].
pub fn interpolate(stops: &[Rgb], t: f64) -> Rgb {
    match stops {
        [] => Rgb(0, 0, 0),
        [only] => *only,
        _ => {
            let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
            let scaled = t * (stops.len() - 1) as f64;
            let i = (scaled.floor() as usize).min(stops.len() - 2);
            let frac = scaled - i as f64;
            let (a, b) = (stops[i], stops[i + 1]);
            let mix = |p: u8, q: u8| (p as f64 + (q as f64 - p as f64) * frac).round() as u8;
            Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
        }
    }
}

/// Position of `value` within `[min, max]`, 0.5 for a flat range.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max - min <= f64::EPSILON {
        0.5
    } else {
        (value - min) / (max - min)
    }
}
