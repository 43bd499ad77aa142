/// Plot series, layouts and rendered output types.
use serde::{Deserialize, Serialize};

use crate::plot::palette::{Rgb, Theme};
use crate::session::state::{Toggle, VisibilityState};

/// Output image dimensions for the inline views (pixels).
pub const PLOT_WIDTH: u32 = 800;
pub const PLOT_HEIGHT: u32 = 600;

pub type Point2 = (f64, f64);
pub type Point3 = (f64, f64, f64);

/// Which of the two views a series or image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotTarget {
    ThreeD,
    TwoD,
}

impl PlotTarget {
    pub const ALL: [PlotTarget; 2] = [PlotTarget::ThreeD, PlotTarget::TwoD];

    pub fn label(self) -> &'static str {
        match self {
            PlotTarget::ThreeD => "3d",
            PlotTarget::TwoD => "2d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Surface,
    TangentPlane,
    Point,
    Gradient,
    Contour,
    VectorField,
}

impl SeriesKind {
    /// The user toggle controlling this kind; `None` means always shown.
    pub fn toggle(self) -> Option<Toggle> {
        match self {
            SeriesKind::Surface => Some(Toggle::Surface),
            SeriesKind::TangentPlane => Some(Toggle::TangentPlane),
            SeriesKind::Gradient => Some(Toggle::Gradient),
            SeriesKind::Contour => Some(Toggle::Contour),
            SeriesKind::VectorField => Some(Toggle::Vectors),
            SeriesKind::Point => None,
        }
    }
}

/// Heights over a rectangular grid; `z[j][i]` sits at `(xs[i], ys[j])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}

impl GridData {
    /// Smallest and largest height, or `None` for an empty grid.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.z.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Line segments at one contour level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoLine {
    pub level: f64,
    pub segments: Vec<(Point2, Point2)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeriesData {
    Surface(GridData),
    Contour { grid: GridData, iso_lines: Vec<IsoLine> },
    Markers3 { points: Vec<Point3> },
    Markers2 { points: Vec<Point2> },
    Segments3 { segments: Vec<(Point3, Point3)> },
    Segments2 { segments: Vec<(Point2, Point2)> },
}

/// Theme-derived drawing attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: Rgb,
    /// Color stops for height-mapped series; empty otherwise.
    pub colormap: Vec<Rgb>,
    pub opacity: f64,
    pub stroke_width: u32,
}

impl SeriesStyle {
    pub fn solid(color: Rgb, stroke_width: u32) -> Self {
        Self {
            color,
            colormap: Vec::new(),
            opacity: 1.0,
            stroke_width,
        }
    }

    pub fn mapped(color: Rgb, colormap: &[Rgb], opacity: f64) -> Self {
        Self {
            color,
            colormap: colormap.to_vec(),
            opacity,
            stroke_width: 1,
        }
    }
}

/// One named, drawable series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub name: String,
    pub kind: SeriesKind,
    pub data: SeriesData,
    pub visible: bool,
    pub style: SeriesStyle,
}

/// The series for both views, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeriesSet {
    pub three_d: Vec<PlotSeries>,
    pub two_d: Vec<PlotSeries>,
}

impl PlotSeriesSet {
    pub fn series(&self, target: PlotTarget) -> &[PlotSeries] {
        match target {
            PlotTarget::ThreeD => &self.three_d,
            PlotTarget::TwoD => &self.two_d,
        }
    }

    pub fn find(&self, target: PlotTarget, kind: SeriesKind) -> Option<&PlotSeries> {
        self.series(target).iter().find(|s| s.kind == kind)
    }

    /// Copy of this set with every `visible` flag taken from `visibility`.
    /// Coordinates and styles are left as they are.
    pub fn with_visibility(&self, visibility: &VisibilityState) -> Self {
        let retag = |list: &[PlotSeries]| {
            list.iter()
                .map(|s| PlotSeries {
                    visible: visibility.shows(s.kind),
                    ..s.clone()
                })
                .collect::<Vec<_>>()
        };
        Self {
            three_d: retag(&self.three_d),
            two_d: retag(&self.two_d),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Orbit camera for the 3D view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub yaw: f64,
    pub pitch: f64,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.35,
            scale: 0.85,
        }
    }
}

impl Camera {
    pub fn rotated(self, delta: f64) -> Self {
        let yaw = (self.yaw + delta).rem_euclid(std::f64::consts::TAU);
        Self { yaw, ..self }
    }
}

/// Everything about a draw call that is not series data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub width: u32,
    pub height: u32,
    pub theme: Theme,
    pub camera: Camera,
}

impl PlotLayout {
    pub fn new(theme: Theme) -> Self {
        Self {
            width: PLOT_WIDTH,
            height: PLOT_HEIGHT,
            theme,
            camera: Camera::default(),
        }
    }

    pub fn with_size(self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }
}

/// A rendered view as a raw RGB8 buffer.
#[derive(Debug, Clone)]
pub struct RenderedPlot {
    pub target: PlotTarget,
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RenderedPlot {
    pub fn to_image(&self) -> Option<image::DynamicImage> {
        image::RgbImage::from_raw(self.width, self.height, self.rgb.clone())
            .map(image::DynamicImage::ImageRgb8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(kind: SeriesKind) -> PlotSeries {
        PlotSeries {
            name: format!("{:?}", kind),
            kind,
            data: SeriesData::Markers2 {
                points: vec![(1.0, 2.0)],
            },
            visible: true,
            style: SeriesStyle::solid(Rgb(1, 2, 3), 1),
        }
    }

    #[test]
    fn test_with_visibility_keeps_data() {
        let set = PlotSeriesSet {
            three_d: vec![markers(SeriesKind::Surface), markers(SeriesKind::Point)],
            two_d: vec![markers(SeriesKind::Contour)],
        };
        let hidden = VisibilityState {
            surface: false,
            ..VisibilityState::default()
        };
        let retagged = set.with_visibility(&hidden);
        assert!(!retagged.three_d[0].visible);
        assert!(retagged.three_d[1].visible);
        assert!(retagged.two_d[0].visible);
        assert_eq!(retagged.three_d[0].data, set.three_d[0].data);
    }

    #[test]
    fn test_grid_z_range() {
        let grid = GridData {
            xs: vec![0.0, 1.0],
            ys: vec![0.0],
            z: vec![vec![3.0, -1.0]],
        };
        assert_eq!(grid.z_range(), Some((-1.0, 3.0)));
    }

    #[test]
    fn test_json_tags() {
        let set = PlotSeriesSet {
            three_d: vec![],
            two_d: vec![markers(SeriesKind::Point)],
        };
        let json = set.to_json().unwrap();
        assert!(json.contains("\"kind\": \"point\""));
        assert!(json.contains("\"type\": \"markers2\""));
    }

    #[test]
    fn test_rendered_plot_to_image() {
        let plot = RenderedPlot {
            target: PlotTarget::TwoD,
            rgb: vec![0; 2 * 3 * 3],
            width: 2,
            height: 3,
        };
        let img = plot.to_image().unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
    }

    #[test]
    fn test_camera_rotation_wraps() {
        let cam = Camera::default().rotated(std::f64::consts::TAU);
        assert!((cam.yaw - Camera::default().yaw).abs() < 1e-12);
    }
}
