/// Rendering pipeline: plot series → RGB buffers via plotters.
use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use crate::plot::grid::{DOMAIN_MAX, DOMAIN_MIN};
use crate::plot::palette::{interpolate, normalize, Rgb};
use crate::plot::types::*;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot draw the {target} view ({step}): {message}")]
    Draw {
        target: &'static str,
        step: &'static str,
        message: String,
    },
    #[error("canvas size {width}x{height} is empty")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("nothing has been plotted yet")]
    NothingToExport,
    #[error("the {0} render worker panicked")]
    Panicked(&'static str),
}

/// Builds a `map_err` adapter for plotters errors.
fn fail<E: std::fmt::Display>(target: PlotTarget, step: &'static str) -> impl Fn(E) -> RenderError {
    move |e| RenderError::Draw {
        target: target.label(),
        step,
        message: e.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    /// Target file; the format's extension is appended when missing.
    pub filename: PathBuf,
}

impl ExportOptions {
    pub fn path(&self) -> PathBuf {
        let ext = self.format.extension();
        let has_ext = self
            .filename
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext) || (ext == "jpg" && e.eq_ignore_ascii_case("jpeg")));
        if has_ext {
            self.filename.clone()
        } else {
            let mut name = self.filename.clone().into_os_string();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        }
    }
}

impl RenderedPlot {
    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        match format {
            ExportFormat::Png => PngEncoder::new(&mut out).write_image(
                &self.rgb,
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )?,
            ExportFormat::Jpeg => JpegEncoder::new_with_quality(&mut out, 90).write_image(
                &self.rgb,
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )?,
        }
        Ok(out)
    }
}

/// Draws one view of a series list.
pub trait Renderer: Sync {
    fn draw(
        &self,
        target: PlotTarget,
        series: &[PlotSeries],
        layout: &PlotLayout,
    ) -> Result<RenderedPlot, RenderError>;
}

/// Rasterizes with plotters' bitmap backend. Labels are left off so no
/// font support is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersRenderer;

impl Renderer for PlottersRenderer {
    fn draw(
        &self,
        target: PlotTarget,
        series: &[PlotSeries],
        layout: &PlotLayout,
    ) -> Result<RenderedPlot, RenderError> {
        let (width, height) = (layout.width, layout.height);
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyCanvas { width, height });
        }
        let mut rgb = vec![0u8; width as usize * height as usize * 3];

        {
            let palette = layout.theme.palette();
            let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
            root.fill(&rgb_color(palette.background))
                .map_err(fail(target, "fill"))?;

            match target {
                PlotTarget::ThreeD => draw_3d(&root, series, layout)?,
                PlotTarget::TwoD => draw_2d(&root, series, layout)?,
            }

            root.present().map_err(fail(target, "present"))?;
        }

        Ok(RenderedPlot {
            target,
            rgb,
            width,
            height,
        })
    }
}

fn rgb_color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Height range for the 3D axes, taken from the surface even when hidden
/// so toggling does not rescale the view.
fn z_bounds(series: &[PlotSeries]) -> (f64, f64) {
    let range = series.iter().find_map(|s| match (&s.kind, &s.data) {
        (SeriesKind::Surface, SeriesData::Surface(grid)) => grid.z_range(),
        _ => None,
    });
    match range {
        Some((lo, hi)) if hi - lo > 1e-9 => (lo, hi),
        Some((lo, _)) => (lo - 1.0, lo + 1.0),
        None => (-1.0, 1.0),
    }
}

fn draw_3d(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    series: &[PlotSeries],
    layout: &PlotLayout,
) -> Result<(), RenderError> {
    let target = PlotTarget::ThreeD;
    let palette = layout.theme.palette();
    let (z_lo, z_hi) = z_bounds(series);

    // plotters' vertical axis is the second one, so data (x, y, z) maps to (x, z, y)
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .build_cartesian_3d(DOMAIN_MIN..DOMAIN_MAX, z_lo..z_hi, DOMAIN_MIN..DOMAIN_MAX)
        .map_err(fail(target, "chart build"))?;

    let camera = layout.camera;
    chart.with_projection(|mut pb| {
        pb.yaw = camera.yaw;
        pb.pitch = camera.pitch;
        pb.scale = camera.scale;
        pb.into_matrix()
    });

    let axis = rgb_color(palette.axis);
    chart
        .configure_axes()
        .light_grid_style(axis.mix(0.15))
        .bold_grid_style(axis.mix(0.3))
        .axis_panel_style(rgb_color(palette.grid).mix(0.2))
        .max_light_lines(4)
        .x_labels(0)
        .y_labels(0)
        .z_labels(0)
        .draw()
        .map_err(fail(target, "axes"))?;

    for s in series.iter().filter(|s| s.visible) {
        match (&s.kind, &s.data) {
            (SeriesKind::Surface, SeriesData::Surface(grid)) => {
                let cells = grid_cells(grid).map(|corners| {
                    let mean = corners.iter().map(|c| c.1).sum::<f64>() / 4.0;
                    let fill = interpolate(&s.style.colormap, normalize(mean, z_lo, z_hi));
                    Polygon::new(corners.to_vec(), rgb_color(fill).mix(s.style.opacity).filled())
                });
                chart.draw_series(cells).map_err(fail(target, "surface"))?;
            }
            (SeriesKind::TangentPlane, SeriesData::Surface(grid)) => {
                let style = rgb_color(s.style.color).mix(s.style.opacity).filled();
                let cells = grid_cells(grid)
                    .filter(|corners| corners.iter().all(|c| c.1 >= z_lo && c.1 <= z_hi))
                    .map(|corners| Polygon::new(corners.to_vec(), style));
                chart.draw_series(cells).map_err(fail(target, "tangent plane"))?;
            }
            (_, SeriesData::Markers3 { points }) => {
                let style = rgb_color(s.style.color).filled();
                let size = s.style.stroke_width as i32;
                chart
                    .draw_series(points.iter().map(|&(x, y, z)| Circle::new((x, z, y), size, style)))
                    .map_err(fail(target, "markers"))?;
            }
            (_, SeriesData::Segments3 { segments }) => {
                let style = rgb_color(s.style.color).stroke_width(s.style.stroke_width);
                chart
                    .draw_series(segments.iter().map(|&((x0, y0, z0), (x1, y1, z1))| {
                        PathElement::new(vec![(x0, z0, y0), (x1, z1, y1)], style)
                    }))
                    .map_err(fail(target, "segments"))?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Quads of a height grid as plotters coordinates `(x, z, y)`.
fn grid_cells(grid: &GridData) -> impl Iterator<Item = [(f64, f64, f64); 4]> + '_ {
    let nx = grid.xs.len();
    let ny = grid.ys.len();
    (0..ny.saturating_sub(1)).flat_map(move |j| {
        (0..nx.saturating_sub(1)).map(move |i| {
            let at = |i: usize, j: usize| (grid.xs[i], grid.z[j][i], grid.ys[j]);
            [at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]
        })
    })
}

/// The two short strokes of an arrow head at `to`.
fn arrow_head(from: Point2, to: Point2) -> [(Point2, Point2); 2] {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return [(to, to), (to, to)];
    }
    let head = (len * 0.3).min(0.25);
    let angle = dy.atan2(dx);
    let wing = |offset: f64| {
        let a = angle + std::f64::consts::PI + offset;
        (to, (to.0 + head * a.cos(), to.1 + head * a.sin()))
    };
    [wing(0.45), wing(-0.45)]
}

fn draw_2d(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    series: &[PlotSeries],
    layout: &PlotLayout,
) -> Result<(), RenderError> {
    let target = PlotTarget::TwoD;
    let palette = layout.theme.palette();
    let axis = rgb_color(palette.axis);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .build_cartesian_2d(DOMAIN_MIN..DOMAIN_MAX, DOMAIN_MIN..DOMAIN_MAX)
        .map_err(fail(target, "chart build"))?;

    chart
        .configure_mesh()
        .axis_style(axis)
        .bold_line_style(axis.mix(0.3))
        .light_line_style(axis.mix(0.1))
        .x_labels(0)
        .y_labels(0)
        .draw()
        .map_err(fail(target, "mesh"))?;

    for s in series.iter().filter(|s| s.visible) {
        match &s.data {
            SeriesData::Contour { grid, iso_lines } => {
                let (lo, hi) = grid.z_range().unwrap_or((0.0, 1.0));
                let nx = grid.xs.len();
                let ny = grid.ys.len();
                let cells = (0..ny.saturating_sub(1)).flat_map(|j| {
                    (0..nx.saturating_sub(1)).map(move |i| {
                        let mean =
                            (grid.z[j][i] + grid.z[j][i + 1] + grid.z[j + 1][i] + grid.z[j + 1][i + 1]) / 4.0;
                        let fill = interpolate(&s.style.colormap, normalize(mean, lo, hi));
                        Rectangle::new(
                            [(grid.xs[i], grid.ys[j]), (grid.xs[i + 1], grid.ys[j + 1])],
                            rgb_color(fill).mix(s.style.opacity).filled(),
                        )
                    })
                });
                chart.draw_series(cells).map_err(fail(target, "heatmap"))?;

                let line = rgb_color(s.style.color).mix(0.8).stroke_width(1);
                let segments = iso_lines
                    .iter()
                    .flat_map(|l| l.segments.iter())
                    .map(|&(a, b)| PathElement::new(vec![a, b], line));
                chart.draw_series(segments).map_err(fail(target, "iso-lines"))?;
            }
            SeriesData::Segments2 { segments } => {
                let style = rgb_color(s.style.color).stroke_width(s.style.stroke_width);
                let strokes = segments.iter().flat_map(|&(from, to)| {
                    let [left, right] = arrow_head(from, to);
                    [(from, to), left, right]
                });
                chart
                    .draw_series(strokes.map(|(a, b)| PathElement::new(vec![a, b], style)))
                    .map_err(fail(target, "arrows"))?;
            }
            SeriesData::Markers2 { points } => {
                let style = rgb_color(s.style.color).filled();
                let size = s.style.stroke_width as i32;
                chart
                    .draw_series(points.iter().map(|&p| Circle::new(p, size, style)))
                    .map_err(fail(target, "markers"))?;
            }
            _ => {}
        }
    }
    Ok(())
}
