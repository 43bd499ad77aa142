//! Turns sampled arrays into named, styled, visibility-tagged series.

use crate::plot::contour;
use crate::plot::palette::Theme;
use crate::plot::sampler::SampleResult;
use crate::plot::types::{GridData, PlotSeries, PlotSeriesSet, SeriesData, SeriesKind, SeriesStyle};
use crate::session::state::VisibilityState;

fn series(
    name: &str,
    kind: SeriesKind,
    data: SeriesData,
    style: SeriesStyle,
    visibility: &VisibilityState,
) -> PlotSeries {
    PlotSeries {
        name: name.to_string(),
        kind,
        data,
        visible: visibility.shows(kind),
        style,
    }
}

/// Build both views from one sample. Pure: equal inputs give equal output.
pub fn assemble(result: &SampleResult, visibility: &VisibilityState, theme: Theme) -> PlotSeriesSet {
    let palette = theme.palette();
    let plane = &result.plane;
    let (grad_from, grad_to) = plane.gradient_segment();

    let surface = GridData {
        xs: result.xs.clone(),
        ys: result.ys.clone(),
        z: result.z.clone(),
    };
    let tangent = GridData {
        xs: result.xs.clone(),
        ys: result.ys.clone(),
        z: result.tangent.clone(),
    };
    let iso_lines = contour::iso_lines(&surface, result.contour_levels);

    let three_d = vec![
        series(
            "surface",
            SeriesKind::Surface,
            SeriesData::Surface(surface.clone()),
            SeriesStyle::mapped(palette.surface_map[0], palette.surface_map, 0.9),
            visibility,
        ),
        series(
            "tangent plane",
            SeriesKind::TangentPlane,
            SeriesData::Surface(tangent),
            SeriesStyle {
                opacity: 0.6,
                ..SeriesStyle::solid(palette.tangent, 1)
            },
            visibility,
        ),
        series(
            "point",
            SeriesKind::Point,
            SeriesData::Markers3 {
                points: vec![(plane.x0, plane.y0, plane.f0)],
            },
            SeriesStyle::solid(palette.point, 6),
            visibility,
        ),
        series(
            "gradient",
            SeriesKind::Gradient,
            SeriesData::Segments3 {
                segments: vec![(grad_from, grad_to)],
            },
            SeriesStyle::solid(palette.gradient, 4),
            visibility,
        ),
    ];

    let two_d = vec![
        series(
            "contour",
            SeriesKind::Contour,
            SeriesData::Contour {
                grid: surface,
                iso_lines,
            },
            SeriesStyle::mapped(palette.iso_lines, palette.heatmap_map, 1.0),
            visibility,
        ),
        series(
            "vector field",
            SeriesKind::VectorField,
            SeriesData::Segments2 {
                segments: result.arrows.iter().map(|a| (a.from, a.to)).collect(),
            },
            SeriesStyle::solid(palette.vectors, 1),
            visibility,
        ),
        series(
            "gradient",
            SeriesKind::Gradient,
            SeriesData::Segments2 {
                segments: vec![((grad_from.0, grad_from.1), (grad_to.0, grad_to.1))],
            },
            SeriesStyle::solid(palette.gradient, 3),
            visibility,
        ),
        series(
            "point",
            SeriesKind::Point,
            SeriesData::Markers2 {
                points: vec![(plane.x0, plane.y0)],
            },
            SeriesStyle::solid(palette.point, 5),
            visibility,
        ),
    ];

    PlotSeriesSet { three_d, two_d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::grid::SamplingConfig;
    use crate::plot::sampler::sample;
    use crate::plot::types::PlotTarget;
    use crate::session::state::{EvaluationPoint, Toggle};
    use crate::symbolic::Expression;

    fn sampled(source: &str) -> SampleResult {
        let f = Expression::parse(source).unwrap();
        let point = EvaluationPoint::new(1.0, 2.0).unwrap();
        sample(&f, &f.derivative("x"), &f.derivative("y"), point, &SamplingConfig::default()).unwrap()
    }

    #[test]
    fn test_series_names_and_order() {
        let set = assemble(&sampled("x^2 + y^2"), &VisibilityState::default(), Theme::Dark);
        let names = |t| set.series(t).iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names(PlotTarget::ThreeD), ["surface", "tangent plane", "point", "gradient"]);
        assert_eq!(names(PlotTarget::TwoD), ["contour", "vector field", "gradient", "point"]);
    }

    #[test]
    fn test_point_marker_position() {
        let set = assemble(&sampled("x^2 + y^2"), &VisibilityState::default(), Theme::Dark);
        let point = set.find(PlotTarget::ThreeD, SeriesKind::Point).unwrap();
        assert_eq!(
            point.data,
            SeriesData::Markers3 {
                points: vec![(1.0, 2.0, 5.0)]
            }
        );
    }

    #[test]
    fn test_contour_has_eight_levels() {
        let set = assemble(&sampled("x^2 + y^2"), &VisibilityState::default(), Theme::Light);
        match &set.find(PlotTarget::TwoD, SeriesKind::Contour).unwrap().data {
            SeriesData::Contour { iso_lines, .. } => {
                assert_eq!(iso_lines.len(), 8);
                assert!(iso_lines.iter().all(|l| !l.segments.is_empty()));
            }
            other => panic!("unexpected data {:?}", other),
        }
    }

    #[test]
    fn test_visibility_is_passthrough() {
        let result = sampled("sin(x)*cos(y)");
        let mut hidden = VisibilityState::default();
        hidden.flip(Toggle::Gradient);
        let shown = assemble(&result, &VisibilityState::default(), Theme::Dark);
        let tagged = assemble(&result, &hidden, Theme::Dark);
        assert_eq!(shown.with_visibility(&hidden), tagged);
        assert!(!tagged.find(PlotTarget::TwoD, SeriesKind::Gradient).unwrap().visible);
        assert!(tagged.find(PlotTarget::TwoD, SeriesKind::Point).unwrap().visible);
    }

    #[test]
    fn test_theme_changes_only_styles() {
        let result = sampled("x*y");
        let dark = assemble(&result, &VisibilityState::default(), Theme::Dark);
        let light = assemble(&result, &VisibilityState::default(), Theme::Light);
        for (a, b) in dark.three_d.iter().zip(&light.three_d) {
            assert_eq!(a.data, b.data);
        }
        assert_ne!(dark.three_d[0].style, light.three_d[0].style);
    }
}
