use std::path::PathBuf;

use log::{debug, info, warn};

use crate::lang::error::LangError;
use crate::persistence::config::Config;
use crate::plot::assemble::assemble;
use crate::plot::cache::{PlotCache, PlotKey};
use crate::plot::grid::SamplingConfig;
use crate::plot::palette::Theme;
use crate::plot::render::{ExportOptions, RenderError, Renderer};
use crate::plot::sampler::{sample, DerivativeResult};
use crate::plot::types::{Camera, PlotLayout, PlotSeriesSet, PlotTarget, RenderedPlot};
use crate::session::derived::{DerivedValues, MAX_PRECISION};
use crate::session::error::VizError;
use crate::session::presets;
use crate::session::state::{
    EvaluationPoint, PlotRequest, Session, Toggle, VisibilityState, DEFAULT_EXPRESSION,
};
use crate::symbolic::Expression;

/// A fully computed plot, ready to be committed.
#[derive(Debug, Clone)]
pub struct ComputedPlot {
    pub seq: u64,
    pub expression: Expression,
    pub point: EvaluationPoint,
    pub series: PlotSeriesSet,
    pub visibility: VisibilityState,
    pub theme: Theme,
    pub camera: Camera,
    pub derived: DerivedValues,
    /// The 3D view followed by the 2D view.
    pub images: Vec<RenderedPlot>,
}

impl ComputedPlot {
    pub fn image(&self, target: PlotTarget) -> Option<&RenderedPlot> {
        self.images.iter().find(|img| img.target == target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotOutcome {
    /// The result became the visible plot.
    Committed,
    /// A newer request was issued meanwhile; the result was dropped.
    Stale,
}

/// Orchestrates validation, sampling, caching and rendering for one session.
pub struct Controller<R> {
    renderer: R,
    cache: PlotCache,
    session: Session,
    sampling: SamplingConfig,
    layout: PlotLayout,
    precision: usize,
    last_seq: u64,
}

impl<R: Renderer> Controller<R> {
    pub fn new(renderer: R, config: &Config) -> Self {
        Self {
            renderer,
            cache: PlotCache::new(config.cache_capacity),
            session: Session::new(config.theme),
            sampling: SamplingConfig::default(),
            layout: PlotLayout::new(config.theme),
            precision: config.precision.min(MAX_PRECISION),
            last_seq: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn layout(&self) -> &PlotLayout {
        &self.layout
    }

    pub fn cache(&self) -> &PlotCache {
        &self.cache
    }

    /// Capture the inputs of a new request and make it the latest one.
    pub fn snapshot(&mut self, text: &str, point: EvaluationPoint) -> PlotRequest {
        self.last_seq += 1;
        PlotRequest {
            seq: self.last_seq,
            text: text.to_string(),
            point,
            visibility: self.session.visibility,
            theme: self.session.theme,
            camera: self.layout.camera,
        }
    }

    /// Run a request to completion without touching what is on screen.
    /// The only side effect is inserting freshly sampled series into the cache.
    pub fn compute(&mut self, req: &PlotRequest) -> Result<ComputedPlot, VizError> {
        if req.text.trim().is_empty() {
            return Err(VizError::Validation(LangError::parse("expression is empty")));
        }
        let expression = Expression::parse(&req.text).map_err(VizError::Validation)?;
        let fx = expression.derivative("x");
        let fy = expression.derivative("y");
        let derivatives = DerivativeResult::at(&expression, &fx, &fy, req.point)?;

        let key = PlotKey::new(&req.text, req.point, req.theme);
        let series = match self.cache.get(&key) {
            Some(set) => set.with_visibility(&req.visibility),
            None => {
                let result = sample(&expression, &fx, &fy, req.point, &self.sampling)?;
                let set = assemble(&result, &req.visibility, req.theme);
                self.cache.put(key, set.clone());
                set
            }
        };

        let layout = PlotLayout {
            theme: req.theme,
            camera: req.camera,
            ..self.layout
        };
        let images = render_views(&self.renderer, &series, &layout)?;

        Ok(ComputedPlot {
            seq: req.seq,
            derived: DerivedValues::new(&derivatives, req.point, self.precision),
            expression,
            point: req.point,
            series,
            visibility: req.visibility,
            theme: req.theme,
            camera: req.camera,
            images,
        })
    }

    /// Commit `result` if it answers the latest request.
    pub fn apply(
        &mut self,
        seq: u64,
        result: Result<ComputedPlot, VizError>,
    ) -> Result<PlotOutcome, VizError> {
        if seq != self.last_seq {
            debug!("dropping result of request {} (latest is {})", seq, self.last_seq);
            return Ok(PlotOutcome::Stale);
        }
        match result {
            Ok(plot) => {
                info!("plotted '{}' at {}", plot.expression.source(), plot.point);
                self.session.expression = plot.expression.clone();
                self.session.point = plot.point;
                self.session.visibility = plot.visibility;
                self.session.theme = plot.theme;
                self.layout.theme = plot.theme;
                self.layout.camera = plot.camera;
                self.session.view = Some(plot);
                Ok(PlotOutcome::Committed)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    pub fn submit(&mut self, text: &str, point: EvaluationPoint) -> Result<PlotOutcome, VizError> {
        let req = self.snapshot(text, point);
        self.run(req)
    }

    fn run(&mut self, req: PlotRequest) -> Result<PlotOutcome, VizError> {
        let result = self.compute(&req);
        self.apply(req.seq, result)
    }

    /// Request for the committed expression and point. Callers adjust the
    /// settings on the request; the session only changes if it commits.
    fn snapshot_committed(&mut self) -> PlotRequest {
        let text = self.session.expression.source().to_string();
        self.snapshot(&text, self.session.point)
    }

    /// Plot the committed expression again with the current settings.
    pub fn replot(&mut self) -> Result<PlotOutcome, VizError> {
        let req = self.snapshot_committed();
        self.run(req)
    }

    pub fn set_point(&mut self, x: f64, y: f64) -> Result<PlotOutcome, VizError> {
        let point = EvaluationPoint::new(x, y)
            .ok_or_else(|| VizError::Validation(LangError::domain("the point must be finite")))?;
        let text = self.session.expression.source().to_string();
        self.submit(&text, point)
    }

    pub fn toggle(&mut self, toggle: Toggle) -> Result<PlotOutcome, VizError> {
        let mut req = self.snapshot_committed();
        let shown = req.visibility.flip(toggle);
        debug!("{} {}", toggle.label(), if shown { "shown" } else { "hidden" });
        self.run(req)
    }

    pub fn toggle_theme(&mut self) -> Result<PlotOutcome, VizError> {
        let mut req = self.snapshot_committed();
        req.theme = req.theme.toggled();
        self.run(req)
    }

    pub fn theme(&self) -> Theme {
        self.session.theme
    }

    pub fn rotate_camera(&mut self, delta: f64) -> Result<PlotOutcome, VizError> {
        let mut req = self.snapshot_committed();
        req.camera = req.camera.rotated(delta);
        self.run(req)
    }

    /// Back to `x^2 + y^2` at (1, 1) with everything visible.
    pub fn reset(&mut self) -> Result<PlotOutcome, VizError> {
        let mut req = self.snapshot(DEFAULT_EXPRESSION, EvaluationPoint::default());
        req.visibility = VisibilityState::default();
        self.run(req)
    }

    pub fn select_preset(&mut self, label: &str) -> Result<PlotOutcome, VizError> {
        let preset = presets::find(label).ok_or_else(|| {
            VizError::Validation(LangError::name(format!("unknown preset '{}'", label)))
        })?;
        self.submit(preset.expression, self.session.point)
    }

    /// Re-render the committed view at the export size and write it out.
    pub fn export(&self, target: PlotTarget, options: &ExportOptions) -> Result<PathBuf, VizError> {
        let view = self.session.view.as_ref().ok_or(RenderError::NothingToExport)?;
        let layout = self.layout.with_size(options.width, options.height);
        let image = self.renderer.draw(target, view.series.series(target), &layout)?;
        let bytes = image.encode(options.format)?;

        let path = options.path();
        std::fs::write(&path, bytes).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        info!("exported {} view to {}", target.label(), path.display());
        Ok(path)
    }

    /// Write the committed series set as JSON.
    pub fn export_series(&self, path: PathBuf) -> Result<PathBuf, VizError> {
        let view = self.session.view.as_ref().ok_or(RenderError::NothingToExport)?;
        let json = view
            .series
            .to_json()
            .map_err(|e| VizError::Unhandled(format!("series serialization failed: {}", e)))?;
        std::fs::write(&path, json).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Draw both views on scoped threads and wait for both.
fn render_views<R: Renderer>(
    renderer: &R,
    series: &PlotSeriesSet,
    layout: &PlotLayout,
) -> Result<Vec<RenderedPlot>, RenderError> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = PlotTarget::ALL
            .iter()
            .map(|&target| {
                let handle = scope.spawn(move || renderer.draw(target, series.series(target), layout));
                (target, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(target, handle)| {
                handle
                    .join()
                    .map_err(|_| RenderError::Panicked(target.label()))
                    .and_then(|drawn| drawn)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::render::RenderError;
    use crate::plot::types::SeriesKind;
    use crate::session::state::DEFAULT_EXPRESSION;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_log::test;

    /// Counts draw calls and returns a 1x1 image. Draws fail once
    /// `fail_after` calls have been made.
    #[derive(Default)]
    struct CountingRenderer {
        draws: AtomicUsize,
        fail_after: Option<usize>,
    }

    impl Renderer for CountingRenderer {
        fn draw(
            &self,
            target: PlotTarget,
            _series: &[crate::plot::types::PlotSeries],
            _layout: &PlotLayout,
        ) -> Result<RenderedPlot, RenderError> {
            let done = self.draws.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|n| done >= n) {
                return Err(RenderError::EmptyCanvas { width: 0, height: 0 });
            }
            Ok(RenderedPlot {
                target,
                rgb: vec![0, 0, 0],
                width: 1,
                height: 1,
            })
        }
    }

    fn controller() -> Controller<CountingRenderer> {
        Controller::new(CountingRenderer::default(), &Config::default())
    }

    fn pt(x: f64, y: f64) -> EvaluationPoint {
        EvaluationPoint::new(x, y).unwrap()
    }

    #[test]
    fn test_submit_commits_expression_and_point() {
        let mut c = controller();
        assert_eq!(c.submit("x*y", pt(0.5, 0.5)).unwrap(), PlotOutcome::Committed);
        assert_eq!(c.session().expression.source(), "x*y");
        assert_eq!(c.session().point, pt(0.5, 0.5));
        let view = c.session().view.as_ref().unwrap();
        assert_eq!(view.images.len(), 2);
        assert!(view.image(PlotTarget::TwoD).is_some());
    }

    #[test]
    fn test_unclamped_config_precision_is_capped() {
        let config = Config {
            precision: usize::MAX,
            ..Config::default()
        };
        let mut c = Controller::new(CountingRenderer::default(), &config);
        c.submit("x^2 + y^2", pt(1.0, 2.0)).unwrap();
        let view = c.session().view.as_ref().unwrap();
        assert_eq!(view.derived.f0, "5.000000000000");
    }

    #[test]
    fn test_validation_error_changes_nothing() {
        let mut c = controller();
        c.submit("x^2 + y^2", pt(1.0, 2.0)).unwrap();
        let err = c.submit("x +", pt(3.0, 3.0)).unwrap_err();
        assert!(matches!(err, VizError::Validation(_)));
        assert_eq!(c.session().expression.source(), "x^2 + y^2");
        assert_eq!(c.session().point, pt(1.0, 2.0));
    }

    #[test]
    fn test_empty_text_is_validation_error() {
        let mut c = controller();
        assert!(matches!(c.submit("   ", pt(0.0, 0.0)), Err(VizError::Validation(_))));
        assert_eq!(c.renderer.draws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut c = controller();
        let first = c.snapshot("x", pt(0.0, 0.0));
        let second = c.snapshot("y", pt(0.0, 0.0));
        let late = c.compute(&first);
        let fresh = c.compute(&second);
        assert_eq!(c.apply(first.seq, late).unwrap(), PlotOutcome::Stale);
        assert!(c.session().view.is_none());
        assert_eq!(c.apply(second.seq, fresh).unwrap(), PlotOutcome::Committed);
        assert_eq!(c.session().expression.source(), "y");
    }

    #[test]
    fn test_stale_error_is_discarded_too() {
        let mut c = controller();
        let first = c.snapshot("x +", pt(0.0, 0.0));
        let _second = c.snapshot("x", pt(0.0, 0.0));
        let result = c.compute(&first);
        assert_eq!(c.apply(first.seq, result).unwrap(), PlotOutcome::Stale);
    }

    #[test]
    fn test_cache_hit_skips_sampling() {
        let mut c = controller();
        c.submit("x*y", pt(1.0, 1.0)).unwrap();
        c.submit("x*y", pt(1.0, 1.0)).unwrap();
        assert_eq!(c.cache().len(), 1);
        c.submit("x*y", pt(1.0, 0.5)).unwrap();
        assert_eq!(c.cache().len(), 2);
    }

    #[test]
    fn test_toggle_only_changes_one_series() {
        let mut c = controller();
        c.submit("x^2 - y^2", pt(1.0, 1.0)).unwrap();
        let before = c.session().view.as_ref().unwrap().series.clone();
        c.toggle(Toggle::Vectors).unwrap();
        let after = &c.session().view.as_ref().unwrap().series;
        assert!(!c.session().visibility.vectors);
        for (a, b) in before.two_d.iter().zip(&after.two_d) {
            assert_eq!(a.data, b.data);
            assert_eq!(a.visible != b.visible, a.kind == SeriesKind::VectorField);
        }
        assert_eq!(before.three_d, after.three_d);
    }

    #[test]
    fn test_render_error_keeps_cache_but_not_state() {
        let mut c = Controller::new(
            CountingRenderer {
                fail_after: Some(0),
                ..Default::default()
            },
            &Config::default(),
        );
        let err = c.submit("x*y", pt(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, VizError::Render(_)));
        assert_eq!(c.session().expression.source(), DEFAULT_EXPRESSION);
        assert_eq!(c.cache().len(), 1);
    }

    #[test]
    fn test_evaluation_error_at_point() {
        let mut c = controller();
        let err = c.submit("ln(x)", pt(-1.0, 0.0)).unwrap_err();
        match err {
            VizError::Evaluation(e) => assert_eq!((e.x, e.y), (-1.0, 0.0)),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.cache().len(), 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut c = controller();
        c.submit("sin(x)", pt(-2.0, 3.0)).unwrap();
        c.toggle(Toggle::Surface).unwrap();
        c.reset().unwrap();
        let s = c.session();
        assert_eq!(s.expression.source(), DEFAULT_EXPRESSION);
        assert_eq!(s.point, pt(1.0, 1.0));
        assert_eq!(s.visibility, VisibilityState::default());
    }

    /// Commits `sin(x)` at (-2, 3); every later draw fails.
    fn failing_after_first_plot() -> Controller<CountingRenderer> {
        let mut c = Controller::new(
            CountingRenderer {
                fail_after: Some(2),
                ..Default::default()
            },
            &Config::default(),
        );
        c.submit("sin(x)", pt(-2.0, 3.0)).unwrap();
        c
    }

    fn assert_matches_view(c: &Controller<CountingRenderer>) {
        let s = c.session();
        let view = s.view.as_ref().unwrap();
        assert_eq!(s.expression.source(), view.expression.source());
        assert_eq!(s.point, view.point);
        assert_eq!(s.visibility, view.visibility);
        assert_eq!(s.theme, view.theme);
        assert_eq!(c.layout().camera, view.camera);
    }

    #[test]
    fn test_failed_reset_keeps_session() {
        let mut c = failing_after_first_plot();
        assert!(matches!(c.reset(), Err(VizError::Render(_))));
        assert_eq!(c.session().expression.source(), "sin(x)");
        assert_eq!(c.session().point, pt(-2.0, 3.0));
        assert_matches_view(&c);
    }

    #[test]
    fn test_failed_toggle_keeps_visibility() {
        let mut c = failing_after_first_plot();
        assert!(c.toggle(Toggle::Surface).is_err());
        assert!(c.session().visibility.surface);
        let view = c.session().view.as_ref().unwrap();
        assert!(view.series.find(PlotTarget::ThreeD, SeriesKind::Surface).unwrap().visible);
        assert_matches_view(&c);
    }

    #[test]
    fn test_failed_theme_switch_and_rotation_keep_settings() {
        let mut c = failing_after_first_plot();
        let camera = c.layout().camera;
        assert!(c.toggle_theme().is_err());
        assert_eq!(c.theme(), Theme::Dark);
        assert_eq!(c.layout().theme, Theme::Dark);
        assert!(c.rotate_camera(0.2).is_err());
        assert_eq!(c.layout().camera, camera);
        assert_matches_view(&c);
    }

    #[test]
    fn test_rotation_commits_camera() {
        let mut c = controller();
        c.submit("x*y", pt(0.0, 0.0)).unwrap();
        let before = c.layout().camera;
        c.rotate_camera(0.2).unwrap();
        assert_eq!(c.layout().camera, before.rotated(0.2));
        assert_matches_view(&c);
    }

    #[test]
    fn test_theme_toggle_resamples() {
        let mut c = controller();
        c.submit("x*y", pt(0.0, 0.0)).unwrap();
        c.toggle_theme().unwrap();
        assert_eq!(c.theme(), Theme::Light);
        assert_eq!(c.cache().len(), 2);
    }

    #[test]
    fn test_select_preset() {
        let mut c = controller();
        c.select_preset("Saddle").unwrap();
        assert_eq!(c.session().expression.source(), "x^2 - y^2");
        assert!(matches!(c.select_preset("Torus"), Err(VizError::Validation(_))));
    }

    #[test]
    fn test_set_point_rejects_non_finite() {
        let mut c = controller();
        assert!(c.set_point(f64::NAN, 0.0).is_err());
        assert_eq!(c.set_point(2.0, -1.0).unwrap(), PlotOutcome::Committed);
        assert_eq!(c.session().point, pt(2.0, -1.0));
    }

    #[test]
    fn test_export_before_plot_fails() {
        let c = controller();
        let opts = ExportOptions {
            format: crate::plot::render::ExportFormat::Png,
            width: 10,
            height: 10,
            filename: PathBuf::from("unused"),
        };
        assert!(matches!(
            c.export(PlotTarget::ThreeD, &opts),
            Err(VizError::Render(RenderError::NothingToExport))
        ));
    }
}
