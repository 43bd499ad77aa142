use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error, info, warn};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use ratatui_image::StatefulImage;

use crate::persistence::config::{save_config_to, Config};
use crate::plot::render::{ExportFormat, ExportOptions, PlottersRenderer};
use crate::plot::types::PlotTarget;
use crate::session::presets::PRESETS;
use crate::session::state::{DEFAULT_EXPRESSION, DEFAULT_POINT};
use crate::session::{Controller, Debouncer, EvaluationPoint, PlotOutcome, Toggle, VizError};
use crate::tui::event::{is_ctrl, is_quit, AppEvent};
use crate::tui::help::{HelpPanel, HelpTab};
use crate::tui::input::InputState;
use crate::tui::slider::Slider;
use crate::tui::status::{render_status_bar, Notice, NoticeLevel};
use crate::tui::theme::UiTheme;

/// Camera rotation per `[`/`]` press, in radians.
const ROTATE_STEP: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Expression,
    SliderX,
    SliderY,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Expression => Focus::SliderX,
            Focus::SliderX => Focus::SliderY,
            Focus::SliderY => Focus::Expression,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Expression => Focus::SliderY,
            Focus::SliderX => Focus::Expression,
            Focus::SliderY => Focus::SliderX,
        }
    }
}

/// Inputs waiting out the debounce window.
#[derive(Debug, Clone, PartialEq)]
struct PlotInputs {
    text: String,
    x: f64,
    y: f64,
}

struct PresetPicker {
    visible: bool,
    selected: usize,
}

pub struct App {
    pub controller: Controller<PlottersRenderer>,
    pub input: InputState,
    pub focus: Focus,
    pub x0: Slider,
    pub y0: Slider,
    pub help: HelpPanel,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    pub config: Config,
    /// Where theme changes are saved; `None` keeps them in memory.
    config_path: Option<PathBuf>,
    debouncer: Debouncer<PlotInputs>,
    presets: PresetPicker,
    picker: Option<Picker>,
    /// Terminal image state for the 3D and 2D panes.
    images: [Option<StatefulProtocol>; 2],
    image_seq: Option<u64>,
}

impl App {
    pub fn new(config: Config, config_path: Option<PathBuf>, picker: Option<Picker>) -> Self {
        let controller = Controller::new(PlottersRenderer, &config);
        let mut app = Self {
            controller,
            input: InputState::new(DEFAULT_EXPRESSION),
            focus: Focus::Expression,
            x0: Slider::new("x0", DEFAULT_POINT.0),
            y0: Slider::new("y0", DEFAULT_POINT.1),
            help: HelpPanel::new(),
            notice: None,
            should_quit: false,
            debouncer: Debouncer::new(config.debounce()),
            config,
            config_path,
            presets: PresetPicker {
                visible: false,
                selected: 0,
            },
            picker,
            images: [None, None],
            image_seq: None,
        };
        let now = Instant::now();
        let result = app.controller.replot();
        app.report(result, now);
        app
    }

    /// Handle one event. A panic anywhere below is logged and shown as a
    /// notice instead of tearing down the terminal.
    pub fn dispatch(&mut self, event: AppEvent, now: Instant) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.handle_event(event, now)));
        if let Err(payload) = result {
            let err = VizError::from_panic(payload.as_ref());
            error!("{}", err);
            self.notice = Some(Notice::error(
                format!("{}: {}", err.category(), err.detail()),
                now,
            ));
        }
    }

    fn handle_event(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::Key(key) => self.handle_key(key, now),
            AppEvent::Tick => self.tick(now),
            AppEvent::Resize(_, _) => {}
        }
    }

    fn tick(&mut self, now: Instant) {
        if let Some(inputs) = self.debouncer.poll(now) {
            debug!("quiet period over, plotting '{}'", inputs.text);
            self.plot(inputs, now);
        }
        if self.notice.as_ref().is_some_and(|n| n.expired(now)) {
            self.notice = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if is_quit(&key) {
            self.should_quit = true;
            return;
        }
        if self.help.visible {
            self.handle_key_help(key);
            return;
        }
        if self.presets.visible {
            self.handle_key_presets(key, now);
            return;
        }

        match key.code {
            KeyCode::F(1) => self.help.toggle(),
            KeyCode::Esc => self.notice = None,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::F(2) => self.toggle(Toggle::Surface, now),
            KeyCode::F(3) => self.toggle(Toggle::TangentPlane, now),
            KeyCode::F(4) => self.toggle(Toggle::Gradient, now),
            KeyCode::F(5) => self.toggle(Toggle::Contour, now),
            KeyCode::F(6) => self.toggle(Toggle::Vectors, now),
            KeyCode::F(7) => self.toggle_theme(now),
            KeyCode::F(8) => self.export(now),
            KeyCode::F(9) => self.reset(now),
            KeyCode::F(10) => self.presets.visible = true,
            _ if is_ctrl(&key, 't') => self.toggle_theme(now),
            _ if is_ctrl(&key, 's') => self.export(now),
            _ if is_ctrl(&key, 'r') => self.reset(now),
            _ if is_ctrl(&key, 'p') => self.presets.visible = true,
            _ => match self.focus {
                Focus::Expression => self.handle_key_expression(key, now),
                Focus::SliderX | Focus::SliderY => self.handle_key_slider(key, now),
            },
        }
    }

    fn handle_key_help(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::F(1) => self.help.toggle(),
            KeyCode::Tab | KeyCode::Right => self.help.next_tab(),
            KeyCode::BackTab | KeyCode::Left => self.help.prev_tab(),
            KeyCode::Up => self.help.scroll_up(1),
            KeyCode::Down => self.help.scroll_down(1),
            KeyCode::PageUp => self.help.scroll_up(10),
            KeyCode::PageDown => self.help.scroll_down(10),
            _ => {}
        }
    }

    fn handle_key_presets(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => self.presets.visible = false,
            KeyCode::Up => self.presets.selected = self.presets.selected.saturating_sub(1),
            KeyCode::Down => {
                self.presets.selected = (self.presets.selected + 1).min(PRESETS.len() - 1);
            }
            KeyCode::Enter => {
                self.presets.visible = false;
                let label = PRESETS[self.presets.selected].label;
                self.debouncer.cancel();
                let result = self.controller.select_preset(label);
                if self.report(result, now) {
                    self.sync_from_session();
                }
            }
            _ => {}
        }
    }

    fn handle_key_expression(&mut self, key: KeyEvent, now: Instant) {
        let edited = match key.code {
            _ if is_ctrl(&key, 'u') => {
                self.input.kill_line();
                true
            }
            _ if is_ctrl(&key, 'w') => {
                self.input.kill_word_back();
                true
            }
            _ if is_ctrl(&key, 'a') => {
                self.input.move_home();
                false
            }
            _ if is_ctrl(&key, 'e') => {
                self.input.move_end();
                false
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert(c);
                true
            }
            KeyCode::Backspace => {
                self.input.backspace();
                true
            }
            KeyCode::Delete => {
                self.input.delete();
                true
            }
            KeyCode::Left => {
                self.input.move_left();
                false
            }
            KeyCode::Right => {
                self.input.move_right();
                false
            }
            KeyCode::Home => {
                self.input.move_home();
                false
            }
            KeyCode::End => {
                self.input.move_end();
                false
            }
            KeyCode::Up => self.input.history_up(),
            KeyCode::Down => self.input.history_down(),
            KeyCode::Enter => {
                let inputs = self
                    .debouncer
                    .flush()
                    .unwrap_or_else(|| self.current_inputs());
                self.plot(inputs, now);
                false
            }
            _ => false,
        };
        if edited {
            self.debouncer.schedule(now, self.current_inputs());
        }
    }

    fn handle_key_slider(&mut self, key: KeyEvent, now: Instant) {
        let slider = match self.focus {
            Focus::SliderY => &mut self.y0,
            _ => &mut self.x0,
        };
        let moved = match key.code {
            KeyCode::Left | KeyCode::Down => slider.step(-1),
            KeyCode::Right | KeyCode::Up => slider.step(1),
            KeyCode::PageDown => slider.step(-10),
            KeyCode::PageUp => slider.step(10),
            KeyCode::Home => slider.to_min(),
            KeyCode::End => slider.to_max(),
            KeyCode::Char('[') => {
                let result = self.controller.rotate_camera(-ROTATE_STEP);
                self.report(result, now);
                false
            }
            KeyCode::Char(']') => {
                let result = self.controller.rotate_camera(ROTATE_STEP);
                self.report(result, now);
                false
            }
            _ => false,
        };
        if moved {
            self.debouncer.schedule(now, self.current_inputs());
        }
    }

    fn current_inputs(&self) -> PlotInputs {
        PlotInputs {
            text: self.input.text.clone(),
            x: self.x0.value(),
            y: self.y0.value(),
        }
    }

    fn plot(&mut self, inputs: PlotInputs, now: Instant) {
        let Some(point) = EvaluationPoint::new(inputs.x, inputs.y) else {
            return;
        };
        let result = self.controller.submit(&inputs.text, point);
        if self.report(result, now) {
            self.input.record(&inputs.text);
        }
    }

    fn toggle(&mut self, toggle: Toggle, now: Instant) {
        let result = self.controller.toggle(toggle);
        self.report(result, now);
    }

    fn toggle_theme(&mut self, now: Instant) {
        let result = self.controller.toggle_theme();
        self.report(result, now);
        self.config.theme = self.controller.theme();
        if let Some(path) = &self.config_path {
            if let Err(e) = save_config_to(path, &self.config) {
                warn!("{}", e);
            }
        }
    }

    fn reset(&mut self, now: Instant) {
        self.debouncer.cancel();
        let result = self.controller.reset();
        self.sync_from_session();
        if self.report(result, now) {
            self.notice = Some(Notice::info("reset to defaults", now));
        }
    }

    /// Point the input and sliders at what the session holds.
    fn sync_from_session(&mut self) {
        let session = self.controller.session();
        self.input.set_text(session.expression.source());
        self.x0.set_value(session.point.x());
        self.y0.set_value(session.point.y());
    }

    fn export(&mut self, now: Instant) {
        let dir = self.config.export_dir();
        let stem = format!("gradscope-{}", epoch_secs());
        let mut written = 0;
        for target in PlotTarget::ALL {
            let options = ExportOptions {
                format: ExportFormat::Png,
                width: self.config.export_width,
                height: self.config.export_height,
                filename: dir.join(format!("{}-{}", stem, target.label())),
            };
            match self.controller.export(target, &options) {
                Ok(_) => written += 1,
                Err(e) => {
                    self.report::<()>(Err(e), now);
                    return;
                }
            }
        }
        match self.controller.export_series(dir.join(format!("{}.json", stem))) {
            Ok(_) => written += 1,
            Err(e) => {
                self.report::<()>(Err(e), now);
                return;
            }
        }
        info!("exported {} files as {}", written, stem);
        self.notice = Some(Notice::info(
            format!("exported {} files to {}", written, dir.display()),
            now,
        ));
    }

    /// Surface a controller result. Returns whether a plot was committed.
    fn report<T: Into<ReportOutcome>>(&mut self, result: Result<T, VizError>, now: Instant) -> bool {
        match result.map(Into::into) {
            Ok(ReportOutcome::Committed) => {
                if self.notice.as_ref().is_some_and(|n| n.level == NoticeLevel::Error) {
                    self.notice = None;
                }
                true
            }
            Ok(ReportOutcome::Other) => false,
            Err(e) => {
                if let VizError::Unhandled(_) = e {
                    error!("{}", e);
                }
                self.notice = Some(Notice::error(
                    format!("{}: {}", e.category(), e.detail()),
                    now,
                ));
                false
            }
        }
    }

    // --- Rendering ---

    /// Rebuild terminal image state when a new plot has been committed.
    fn refresh_images(&mut self) {
        let Some(view) = &self.controller.session().view else {
            self.images = [None, None];
            self.image_seq = None;
            return;
        };
        if self.image_seq == Some(view.seq) {
            return;
        }
        self.image_seq = Some(view.seq);
        self.images = PlotTarget::ALL.map(|target| {
            let picker = self.picker.as_ref()?;
            let image = view.image(target)?.to_image()?;
            Some(picker.new_resize_protocol(image))
        });
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.refresh_images();
        let ui = UiTheme::new(self.controller.theme());
        let area = frame.area();
        frame.render_widget(Block::default().style(ui.base()), area);

        let outer = Layout::vertical([
            Constraint::Length(3),                       // Expression
            Constraint::Length(3),                       // Sliders + toggles
            Constraint::Length(self.config.plot_height), // Plots
            Constraint::Min(9),                          // Derived values
            Constraint::Length(1),                       // Status bar
        ])
        .split(area);

        self.render_input(frame, outer[0], &ui);
        self.render_controls(frame, outer[1], &ui);
        self.render_plots(frame, outer[2], &ui);
        self.render_derived(frame, outer[3], &ui);
        render_status_bar(frame, outer[4], &ui, &self.summary(), self.notice.as_ref());

        if self.presets.visible {
            self.render_presets(frame, area, &ui);
        }
        if self.help.visible {
            self.render_help(frame, area, &ui);
        }
    }

    fn summary(&self) -> String {
        let session = self.controller.session();
        let pending = if self.debouncer.is_pending() { " *" } else { "" };
        format!(
            "f = {} at {} | {}{}",
            session.expression,
            session.point,
            session.theme,
            pending
        )
    }

    fn border_style(&self, ui: &UiTheme, focus: Focus) -> Style {
        if self.focus == focus {
            ui.border_focused()
        } else {
            ui.border()
        }
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, ui: &UiTheme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.border_style(ui, Focus::Expression))
            .title(Span::styled(" Expression ", ui.title()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let prompt = "f(x, y) = ";
        let line = Line::from(vec![
            Span::styled(prompt, ui.input_prompt()),
            Span::styled(self.input.text.as_str(), ui.value()),
        ]);
        frame.render_widget(Paragraph::new(line), inner);

        if self.focus == Focus::Expression && !self.help.visible && !self.presets.visible {
            let before = self.input.text[..self.input.cursor].chars().count();
            let cursor_x = inner.x + (prompt.len() + before) as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect, ui: &UiTheme) {
        let row = Layout::horizontal([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
        ])
        .split(area);

        for (slider, focus, rect) in [(&self.x0, Focus::SliderX, row[0]), (&self.y0, Focus::SliderY, row[1])] {
            let gauge = Gauge::default()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(self.border_style(ui, focus))
                        .title(Span::styled(format!(" {} ", slider.label), ui.title())),
                )
                .gauge_style(ui.label())
                .ratio(slider.ratio())
                .label(format!("{:.1}", slider.value()));
            frame.render_widget(gauge, rect);
        }

        let visibility = self.controller.session().visibility;
        let mut spans = Vec::new();
        for (i, toggle) in Toggle::ALL.iter().enumerate() {
            let mark = if visibility.get(*toggle) { "x" } else { " " };
            spans.push(Span::styled(format!("[{}] ", mark), ui.value()));
            spans.push(Span::styled(format!("{} ", toggle.label()), ui.label()));
            spans.push(Span::styled(format!("F{}  ", i + 2), ui.hint()));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(ui.border())
            .title(Span::styled(" Show ", ui.title()));
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), row[2]);
    }

    fn render_plots(&mut self, frame: &mut Frame, area: Rect, ui: &UiTheme) {
        let panes = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
        let has_view = self.controller.session().view.is_some();
        for (i, target) in PlotTarget::ALL.into_iter().enumerate() {
            let title = match target {
                PlotTarget::ThreeD => " Surface (3D) ",
                PlotTarget::TwoD => " Contours (2D) ",
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(ui.border())
                .title(Span::styled(title, ui.title()));
            let inner = block.inner(panes[i]);
            frame.render_widget(block, panes[i]);

            match self.images[i].as_mut() {
                Some(protocol) => {
                    frame.render_stateful_widget(StatefulImage::default(), inner, protocol);
                }
                None => {
                    let text = if !has_view {
                        "no plot yet"
                    } else if self.picker.is_none() {
                        "image display requires Kitty, iTerm2 or Sixel graphics; F8 exports PNG"
                    } else {
                        "plot image unavailable"
                    };
                    frame.render_widget(Paragraph::new(Span::styled(text, ui.hint())), inner);
                }
            }
        }
    }

    fn render_derived(&self, frame: &mut Frame, area: Rect, ui: &UiTheme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(ui.border())
            .title(Span::styled(" Derivatives ", ui.title()));

        let lines: Vec<Line> = match &self.controller.session().view {
            Some(view) => view
                .derived
                .rows()
                .iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{:<12}", label), ui.label()),
                        Span::styled(value.to_string(), ui.value()),
                    ])
                })
                .collect(),
            None => vec![Line::from(Span::styled("nothing plotted", ui.hint()))],
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_presets(&self, frame: &mut Frame, area: Rect, ui: &UiTheme) {
        let h = PRESETS.len() as u16 + 2;
        let w = 56.min(area.width);
        let popup_area = centered(area, w, h);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(ui.border_focused())
            .title(Span::styled(" Presets (Enter to plot, Esc to close) ", ui.title()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let items: Vec<ListItem> = PRESETS
            .iter()
            .enumerate()
            .map(|(i, preset)| {
                let style = if i == self.presets.selected {
                    ui.selected()
                } else {
                    ui.value()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<16}", preset.label), style),
                    Span::styled(preset.expression, ui.hint()),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items), inner);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect, ui: &UiTheme) {
        // 80% of screen, centered
        let w = (area.width * 4 / 5).max(40).min(area.width);
        let h = (area.height * 4 / 5).max(10).min(area.height);
        let popup_area = centered(area, w, h);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(ui.border_focused())
            .title(Span::styled(" Esc to close, Tab to switch, ↑/↓ to scroll ", ui.title()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut tabs = Vec::new();
        for tab in HelpTab::ALL {
            let style = if tab == self.help.tab { ui.selected() } else { ui.label() };
            tabs.push(Span::styled(format!(" {} ", tab.title()), style));
            tabs.push(Span::raw(" "));
        }

        let mut lines = vec![Line::from(tabs), Line::from("")];
        let visible = (inner.height as usize).saturating_sub(2);
        lines.extend(
            self.help
                .tab
                .content()
                .lines()
                .skip(self.help.scroll)
                .take(visible)
                .map(|text| Line::from(Span::styled(format!("  {}", text), ui.value()))),
        );
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// What a controller call amounted to, for notice handling.
enum ReportOutcome {
    Committed,
    Other,
}

impl From<PlotOutcome> for ReportOutcome {
    fn from(outcome: PlotOutcome) -> Self {
        match outcome {
            PlotOutcome::Committed => ReportOutcome::Committed,
            PlotOutcome::Stale => ReportOutcome::Other,
        }
    }
}

impl From<()> for ReportOutcome {
    fn from(_: ()) -> Self {
        ReportOutcome::Other
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
