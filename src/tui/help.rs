/// About/Help/Shortcuts modal with scrollable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTab {
    About,
    Help,
    Shortcuts,
}

impl HelpTab {
    pub const ALL: [HelpTab; 3] = [HelpTab::About, HelpTab::Help, HelpTab::Shortcuts];

    pub fn title(self) -> &'static str {
        match self {
            HelpTab::About => "About",
            HelpTab::Help => "Help",
            HelpTab::Shortcuts => "Shortcuts",
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            HelpTab::About => ABOUT,
            HelpTab::Help => HELP,
            HelpTab::Shortcuts => SHORTCUTS,
        }
    }
}

pub struct HelpPanel {
    pub visible: bool,
    pub tab: HelpTab,
    pub scroll: usize,
}

impl HelpPanel {
    pub fn new() -> Self {
        Self {
            visible: false,
            tab: HelpTab::About,
            scroll: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.scroll = 0;
        }
    }

    pub fn next_tab(&mut self) {
        let i = HelpTab::ALL.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = HelpTab::ALL[(i + 1) % HelpTab::ALL.len()];
        self.scroll = 0;
    }

    pub fn prev_tab(&mut self) {
        let i = HelpTab::ALL.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = HelpTab::ALL[(i + HelpTab::ALL.len() - 1) % HelpTab::ALL.len()];
        self.scroll = 0;
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll = (self.scroll + n).min(self.total_lines().saturating_sub(1));
    }

    pub fn total_lines(&self) -> usize {
        self.tab.content().lines().count()
    }
}

impl Default for HelpPanel {
    fn default() -> Self {
        Self::new()
    }
}

static ABOUT: &str = "\
gradscope draws a function f(x, y) next to its calculus.

The 3D view shows the surface z = f(x, y), the tangent plane at
(x0, y0), the touching point and the gradient direction lifted
onto the plane. The 2D view shows a filled contour map with
iso-lines, the gradient vector field, the point and its gradient.

Below the plots: f(x0, y0), the partials fx and fy at the point,
the gradient magnitude |∇f|, the symbolic partials and the
tangent plane equation.";

static HELP: &str = "\
Type a formula in x and y. Replotting happens 300 ms after you
stop typing, or immediately on Enter.

  + - * / ^          arithmetic, ^ is right-associative
  2x, 3(x+1), x y     implicit multiplication
  |x - y|             absolute value
  pi  e  tau          constants

Functions:
  sin cos tan   asin acos atan   sinh cosh tanh
  exp ln sqrt abs   floor ceil round sign
  log(x) natural log, log(b, x) base b

The point (x0, y0) is set with the two sliders over [-5, 5].
The plotting domain is fixed to [-5, 5] x [-5, 5]. A formula
that is undefined anywhere on the sampling grid (for example
1/x, which hits x = 0) is rejected and the previous plot stays.

Exports go to the configured export directory as PNG images
of both views plus a JSON dump of the plotted series.";

static SHORTCUTS: &str = "\
  Tab            cycle focus: expression, x0, y0
  Enter          plot now
  Up/Down        expression history
  Left/Right     slider -/+ 0.1
  PageUp/Down    slider +/- 1.0
  Home/End       slider to -5 / 5
  [ ]            rotate the 3D view (slider focus)
  F2             toggle surface
  F3             toggle tangent plane
  F4             toggle gradient
  F5             toggle contour
  F6             toggle vector field
  F7  Ctrl-T     light/dark theme
  F8  Ctrl-S     export both views
  F9  Ctrl-R     reset
  F10 Ctrl-P     presets
  F1             this window, Tab switches pages
  Esc            close window or dismiss message
  Ctrl-D         quit";
