use ratatui::style::{Color, Modifier, Style};

use crate::plot::palette::{Rgb, Theme};

fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// Widget styles for the current color theme.
#[derive(Debug, Clone, Copy)]
pub struct UiTheme {
    theme: Theme,
}

impl UiTheme {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn fg(&self) -> Color {
        match self.theme {
            Theme::Light => Color::Rgb(76, 79, 105),
            Theme::Dark => Color::Rgb(205, 214, 244),
        }
    }

    fn accent(&self) -> Color {
        match self.theme {
            Theme::Light => Color::Rgb(30, 102, 245),
            Theme::Dark => Color::Rgb(137, 180, 250),
        }
    }

    pub fn base(&self) -> Style {
        Style::default()
            .fg(self.fg())
            .bg(rgb(self.theme.palette().background))
    }

    pub fn status_bar(&self) -> Style {
        Style::default()
            .fg(rgb(self.theme.palette().background))
            .bg(self.fg())
    }

    pub fn input_prompt(&self) -> Style {
        Style::default()
            .fg(self.accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn label(&self) -> Style {
        Style::default()
            .fg(rgb(self.theme.palette().tangent))
            .add_modifier(Modifier::BOLD)
    }

    pub fn value(&self) -> Style {
        Style::default().fg(self.fg())
    }

    pub fn error(&self) -> Style {
        Style::default().fg(rgb(self.theme.palette().point))
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(rgb(self.theme.palette().axis))
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent())
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(rgb(self.theme.palette().background))
            .bg(self.accent())
    }

    pub fn hint(&self) -> Style {
        Style::default().fg(rgb(self.theme.palette().axis))
    }
}
