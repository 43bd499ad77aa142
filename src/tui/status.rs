use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::Frame;

use crate::tui::theme::UiTheme;

/// How long a notice stays up unless dismissed.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message shown in the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub expires: Instant,
}

impl Notice {
    pub fn info(text: impl Into<String>, now: Instant) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
            expires: now + NOTICE_TTL,
        }
    }

    pub fn error(text: impl Into<String>, now: Instant) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            expires: now + NOTICE_TTL,
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now >= self.expires
    }
}

pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    ui: &UiTheme,
    summary: &str,
    notice: Option<&Notice>,
) {
    let version = env!("CARGO_PKG_VERSION");
    let left_text = format!(" gradscope v{} | {}", version, summary);
    let right_text = " F1 help  Ctrl-D quit ";

    let mut spans = vec![Span::styled(left_text.clone(), ui.status_bar())];
    let mut used = left_text.chars().count() + right_text.len();
    if let Some(notice) = notice {
        let style = match notice.level {
            NoticeLevel::Info => ui.status_bar(),
            NoticeLevel::Error => ui.error().bg(ui.status_bar().bg.unwrap_or_default()),
        };
        let text = format!(" | {}", notice.text);
        used += text.chars().count();
        spans.push(Span::styled(text, style));
    }

    let padding = (area.width as usize).saturating_sub(used);
    spans.push(Span::styled(" ".repeat(padding), ui.status_bar()));
    spans.push(Span::styled(right_text, ui.status_bar()));

    frame.render_widget(Line::from(spans), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expiry() {
        let now = Instant::now();
        let notice = Notice::error("boom", now);
        assert!(!notice.expired(now + Duration::from_secs(1)));
        assert!(notice.expired(now + NOTICE_TTL));
    }
}
