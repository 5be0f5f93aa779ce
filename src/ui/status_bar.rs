use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::Theme;
use crate::core::widget::KeyHint;

/// Bottom bar: breadcrumbs on the left, key hints or the last error on the
/// right. Errors stay visible until the next consumed input so the view
/// above can keep showing its last-good data.
pub struct StatusBar {
    breadcrumbs: Vec<String>,
    hints: Vec<KeyHint>,
    error: Option<String>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            breadcrumbs: vec![],
            hints: vec![],
            error: None,
        }
    }

    pub fn set_breadcrumbs(&mut self, breadcrumbs: Vec<String>) {
        self.breadcrumbs = breadcrumbs;
    }

    pub fn set_hints(&mut self, hints: Vec<KeyHint>) {
        self.hints = hints;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut spans = vec![Span::styled(
            " skylens ",
            Style::default()
                .fg(theme.mauve)
                .add_modifier(Modifier::BOLD),
        )];

        for (i, crumb) in self.breadcrumbs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" › ", Style::default().fg(theme.overlay)));
            }
            spans.push(Span::styled(
                crumb.clone(),
                Style::default().fg(theme.subtext),
            ));
        }

        if let Some(error) = &self.error {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("✗ {error}"),
                Style::default().fg(theme.red),
            ));
        } else {
            for hint in &self.hints {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("<{}>", hint.key),
                    Style::default().fg(theme.yellow),
                ));
                spans.push(Span::styled(
                    format!(" {}", hint.action),
                    Style::default().fg(theme.overlay),
                ));
            }
        }

        frame.render_widget(Line::from(spans), area);
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
