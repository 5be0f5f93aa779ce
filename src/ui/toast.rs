use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Info,
}

/// Short-lived notification shown in the top-right corner.
pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration: Duration::from_secs(3),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
    }

    /// Drop expired toasts. Called on each tick.
    pub fn on_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut y = area.y + 1;
        for toast in self.toasts.iter().take(self.max_visible) {
            let width = (toast.message.len() as u16 + 4).min(area.width.saturating_sub(2));
            let rect = Rect::new(
                area.x + area.width.saturating_sub(width + 1),
                y,
                width,
                3,
            );

            let color = match toast.toast_type {
                ToastType::Success => theme.green,
                ToastType::Info => theme.blue,
            };

            let paragraph = Paragraph::new(toast.message.clone())
                .alignment(Alignment::Center)
                .style(Style::default().fg(color))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(theme.border_type)
                        .border_style(Style::default().fg(color)),
                );

            frame.render_widget(Clear, rect);
            frame.render_widget(paragraph, rect);
            y += 3;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}
