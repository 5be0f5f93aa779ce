use std::fmt::Display;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::Theme;

/// Output of [`SelectList::handle_key`].
pub enum ListEvent<'a, T> {
    Changed(&'a T),
    Activated(&'a T),
}

/// A titled, selectable list with vim-style navigation.
pub struct SelectList<T: Display> {
    title: &'static str,
    items: Vec<T>,
    state: ListState,
}

impl<T: Display> SelectList<T> {
    pub fn new(title: &'static str, items: Vec<T>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            title,
            items,
            state,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ListEvent<'_, T>> {
        let before = self.state.selected();

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.select_next();
                self.change_event(before)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select_previous();
                self.change_event(before)
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.state.select_first();
                self.change_event(before)
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.state.select_last();
                self.change_event(before)
            }
            KeyCode::Enter => self
                .state
                .selected()
                .and_then(|i| self.items.get(i))
                .map(ListEvent::Activated),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items = self
            .items
            .iter()
            .map(|i| ListItem::new(i.to_string()))
            .collect::<Vec<ListItem>>();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(theme.border_type)
                    .border_style(Style::default().fg(theme.surface))
                    .title(self.title),
            )
            .style(Style::default().fg(theme.text))
            .highlight_style(
                Style::default()
                    .fg(theme.mauve)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }

    fn change_event(&self, before: Option<usize>) -> Option<ListEvent<'_, T>> {
        let selected = self.state.selected()?;
        if Some(selected) == before {
            return None;
        }
        self.items.get(selected).map(ListEvent::Changed)
    }
}
