use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::core::command::{CommandEnv, CopyToClipboardCmd};
use crate::core::event::Event;
use crate::core::widget::{KeyHint, UpdateResult, Widget};
use crate::reactive::{AttrSchema, AttrValue, FetchJob, ReactiveFetchView};
use crate::registry::WidgetEnv;
use crate::ui::Spinner;
use crate::widgets::{FetchCmd, FetchDone};

use super::model::ImageCard;
use super::plan::NasaSearchPlan;

pub enum NasaMsg {
    Initialize,
    Reload,
    NextPage,
    PrevPage,
    Search(String),
    CopyImageUrl,
    NavigateBack,
    Done(FetchDone),
}

impl From<FetchDone> for NasaMsg {
    fn from(done: FetchDone) -> Self {
        Self::Done(done)
    }
}

enum Mode {
    Browse,
    EditQuery(String),
}

/// The NASA image search screen.
pub struct NasaImages {
    view: ReactiveFetchView,
    cards: Vec<ImageCard>,
    list_state: ListState,
    mode: Mode,
    loading: bool,
    spinner: Spinner,
    default_query: String,
    default_page: u32,
    cmd_env: CommandEnv,
    msg_tx: UnboundedSender<NasaMsg>,
    msg_rx: UnboundedReceiver<NasaMsg>,
}

fn schema() -> AttrSchema {
    AttrSchema::new()
        .text("query")
        .number("page")
        .text("media_type")
        .records("images")
}

impl NasaImages {
    pub fn new(env: &WidgetEnv) -> Self {
        let plan = Arc::new(NasaSearchPlan::new(env.endpoints.nasa.clone()));
        let view = ReactiveFetchView::new(schema(), ["query", "page"], plan, env.pipeline.clone());
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            view,
            cards: Vec::new(),
            list_state: ListState::default(),
            mode: Mode::Browse,
            loading: false,
            spinner: Spinner::new(),
            default_query: env.default_query.clone(),
            default_page: env.default_page.max(1),
            cmd_env: env.cmd_env.clone(),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: NasaMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn page(&self) -> f64 {
        self.view
            .store()
            .get("page")
            .ok()
            .and_then(AttrValue::as_number)
            .unwrap_or(1.0)
    }

    fn query(&self) -> String {
        self.view
            .store()
            .get("query")
            .ok()
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default()
    }

    fn selected_card(&self) -> Option<&ImageCard> {
        self.list_state.selected().and_then(|i| self.cards.get(i))
    }

    fn fetch(&mut self, job: FetchJob) -> UpdateResult {
        self.loading = true;
        self.spinner.set_label("Searching the NASA image library");
        FetchCmd::new(
            "NASA image search",
            self.view.pipeline(),
            self.view.plan(),
            job,
            self.msg_tx.clone(),
        )
        .into()
    }

    fn commit(&mut self) -> UpdateResult {
        match self.view.commit() {
            Some(job) => self.fetch(job),
            None => UpdateResult::Idle,
        }
    }

    fn process(&mut self, msg: NasaMsg) -> color_eyre::Result<UpdateResult> {
        match msg {
            NasaMsg::Initialize => {
                self.view
                    .seed("query", AttrValue::text(self.default_query.clone()))?;
                self.view
                    .seed("page", AttrValue::Number(f64::from(self.default_page)))?;
                self.view.seed("media_type", AttrValue::text("image"))?;
                let job = self.view.mount();
                Ok(self.fetch(job))
            }
            NasaMsg::Reload => {
                let job = self.view.refetch();
                Ok(self.fetch(job))
            }
            NasaMsg::NextPage => {
                self.view
                    .assign("page", AttrValue::Number(self.page() + 1.0))?;
                Ok(self.commit())
            }
            NasaMsg::PrevPage => {
                let page = self.page();
                if page <= 1.0 {
                    return Ok(UpdateResult::Idle);
                }
                self.view.assign("page", AttrValue::Number(page - 1.0))?;
                Ok(self.commit())
            }
            NasaMsg::Search(query) => {
                // One batch, one fetch: a new query always lands on page 1.
                self.view.assign("query", AttrValue::text(query))?;
                self.view.assign("page", AttrValue::Number(1.0))?;
                Ok(self.commit())
            }
            NasaMsg::CopyImageUrl => {
                let Some(card) = self.selected_card() else {
                    return Ok(UpdateResult::Idle);
                };
                Ok(
                    CopyToClipboardCmd::new(card.image.clone(), "image URL", self.cmd_env.clone())
                        .into(),
                )
            }
            NasaMsg::NavigateBack => Ok(UpdateResult::Close),
            NasaMsg::Done(done) => self.finish(done),
        }
    }

    fn finish(&mut self, done: FetchDone) -> color_eyre::Result<UpdateResult> {
        if !self.view.is_current(done.job.generation) {
            // A newer fetch owns the spinner; nothing to do.
            return Ok(UpdateResult::Idle);
        }
        self.loading = false;
        match done.result {
            Ok(updates) => {
                self.view.apply(done.job.generation, updates)?;
                self.cards = ImageCard::from_store(self.view.store());
                self.list_state
                    .select(if self.cards.is_empty() { None } else { Some(0) });
                Ok(UpdateResult::Idle)
            }
            Err(error) => Ok(UpdateResult::Error(format!(
                "NASA image search failed: {error}"
            ))),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('/') => {
                self.mode = Mode::EditQuery(self.query());
                true
            }
            KeyCode::Char('r') => {
                self.queue(NasaMsg::Reload);
                true
            }
            KeyCode::Char('n') | KeyCode::Right => {
                self.queue(NasaMsg::NextPage);
                true
            }
            KeyCode::Char('p') | KeyCode::Left => {
                self.queue(NasaMsg::PrevPage);
                true
            }
            KeyCode::Char('c') => {
                self.queue(NasaMsg::CopyImageUrl);
                true
            }
            KeyCode::Esc => {
                self.queue(NasaMsg::NavigateBack);
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.cards.is_empty() {
                    self.list_state.select_next();
                }
                true
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.cards.is_empty() {
                    self.list_state.select_previous();
                }
                true
            }
            _ => false,
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (title, line) = match &self.mode {
            Mode::EditQuery(buffer) => (
                " New search ",
                Line::from(vec![
                    Span::styled(buffer.clone(), Style::default().fg(theme.text)),
                    Span::styled("█", Style::default().fg(theme.mauve)),
                ]),
            ),
            Mode::Browse => (
                " Search ",
                Line::from(vec![
                    Span::styled(
                        self.query(),
                        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  page {}", self.page()),
                        Style::default().fg(theme.subtext),
                    ),
                ]),
            ),
        };

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.surface))
                .title(title),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_cards(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.surface))
            .title(" Results ");

        if self.cards.is_empty() {
            let empty = Paragraph::new("No results. Press / to search for something else.")
                .style(Style::default().fg(theme.subtext))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let width = area.width.saturating_sub(4) as usize;
        let items = self
            .cards
            .iter()
            .map(|card| {
                let mut lines = vec![Line::from(Span::styled(
                    card.title.clone(),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                ))];
                if !card.creator.is_empty() {
                    lines.push(Line::from(Span::styled(
                        card.creator.clone(),
                        Style::default().fg(theme.peach),
                    )));
                }
                lines.push(Line::from(Span::styled(
                    truncate(&card.description, width),
                    Style::default().fg(theme.subtext),
                )));
                lines.push(Line::from(Span::styled(
                    card.image.clone(),
                    Style::default().fg(theme.blue),
                )));
                lines.push(Line::default());
                ListItem::new(lines)
            })
            .collect::<Vec<_>>();

        let list = List::new(items)
            .block(block)
            .highlight_symbol("> ")
            .highlight_style(Style::default().fg(theme.mauve));
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

impl Widget for NasaImages {
    fn init(&mut self) {
        self.queue(NasaMsg::Initialize);
    }

    fn handle_tick(&mut self) {
        if self.loading {
            self.spinner.on_tick();
        }
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        match &mut self.mode {
            Mode::EditQuery(buffer) => match event {
                Event::Key(key) => match key.code {
                    KeyCode::Enter => {
                        let query = std::mem::take(buffer);
                        self.mode = Mode::Browse;
                        self.queue(NasaMsg::Search(query));
                        true
                    }
                    KeyCode::Esc => {
                        self.mode = Mode::Browse;
                        true
                    }
                    KeyCode::Backspace => {
                        buffer.pop();
                        true
                    }
                    KeyCode::Char(c) => {
                        buffer.push(c);
                        true
                    }
                    _ => false,
                },
                Event::Paste(text) => {
                    buffer.push_str(text);
                    true
                }
                _ => false,
            },
            Mode::Browse => match event {
                Event::Key(key) => self.handle_browse_key(*key),
                _ => false,
            },
        }
    }

    fn update(&mut self) -> color_eyre::Result<UpdateResult> {
        let mut commands = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            match self.process(msg)? {
                UpdateResult::Idle => {}
                UpdateResult::Commands(mut cmds) => commands.append(&mut cmds),
                other @ (UpdateResult::Close | UpdateResult::Error(_)) => return Ok(other),
            }
        }
        if commands.is_empty() {
            Ok(UpdateResult::Idle)
        } else {
            Ok(UpdateResult::Commands(commands))
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [header, body] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
        self.render_header(frame, header, theme);
        if self.loading {
            self.spinner.render(frame, body, theme);
        } else {
            self.render_cards(frame, body, theme);
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["NASA Images".to_string(), format!("page {}", self.page())]
    }

    fn key_hints(&self) -> Vec<KeyHint> {
        match self.mode {
            Mode::EditQuery(_) => vec![
                KeyHint::new("enter", "search"),
                KeyHint::new("esc", "cancel"),
            ],
            Mode::Browse => vec![
                KeyHint::new("/", "search"),
                KeyHint::new("n/p", "page"),
                KeyHint::new("r", "reload"),
                KeyHint::new("c", "copy image URL"),
                KeyHint::new("j/k", "select"),
                KeyHint::new("esc", "back"),
            ],
        }
    }
}
