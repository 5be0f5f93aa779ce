//! Application shell: routing, the main loop, and command spawning.
//!
//! Owns the [`Tui`] loop and the app-level message funnel. The active
//! widget processes its own messages; everything app-wide (quit, suspend,
//! routing, toasts, error display) flows through [`AppMessage`].

use std::fmt;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::Theme;
use crate::cli;
use crate::config;
use crate::core::command::Command;
use crate::core::event::Event;
use crate::core::message::AppMessage;
use crate::core::widget::{KeyHint, UpdateResult, Widget};
use crate::registry::{WidgetEnv, WidgetProvider, WidgetRegistry};
use crate::tui::Tui;
use crate::ui::{ListEvent, SelectList, StatusBar, Toast, ToastManager};

/// One entry in the widget selector.
struct WidgetChoice(Arc<dyn WidgetProvider>);

impl fmt::Display for WidgetChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = self.0.description();
        if description.is_empty() {
            write!(f, "{}", self.0.display_name())
        } else {
            write!(f, "{} — {description}", self.0.display_name())
        }
    }
}

enum Route {
    Select(SelectList<WidgetChoice>),
    Active(Box<dyn Widget>),
}

pub struct App {
    registry: WidgetRegistry,
    widget_env: WidgetEnv,
    route: Route,
    theme: Theme,
    status_bar: StatusBar,
    toasts: ToastManager,
    should_quit: bool,
    should_suspend: bool,
    app_tx: UnboundedSender<AppMessage>,
    app_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(
        registry: WidgetRegistry,
        widget_env: WidgetEnv,
        app_tx: UnboundedSender<AppMessage>,
        app_rx: UnboundedReceiver<AppMessage>,
        theme: Theme,
    ) -> Self {
        let route = Route::Select(selector(&registry));
        Self {
            registry,
            widget_env,
            route,
            theme,
            status_bar: StatusBar::new(),
            toasts: ToastManager::new(),
            should_quit: false,
            should_suspend: false,
            app_tx,
            app_rx,
        }
    }

    /// Apply command-line overrides before the loop starts.
    ///
    /// # Errors
    /// Returns an error if the message channel is closed.
    pub fn apply_cli_args(&mut self, args: &cli::Args) -> color_eyre::Result<()> {
        if let Some(query) = &args.query {
            self.widget_env.default_query = query.clone();
        }
        if let Some(page) = args.page {
            self.widget_env.default_page = page.max(1);
        }
        if let Some(widget) = &args.widget {
            self.app_tx.send(AppMessage::SelectWidget(widget.clone()))?;
        }
        Ok(())
    }

    /// Run the main loop until quit.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up or restored, or
    /// if the message channel is closed.
    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(60.0, 4.0)?;
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.app_tx.send(AppMessage::Resume)?;
                self.app_tx.send(AppMessage::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match &event {
            Event::Quit => self.app_tx.send(AppMessage::Quit)?,
            Event::Error(message) => self
                .app_tx
                .send(AppMessage::DisplayError(message.clone()))?,
            Event::Tick => self.handle_tick(),
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, *width, *height))?;
                self.render(tui)?;
            }
            Event::Init => {}
            Event::Key(_) | Event::Paste(_) => self.handle_input(&event)?,
        }

        Ok(())
    }

    fn handle_tick(&mut self) {
        self.toasts.on_tick();
        if let Route::Active(widget) = &mut self.route {
            widget.handle_tick();
        }
    }

    fn handle_input(&mut self, event: &Event) -> color_eyre::Result<()> {
        // Any input clears a previously displayed error.
        self.status_bar.clear_error();

        match &mut self.route {
            Route::Active(widget) => {
                // Widget first; global keys only see what it declined.
                if widget.handle_input(event) {
                    return self.step_widget();
                }
                if let Event::Key(key) = event {
                    match key.code {
                        KeyCode::Char('q') => self.app_tx.send(AppMessage::Quit)?,
                        KeyCode::Char('z') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            self.app_tx.send(AppMessage::Suspend)?;
                        }
                        _ => {}
                    }
                }
            }
            Route::Select(list) => {
                if let Event::Key(key) = event {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            self.app_tx.send(AppMessage::Quit)?;
                        }
                        KeyCode::Char('z') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            self.app_tx.send(AppMessage::Suspend)?;
                        }
                        _ => {
                            if let Some(ListEvent::Activated(choice)) = list.handle_key(*key) {
                                let widget_key = choice.0.widget_key().to_string();
                                self.app_tx.send(AppMessage::SelectWidget(widget_key))?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        while let Ok(message) = self.app_rx.try_recv() {
            match message {
                AppMessage::Quit => self.should_quit = true,
                AppMessage::Suspend => self.should_suspend = true,
                AppMessage::Resume => self.should_suspend = false,
                AppMessage::ClearScreen => tui.clear()?,
                AppMessage::DisplayError(message) => self.status_bar.set_error(message),
                AppMessage::ShowToast {
                    message,
                    toast_type,
                } => self.toasts.push(Toast::new(message, toast_type)),
                AppMessage::CommandCompleted { name, success } => {
                    debug!(name, success, "command completed");
                    self.step_widget()?;
                }
                AppMessage::SelectWidget(key) => self.open_widget(&key)?,
                AppMessage::GoBack => self.route = Route::Select(selector(&self.registry)),
            }
        }
        Ok(())
    }

    /// Let the active widget drain its message queue, then act on the
    /// outcome. The single place widget results are interpreted.
    fn step_widget(&mut self) -> color_eyre::Result<()> {
        let result = match &mut self.route {
            Route::Active(widget) => widget.update(),
            Route::Select(_) => return Ok(()),
        };

        match result {
            Ok(UpdateResult::Idle) => {}
            Ok(UpdateResult::Commands(commands)) => {
                for command in commands {
                    self.spawn_command(command);
                }
            }
            Ok(UpdateResult::Close) => self.app_tx.send(AppMessage::GoBack)?,
            Ok(UpdateResult::Error(message)) => {
                self.app_tx.send(AppMessage::DisplayError(message))?;
            }
            Err(error) => self
                .app_tx
                .send(AppMessage::DisplayError(format!("Widget failure: {error}")))?,
        }
        Ok(())
    }

    fn spawn_command(&self, command: Box<dyn Command>) {
        let app_tx = self.app_tx.clone();
        tokio::spawn(async move {
            let name = command.name();
            debug!(name, "executing command");
            let success = match command.execute().await {
                Ok(()) => true,
                Err(error) => {
                    let _ = app_tx.send(AppMessage::DisplayError(format!(
                        "{name} failed: {error}"
                    )));
                    false
                }
            };
            let _ = app_tx.send(AppMessage::CommandCompleted { name, success });
        });
    }

    fn open_widget(&mut self, key: &str) -> color_eyre::Result<()> {
        let Some(provider) = self.registry.get(key) else {
            self.status_bar.set_error(format!("Unknown widget `{key}`"));
            return Ok(());
        };

        let mut widget = provider.create_widget(&self.widget_env);
        widget.init();
        self.route = Route::Active(widget);

        if let Err(error) = config::save_last_widget(key) {
            debug!(%error, "could not persist last opened widget");
        }

        self.step_widget()
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        match &self.route {
            Route::Select(_) => {
                self.status_bar
                    .set_breadcrumbs(vec!["select widget".to_string()]);
                self.status_bar.set_hints(vec![
                    KeyHint::new("j/k", "move"),
                    KeyHint::new("enter", "open"),
                    KeyHint::new("q", "quit"),
                ]);
            }
            Route::Active(widget) => {
                self.status_bar.set_breadcrumbs(widget.breadcrumbs());
                self.status_bar.set_hints(widget.key_hints());
            }
        }

        tui.draw(|frame| {
            let [body, bar] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
            match &mut self.route {
                Route::Select(list) => list.render(frame, body, &self.theme),
                Route::Active(widget) => widget.view(frame, body, &self.theme),
            }
            self.status_bar.render(frame, bar, &self.theme);
            self.toasts.render(frame, frame.area(), &self.theme);
        })?;
        Ok(())
    }
}

fn selector(registry: &WidgetRegistry) -> SelectList<WidgetChoice> {
    let choices = registry
        .all()
        .iter()
        .cloned()
        .map(WidgetChoice)
        .collect::<Vec<_>>();
    SelectList::new(" Widgets ", choices)
}
