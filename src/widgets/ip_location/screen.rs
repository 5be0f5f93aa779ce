use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::core::command::{CommandEnv, CopyToClipboardCmd};
use crate::core::event::Event;
use crate::core::widget::{KeyHint, UpdateResult, Widget};
use crate::reactive::{AttrSchema, FetchJob, ReactiveFetchView};
use crate::registry::WidgetEnv;
use crate::ui::Spinner;
use crate::widgets::{FetchCmd, FetchDone};

use super::model::GeoLocation;
use super::plan::GeoIpPlan;

pub enum LocationMsg {
    Initialize,
    Reload,
    CopyMapLink,
    NavigateBack,
    Done(FetchDone),
}

impl From<FetchDone> for LocationMsg {
    fn from(done: FetchDone) -> Self {
        Self::Done(done)
    }
}

/// The location-from-IP screen.
pub struct IpLocation {
    view: ReactiveFetchView,
    location: Option<GeoLocation>,
    loading: bool,
    spinner: Spinner,
    cmd_env: CommandEnv,
    msg_tx: UnboundedSender<LocationMsg>,
    msg_rx: UnboundedReceiver<LocationMsg>,
}

fn schema() -> AttrSchema {
    AttrSchema::new()
        .number("lat")
        .number("long")
        .text("city")
        .text("region")
}

impl IpLocation {
    pub fn new(env: &WidgetEnv) -> Self {
        let plan = Arc::new(GeoIpPlan::new(
            env.endpoints.geoip.clone(),
            env.endpoints.ip.clone(),
        ));
        // No trigger attributes: only mount and the reload key fetch.
        let view = ReactiveFetchView::new(
            schema(),
            std::iter::empty::<&str>(),
            plan,
            env.pipeline.clone(),
        );
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            view,
            location: None,
            loading: false,
            spinner: Spinner::new(),
            cmd_env: env.cmd_env.clone(),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: LocationMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn fetch(&mut self, job: FetchJob) -> UpdateResult {
        self.loading = true;
        self.spinner.set_label("Locating your public IP");
        FetchCmd::new(
            "IP geolocation",
            self.view.pipeline(),
            self.view.plan(),
            job,
            self.msg_tx.clone(),
        )
        .into()
    }

    fn process(&mut self, msg: LocationMsg) -> color_eyre::Result<UpdateResult> {
        match msg {
            LocationMsg::Initialize => {
                let job = self.view.mount();
                Ok(self.fetch(job))
            }
            LocationMsg::Reload => {
                let job = self.view.refetch();
                Ok(self.fetch(job))
            }
            LocationMsg::CopyMapLink => {
                let Some(location) = &self.location else {
                    return Ok(UpdateResult::Idle);
                };
                Ok(
                    CopyToClipboardCmd::new(location.map_link(), "map link", self.cmd_env.clone())
                        .into(),
                )
            }
            LocationMsg::NavigateBack => Ok(UpdateResult::Close),
            LocationMsg::Done(done) => self.finish(done),
        }
    }

    fn finish(&mut self, done: FetchDone) -> color_eyre::Result<UpdateResult> {
        if !self.view.is_current(done.job.generation) {
            return Ok(UpdateResult::Idle);
        }
        self.loading = false;
        match done.result {
            Ok(updates) => {
                self.view.apply(done.job.generation, updates)?;
                self.location = Some(GeoLocation::from_store(self.view.store())?);
                Ok(UpdateResult::Idle)
            }
            Err(error) => Ok(UpdateResult::Error(format!(
                "IP geolocation failed: {error}"
            ))),
        }
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let lines = match &self.location {
            Some(location) => {
                let label = |s: &'static str| Span::styled(s, Style::default().fg(theme.subtext));
                vec![
                    Line::from(vec![
                        label("City      "),
                        Span::styled(
                            location.city.clone(),
                            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(vec![
                        label("Region    "),
                        Span::styled(location.region.clone(), Style::default().fg(theme.text)),
                    ]),
                    Line::from(vec![
                        label("Latitude  "),
                        Span::styled(
                            location.lat.to_string(),
                            Style::default().fg(theme.text),
                        ),
                    ]),
                    Line::from(vec![
                        label("Longitude "),
                        Span::styled(
                            location.long.to_string(),
                            Style::default().fg(theme.text),
                        ),
                    ]),
                    Line::default(),
                    Line::from(Span::styled(
                        location.map_link(),
                        Style::default().fg(theme.blue),
                    )),
                ]
            }
            None => vec![Line::from(Span::styled(
                "Not located yet. Press r to try again.",
                Style::default().fg(theme.subtext),
            ))],
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.surface))
                .title(" Your location "),
        );
        frame.render_widget(paragraph, area);
    }
}

impl Widget for IpLocation {
    fn init(&mut self) {
        self.queue(LocationMsg::Initialize);
    }

    fn handle_tick(&mut self) {
        if self.loading {
            self.spinner.on_tick();
        }
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        match key.code {
            KeyCode::Char('r') => {
                self.queue(LocationMsg::Reload);
                true
            }
            KeyCode::Char('c') => {
                self.queue(LocationMsg::CopyMapLink);
                true
            }
            KeyCode::Esc => {
                self.queue(LocationMsg::NavigateBack);
                true
            }
            _ => false,
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
        if self.loading {
            self.spinner.render(frame, area, theme);
        } else {
            self.render_panel(frame, area, theme);
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let place = self
            .location
            .as_ref()
            .filter(|l| !l.city.is_empty())
            .map_or_else(|| "unlocated".to_string(), |l| l.city.clone());
        vec!["Location".to_string(), place]
    }

    fn key_hints(&self) -> Vec<KeyHint> {
        vec![
            KeyHint::new("r", "reload"),
            KeyHint::new("c", "copy map link"),
            KeyHint::new("esc", "back"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::AppConfig;
    use crate::core::command::Command as _;
    use crate::reactive::FetchPipeline;
    use crate::reactive::pipeline::tests::ScriptedSource;

    fn env(source: Arc<ScriptedSource>) -> WidgetEnv {
        let (app_tx, _app_rx) = mpsc::unbounded_channel();
        WidgetEnv {
            endpoints: AppConfig::default().endpoints().unwrap(),
            pipeline: FetchPipeline::new(source, Duration::from_secs(5)),
            cmd_env: CommandEnv::new(app_tx),
            default_query: String::new(),
            default_page: 1,
        }
    }

    async fn run_commands(widget: &mut IpLocation) {
        let UpdateResult::Commands(commands) = widget.update().unwrap() else {
            panic!("expected commands");
        };
        for command in commands {
            command.execute().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_mount_resolves_ip_then_geolocates() {
        let source = Arc::new(ScriptedSource::new(vec![
            ScriptedSource::ok(r#"{"ip": "93.184.216.34"}"#),
            ScriptedSource::ok(
                r#"{"latitude": 47.37, "longitude": 8.54, "city": "Zurich", "region_name": "ZH"}"#,
            ),
        ]));
        let mut widget = IpLocation::new(&env(source.clone()));

        widget.init();
        run_commands(&mut widget).await;
        assert!(matches!(widget.update().unwrap(), UpdateResult::Idle));

        let location = widget.location.as_ref().unwrap();
        assert_eq!(location.city, "Zurich");
        assert_eq!(
            location.map_link(),
            "https://www.google.com/maps/@47.37,8.54,14z"
        );
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec![
                "https://api.ipify.org/?format=json".to_string(),
                "https://freegeoip.app/json/93.184.216.34".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_ip_lookup_reports_error() {
        let source = Arc::new(ScriptedSource::new(vec![Err(
            crate::reactive::FetchError::Network("connection refused".to_string()),
        )]));
        let mut widget = IpLocation::new(&env(source));

        widget.init();
        run_commands(&mut widget).await;

        let result = widget.update().unwrap();
        assert!(matches!(result, UpdateResult::Error(msg) if msg.contains("network error")));
        assert!(widget.location.is_none());
    }

    #[test]
    fn test_copy_without_location_is_idle() {
        let mut widget = IpLocation::new(&env(Arc::new(ScriptedSource::new(vec![]))));
        let result = widget.process(LocationMsg::CopyMapLink).unwrap();
        assert!(matches!(result, UpdateResult::Idle));
    }
}
