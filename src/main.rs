use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::core::command::CommandEnv;
use crate::reactive::{FetchPipeline, ReqwestSource};
use crate::registry::{WidgetEnv, WidgetRegistry};

mod app;
mod cli;
mod config;
pub mod core;
pub mod reactive;
mod registry;
mod theme;
pub mod tui;
mod ui;
pub mod widgets;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting skylens");

    let args = cli::Args::parse();

    let config = config::load()?;
    let endpoints = config.endpoints()?;
    let theme = theme::theme_from_name(&config.theme.name);

    let (app_tx, app_rx) = mpsc::unbounded_channel();
    let http = Arc::new(ReqwestSource::new()?);
    let widget_env = WidgetEnv {
        endpoints,
        pipeline: FetchPipeline::new(http, Duration::from_secs(config.fetch.timeout_secs)),
        cmd_env: CommandEnv::new(app_tx.clone()),
        default_query: config.fetch.default_query.clone(),
        default_page: config.fetch.default_page.max(1),
    };

    let mut registry = WidgetRegistry::new();
    widgets::register_all(&mut registry);

    let mut app = App::new(registry, widget_env, app_tx, app_rx, theme);
    app.apply_cli_args(&args)?;
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("skylens").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "skylens.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
