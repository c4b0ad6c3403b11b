use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::HttpGateway;
use crate::app::App;
use crate::core::RetryPolicy;
use crate::page::PageContext;
use crate::ui::StatusBar;

mod api;
mod app;
mod cli;
pub mod commands;
mod config;
pub mod core;
mod error;
mod page;
mod pages;
mod theme;
pub mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting chainview");

    let args = cli::Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    info!(base_url = %config.api.base_url, "Using remote service");

    let gateway = HttpGateway::new(&config.api)?;
    let retry = RetryPolicy::from(config.retry);
    let theme = theme::theme_from_name(&config.theme.name);
    let status_bar = StatusBar::new(gateway.base_url(), retry);

    let ctx = PageContext {
        gateway: Arc::new(gateway),
        retry,
    };

    let mut app = App::new(ctx, theme, status_bar, args.page.into(), args.post_id);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("chainview").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "chainview.log");
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
