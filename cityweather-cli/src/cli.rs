use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cityweather_core::{
    CityCatalog, Config, DirImageProbe, FlagDownloader, HttpImageProbe, Poller, WeatherService,
    WidgetClient, provider_from_config,
};
use tracing::info;

use crate::{render, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Random city weather widget")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Visual Crossing API key and widget settings.
    Configure,

    /// Run the HTTP backend and the widget page.
    Serve {
        /// Address to listen on, e.g. "0.0.0.0:5000".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show the widget in the terminal, refreshing from a running backend.
    Watch {
        /// Backend base URL, e.g. "http://127.0.0.1:5000".
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Download flag images for every country in the cities file.
    DownloadFlags,

    /// Print the weather of one random city as JSON.
    Show,
}

impl Cli {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(config),
            Command::Serve { bind } => serve(config, bind).await,
            Command::Watch { endpoint } => watch(config, endpoint).await,
            Command::DownloadFlags => download_flags(config).await,
            Command::Show => show(config).await,
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = inquire::Password::new("Visual Crossing API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let endpoint = inquire::Text::new("Widget backend URL:")
        .with_default(&config.widget.endpoint)
        .prompt()
        .context("Failed to read backend URL")?;
    config.widget.endpoint = endpoint;

    let interval = inquire::CustomType::<u64>::new("Poll interval (seconds):")
        .with_default(config.widget.poll_interval_secs)
        .prompt()
        .context("Failed to read poll interval")?;
    config.widget.poll_interval_secs = interval;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn weather_service(config: &Config) -> anyhow::Result<WeatherService> {
    let catalog = CityCatalog::load(&config.server.cities_path)?;
    let provider = provider_from_config(config)?;
    Ok(WeatherService::new(catalog, Arc::from(provider)))
}

async fn serve(config: Config, bind: Option<String>) -> anyhow::Result<()> {
    let service = weather_service(&config)?;
    info!(cities = service.catalog_len(), "city catalog loaded");

    let bind_addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let flags_dir = config.server.flags_dir.clone();

    let state = server::AppState {
        service: Arc::new(service),
        photo_probe: Arc::new(HttpImageProbe::new(&config.widget.photo_base_url)?),
        flag_probe: Arc::new(DirImageProbe::new(&flags_dir)),
        photo_base: config.widget.photo_base_url.clone(),
        refresh_secs: config.widget.poll_interval().as_secs(),
    };
    let app = server::create_router(state, &flags_dir);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(ctrl_c())
        .await
        .context("Server error")?;

    Ok(())
}

async fn watch(config: Config, endpoint: Option<String>) -> anyhow::Result<()> {
    let endpoint = endpoint.unwrap_or_else(|| config.widget.endpoint.clone());
    let client = WidgetClient::new(&endpoint)?;
    let probe = HttpImageProbe::new(&endpoint)?;

    let poller = Poller::new(
        client,
        Arc::new(probe),
        config.widget.photo_base_url.clone(),
        config.widget.poll_interval(),
    );

    poller
        .run(
            |view| {
                println!("{}", render::terminal_card(view));
            },
            ctrl_c(),
        )
        .await;

    Ok(())
}

async fn download_flags(config: Config) -> anyhow::Result<()> {
    let catalog = CityCatalog::load(&config.server.cities_path)?;
    let summary = FlagDownloader::new()?
        .download_all(&catalog, &config.server.flags_dir)
        .await?;

    println!("Downloaded: {}", summary.downloaded);
    println!("Errors: {}", summary.errors);
    Ok(())
}

async fn show(config: Config) -> anyhow::Result<()> {
    let report = weather_service(&config)?.random_report().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
