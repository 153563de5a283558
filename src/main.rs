mod client;
mod color;
mod config;
mod error;
mod lookup;
mod models;
mod picker;
mod server;
mod session;
mod storage;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use client::LookupClient;
use config::Config;
use lookup::PaletteCatalog;
use models::{MoodPalettes, Palette, DEFAULT_MOOD};
use picker::{FetchOutcome, PaletteView, Picker};
use storage::FileStore;

#[derive(Debug, Parser)]
#[command(name = "mood-palette", version, about = "Color palettes by mood")]
struct Cli {
    /// Lookup service base URL (overrides PALETTE_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// File holding favorites and history (overrides PALETTE_STATE_FILE).
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// Print the palette view as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the palette lookup service.
    Serve,
    /// Show the current palette (default).
    Show,
    /// List moods and their palettes.
    Moods,
    /// Switch mood and apply its first palette.
    Mood { name: String },
    /// Apply a palette of the current mood by position.
    Pick { index: usize },
    /// Apply the current palette again.
    Apply,
    /// Add or remove the current palette from favorites.
    Favorite,
    /// List favorites.
    Favorites,
    /// List recently applied palettes.
    History,
    /// Apply a favorite by position.
    UseFavorite { index: usize },
    /// Apply a history entry by position.
    UseHistory { index: usize },
    /// Remove a favorite by position.
    RemoveFavorite { index: usize },
    /// Remove a history entry by position.
    RemoveHistory { index: usize },
    /// Fetch more palettes for the current mood.
    Fetch,
    /// Print the current colors, comma separated.
    Copy,
    /// Switch between the dark and light theme.
    Theme,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Show);

    // The server logs requests; client commands keep stdout for the view
    let default_filter = match command {
        Command::Serve => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let mut config = Config::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(state_file) = cli.state_file {
        config.state_file = state_file;
    }

    if let Command::Serve = command {
        return serve(&config).await;
    }

    let moods = MoodPalettes::seeded().context("parse seed moods")?;
    let store = FileStore::open(&config.state_file)
        .with_context(|| format!("open state file {}", config.state_file.display()))?;
    let mut picker = Picker::open(moods, DEFAULT_MOOD, store).context("restore session")?;

    let view = match command {
        Command::Serve | Command::Show => picker.view(),
        Command::Moods => {
            let session = picker.session();
            for mood in session.moods().names() {
                let marker = if mood == session.current_mood() { "*" } else { " " };
                println!("{} {}", marker, mood);
                print_palettes(session.moods().get(mood).unwrap_or_default());
            }
            return Ok(());
        }
        Command::Favorites => {
            print_palettes(picker.session().favorites());
            return Ok(());
        }
        Command::History => {
            print_palettes(picker.session().history());
            return Ok(());
        }
        Command::Copy => {
            println!("{}", picker.copy_text());
            return Ok(());
        }
        Command::Mood { name } => picker.select_mood(&name)?,
        Command::Pick { index } => picker.select_palette(index)?,
        Command::Apply => picker.apply_current()?,
        Command::Favorite => picker.toggle_favorite()?,
        Command::UseFavorite { index } => picker.apply_favorite(index)?,
        Command::UseHistory { index } => picker.apply_history(index)?,
        Command::RemoveFavorite { index } => picker.remove_favorite(index)?,
        Command::RemoveHistory { index } => picker.remove_history(index)?,
        Command::Theme => picker.toggle_theme()?,
        Command::Fetch => {
            let client = LookupClient::new(&config.api_url)?;
            match picker.fetch_more(&client).await {
                Ok(FetchOutcome::Added(count)) => println!("Added {} palettes.", count),
                Ok(FetchOutcome::NothingNew) => {
                    println!("No new palettes were found for this mood.");
                }
                Err(err) => {
                    return Err(err).context("Failed to fetch palettes. Is the backend server running?");
                }
            }
            picker.view()
        }
    };

    print_view(&view, cli.json)
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let catalog = PaletteCatalog::load(&config.palettes_file);
    let app = server::router(server::AppState::new(catalog), &config.frontend_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!("Backend server is running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .context("serve")?;

    info!("Server shut down gracefully");
    Ok(())
}

fn print_palettes(palettes: &[Palette]) {
    for (index, palette) in palettes.iter().enumerate() {
        println!("  {:>2}. {}", index, palette.copy_text());
    }
}

fn print_view(view: &PaletteView, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    match view.index {
        Some(index) => println!("{} #{}  {}", view.mood, index, view.palette.copy_text()),
        None => println!("{}  {}", view.mood, view.palette.copy_text()),
    }
    println!(
        "{} ({:.2}:1){}",
        view.contrast.label(),
        view.contrast_ratio,
        if view.favorited { "  ★ favorite" } else { "" }
    );
    println!("background: {}", view.gradient);
    println!("theme: {}", view.theme.as_str());
    Ok(())
}
