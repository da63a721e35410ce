mod app;
mod catalog;
mod config;
mod constants;
mod favorites;
mod filter;
mod input;
mod player;
mod resolver;
mod theme;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::Config;
use constants::constants;
use favorites::{Favorites, FavoritesStore, JsonFileStore, MemoryStore};

// --- CLI ---

/// Browse and watch live TV channels from the terminal
#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), long_about = None)]
struct Args {
  /// Channel dataset: a local JSON file or an http(s) URL (default: from prefs, else canales.json)
  #[arg(short, long)]
  catalog: Option<String>,

  /// Cards per page, overriding the dataset's `configuracion.canales_por_pagina`
  #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
  page_size: Option<usize>,

  /// Keep favorites in memory only for this session
  #[arg(long)]
  no_persist: bool,

  /// Print shell completions and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Logging ---

/// Log to `televe.log` in the data dir; the terminal belongs to the TUI.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let dirs = ProjectDirs::from("", "", "televe")?;
  let log_dir = dirs.data_dir();
  std::fs::create_dir_all(log_dir).ok()?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, "televe.log"));
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "televe=info".into()))
    .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
    .init();
  Some(guard)
}

fn favorites_store(no_persist: bool) -> Box<dyn FavoritesStore> {
  if no_persist {
    return Box::new(MemoryStore::default());
  }
  match JsonFileStore::in_data_dir() {
    Some(store) => {
      info!(path = %store.path().display(), "favorites store");
      Box::new(store)
    }
    None => {
      warn!("no data directory; favorites will not persist");
      Box::new(MemoryStore::default())
    }
  }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "televe", &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = init_logging();
  info!(version = env!("CARGO_PKG_VERSION"), "starting televe");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let config = Config::load();
  let location = args.catalog.or_else(|| config.catalog.clone()).unwrap_or_else(|| constants().default_catalog.clone());

  let favorites = Favorites::load(favorites_store(args.no_persist));
  let mut app = App::new(&config, favorites, args.page_size);
  app.start_loading(location);

  loop {
    app.check_pending();
    app.player.check_mpv_status();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  app.player.stop().await?;
  info!("exiting");
  Ok(())
}
