mod app;
mod cache;
mod cli;
mod config;
mod error;
mod feed;
mod github;
mod nav;
mod ui;

use std::fs::{self, File};
use std::io;
use std::sync::{Arc, Mutex};

use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use cache::{Clock, FileStore, KeyValueStore, MemoryStore, SystemClock, paths};
use cli::Cli;
use config::{CacheLocation, Config};
use error::Result;
use feed::FeedPipeline;
use github::GitHubClient;
use nav::{MemoryHistory, Navigator, SectionConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_cli(Cli::parse())?;

    // stdout belongs to the UI; log to a file.
    if let Some(dir) = &config.log_dir {
        init_logging(dir);
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn KeyValueStore> = match &config.cache {
        CacheLocation::Directory(dir) => Arc::new(FileStore::new(dir.clone(), clock.clone())),
        CacheLocation::Memory => Arc::new(MemoryStore::new(clock.clone())),
    };

    let client = GitHubClient::from_env(&config.api_base)?;
    info!(account = %config.feed.account, api = %client.base_url(), "starting");
    let pipeline = Arc::new(FeedPipeline::new(
        Arc::new(client),
        store,
        clock,
        config.feed.clone(),
    ));

    let nav = Navigator::new(
        SectionConfig::default(),
        MemoryHistory::new(&config.initial_path),
    );
    let mut app = App::new(pipeline, nav);

    let mut terminal = setup_terminal()?;
    let result = app.run(&mut terminal);
    restore_terminal(&mut terminal)?;
    result?;

    info!("exiting");
    Ok(())
}

fn init_logging(dir: &std::path::Path) {
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("warning: cannot create log directory {}: {}", dir.display(), e);
        return;
    }
    let file = match File::create(paths::log_path(dir)) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("warning: cannot open log file: {}", e);
            return;
        }
    };

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if initialized.is_err() {
        warn!("tracing subscriber already installed");
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
