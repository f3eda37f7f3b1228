use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gitfamous::app::{run_app, spawn_input_reader};
use gitfamous::cli::CliArgs;
use gitfamous::clock::SystemClock;
use gitfamous::config::{Config, process_env};
use gitfamous::dashboard::{Dashboard, DashboardContext, Mode};
use gitfamous::open::SystemOpener;
use gitfamous::source::GitHubSource;
use gitfamous::theme::Theme;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "off" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli_args = CliArgs::parse();
    init_tracing(cli_args.verbose);

    info!("Starting gitfamous");

    let (requests, mode) = match cli_args.single_request(process_env)? {
        Some(request) => (vec![request], Mode::Single),
        None => {
            let config = Config::load(cli_args.config.clone())?;
            (config.fetch_requests(process_env)?, Mode::Dashboard)
        }
    };

    let theme = if process_env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        Theme::plain()
    } else {
        Theme::default()
    };
    let width = crossterm::terminal::size().ok().map(|(w, _)| w);
    let context = DashboardContext::new(theme, Box::new(SystemOpener));
    let mut dashboard = Dashboard::new(requests, mode, context, width)?;

    let source = GitHubSource::new().context("failed to build HTTP client")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = unbounded();
    dashboard.start(Arc::new(source), Arc::new(SystemClock), tx.clone());
    spawn_input_reader(tx);
    let res = run_app(&mut terminal, &mut dashboard, &rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {:#}", err);
        eprintln!("Error: {:#}", err);
        return Ok(ExitCode::FAILURE);
    }

    if let Some(failure) = dashboard.failure() {
        eprintln!("Error: {}", failure);
        return Ok(ExitCode::FAILURE);
    }

    info!("gitfamous shut down cleanly");
    Ok(ExitCode::SUCCESS)
}
