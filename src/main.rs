use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::File, io, path::Path, sync::Arc, sync::Mutex};
use tracing_subscriber::EnvFilter;

mod app;
mod card;
mod cli;
mod form;
mod openweather;
mod units;
mod video;
mod weather;

use crate::app::{run_app, App};
use crate::card::Card;
use crate::form::{CityInput, FormController};
use crate::openweather::{HttpTransport, OpenWeatherClient, WeatherSource};
use crate::video::{BackgroundVideo, CommandPlayer};

// The terminal owns stdout, so logs only go to a file.
fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_logging(args.log_file.as_deref())?;

    let transport = HttpTransport::new().context("cannot build http client")?;
    let source: Arc<dyn WeatherSource> = Arc::new(OpenWeatherClient::new(
        transport,
        &args.endpoint,
        &args.api_key,
    ));
    let video = args
        .player
        .as_deref()
        .and_then(CommandPlayer::from_command_line)
        .map(|player| BackgroundVideo::new(args.video_dir.clone(), Box::new(player)));

    let input = CityInput::new(args.city.clone().unwrap_or_default());
    let form = FormController::attach(Some(input), Some(Card::default()))
        .context("weather form is not wired")?;
    let mut app = App::new(form, video, source);
    if args.city.is_some() {
        app.submit();
    }

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}
