use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::openweather::BASE_URL;

const ABOUT: &str = "Current weather card for the terminal";

const LONG_ABOUT: &str = "
Terminal card showing the current weather for a city, sourced from OpenWeatherMap.

Type a city name and press Enter. Esc or Ctrl-C quits.

An OpenWeatherMap API key is required (--api-key or OPENWEATHER_API_KEY). If a player command is
given, a background clip matching the weather is played with it, e.g. --player 'mpv --loop'.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to look up on start (e.g. Berlin, London, etc.)")]
    pub city: Option<String>,

    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "OPENWEATHER_ENDPOINT", default_value = BASE_URL)]
    pub endpoint: String,

    #[arg(
        long,
        env = "WX_CARD_VIDEO_DIR",
        default_value = ".",
        help = "Directory containing the Videos/ clips"
    )]
    pub video_dir: PathBuf,

    #[arg(
        long,
        env = "WX_CARD_PLAYER",
        help = "Command used to play background clips; the clip path is appended"
    )]
    pub player: Option<String>,

    #[arg(long, env = "WX_CARD_LOG", help = "Write logs to this file (filter with RUST_LOG)")]
    pub log_file: Option<PathBuf>,
}
