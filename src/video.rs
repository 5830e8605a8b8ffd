use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_VIDEO: &str = "Videos/startearth.mp4";

/// Background clip for a condition code. Every code above 800 gets the
/// clouds clip; codes outside the known ranges fall back to the default.
pub fn pick_video_path(code: Option<i64>) -> &'static str {
    match code {
        Some(200..=299) => "Videos/Thunderstorm.mp4",
        Some(300..=399) => "Videos/Drizzle.mp4",
        Some(500..=599) => "Videos/Rain.mp4",
        Some(600..=699) => "Videos/Snow.mp4",
        Some(700..=799) => "Videos/Fog.mp4",
        Some(800) => "Videos/Sunny.mp4",
        Some(801..) => "Videos/Clouds.mp4",
        _ => DEFAULT_VIDEO,
    }
}

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("no source loaded")]
    NoSource,

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

pub trait Player {
    /// Stops current playback and prepares `src`.
    fn load(&mut self, src: &str);

    fn play(&mut self) -> Result<(), PlayError>;
}

#[derive(Debug, Default)]
pub struct VideoSource {
    pub src: String,
}

pub struct BackgroundVideo {
    base: PathBuf,
    source: Option<VideoSource>,
    player: Box<dyn Player>,
}

impl BackgroundVideo {
    pub fn new(base: impl Into<PathBuf>, player: Box<dyn Player>) -> Self {
        Self {
            base: base.into(),
            source: Some(VideoSource::default()),
            player,
        }
    }

    pub fn current_source(&self) -> Option<&str> {
        self.source
            .as_ref()
            .map(|s| s.src.as_str())
            .filter(|src| !src.is_empty())
    }
}

/// Loads and plays `path` unless it is already the loaded source.
/// Playback failures are logged and dropped.
pub fn apply_video(path: &str, video: Option<&mut BackgroundVideo>) {
    let Some(video) = video else {
        return;
    };
    let Some(source) = video.source.as_mut() else {
        return;
    };
    if source.src.ends_with(path) {
        debug!(path, "background video already showing");
        return;
    }

    source.src = video.base.join(path).to_string_lossy().into_owned();
    video.player.load(&source.src);
    if let Err(err) = video.player.play() {
        warn!("video play was prevented: {err}");
    }
}

pub fn show_weather_video(code: Option<i64>, video: Option<&mut BackgroundVideo>) {
    apply_video(pick_video_path(code), video);
}

/// Plays clips with an external program, e.g. `mpv --loop --no-audio`.
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    src: Option<String>,
    child: Option<Child>,
}

impl CommandPlayer {
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            src: None,
            child: None,
        })
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                debug!("player already exited: {err}");
            }
            let _ = child.wait();
        }
    }
}

impl Player for CommandPlayer {
    fn load(&mut self, src: &str) {
        self.stop();
        self.src = Some(src.to_owned());
    }

    fn play(&mut self) -> Result<(), PlayError> {
        let src = self.src.as_deref().ok_or(PlayError::NoSource)?;
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(src)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlayError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        self.child = Some(child);
        Ok(())
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
