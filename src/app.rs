use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame, Terminal,
};

use crate::card::{Card, NodeClass, NodeKind};
use crate::form::{dispatch, FormController, LookupReply};
use crate::openweather::WeatherSource;
use crate::video::{apply_video, BackgroundVideo, DEFAULT_VIDEO};

const MISSING: &str = "--";

const TICK: Duration = Duration::from_millis(100);

pub struct App {
    form: FormController,
    video: Option<BackgroundVideo>,
    source: Arc<dyn WeatherSource>,
    sender: Sender<LookupReply>,
    replies: Receiver<LookupReply>,
    updated: Option<DateTime<Local>>,
}

impl App {
    pub fn new(
        form: FormController,
        mut video: Option<BackgroundVideo>,
        source: Arc<dyn WeatherSource>,
    ) -> Self {
        apply_video(DEFAULT_VIDEO, video.as_mut());
        let (sender, replies) = mpsc::channel();
        Self {
            form,
            video,
            source,
            sender,
            replies,
            updated: None,
        }
    }

    pub fn submit(&mut self) {
        if let Some(request) = self.form.submit() {
            dispatch(request, Arc::clone(&self.source), self.sender.clone());
        }
    }

    fn drain_replies(&mut self) {
        while let Ok(reply) = self.replies.try_recv() {
            if self.form.complete(reply, self.video.as_mut()) {
                self.updated = Some(Local::now());
            }
        }
    }

    /// Returns `false` when the user asked to quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => self.form.input_mut().pop(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.form.input_mut().push(ch)
            }
            _ => {}
        }
        true
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.drain_replies();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.on_key(key) {
                    return Ok(());
                }
            }
        }
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(Color::Yellow)))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_headline(app: &App) -> Paragraph<'_> {
    let background = app
        .video
        .as_ref()
        .and_then(BackgroundVideo::current_source)
        .and_then(|src| Path::new(src).file_name())
        .map_or_else(|| MISSING.to_string(), |f| f.to_string_lossy().into_owned());

    let status = if let Some(city) = app.form.pending() {
        format!(" Looking up {city}...")
    } else if let Some(updated) = app.updated {
        format!(" Updated {}", updated.format("%d-%m-%Y %H:%M"))
    } else {
        format!(" {MISSING}")
    };

    Paragraph::new(vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled("wx-card", Style::default().fg(Color::Blue)),
            Span::raw(" : "),
            Span::styled(background, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(status),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    )
}

fn display_card(card: &Card) -> Paragraph<'_> {
    let mut lines = vec![Line::from("")];
    for node in card.nodes() {
        let style = match (node.kind, node.class) {
            (NodeKind::Heading, _) => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            (_, NodeClass::Error) => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::Green),
        };
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(node.text.as_str(), style),
        ]));
    }
    Paragraph::new(lines).block(bordered(" Weather "))
}

fn ui(f: &mut Frame, app: &App) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(f.area());

    f.render_widget(display_headline(app), vert_layout[0]);

    let value = app.form.input().value();
    f.render_widget(
        Paragraph::new(Line::from(vec![Span::raw(" "), Span::raw(value)]))
            .block(bordered(" City ")),
        vert_layout[1],
    );
    let Rect { x, y, width, .. } = vert_layout[1];
    let cursor = (value.chars().count() as u16).saturating_add(2);
    f.set_cursor_position((x + cursor.min(width.saturating_sub(2)), y + 1));

    if app.form.card().is_visible() {
        f.render_widget(display_card(app.form.card()), vert_layout[2]);
    }
}
