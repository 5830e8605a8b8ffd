use crate::openweather::WeatherResult;
use crate::units::temperature::k2c;
use crate::video::{show_weather_video, BackgroundVideo};
use crate::weather::weather_emoji;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Heading,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    City,
    Temperature,
    Humidity,
    Description,
    Emoji,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub class: NodeClass,
    pub text: String,
}

/// The display container. Renderers own its children: every render starts
/// from an empty card.
#[derive(Debug, Default)]
pub struct Card {
    nodes: Vec<Node>,
    visible: bool,
}

impl Card {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn clear(&mut self) {
        self.nodes.clear();
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn push(&mut self, kind: NodeKind, class: NodeClass, text: impl Into<String>) {
        self.nodes.push(Node {
            kind,
            class,
            text: text.into(),
        });
    }
}

pub fn render_error(message: &str, card: Option<&mut Card>) {
    let Some(card) = card else {
        return;
    };
    card.clear();
    card.show();
    card.push(NodeKind::Paragraph, NodeClass::Error, message);
}

/// Renders a lookup result. Results without a name or a non-zero temperature
/// leave the card empty.
pub fn render_weather(
    data: Option<&WeatherResult>,
    card: Option<&mut Card>,
    video: Option<&mut BackgroundVideo>,
) {
    let Some(card) = card else {
        return;
    };
    card.clear();

    let Some(data) = data else {
        return;
    };
    let (Some(name), Some(temp)) = (
        data.name.as_deref().filter(|n| !n.is_empty()),
        data.main.as_ref().and_then(|m| m.temp).filter(|t| *t != 0.0),
    ) else {
        return;
    };

    card.show();
    card.push(NodeKind::Heading, NodeClass::City, name);
    card.push(
        NodeKind::Paragraph,
        NodeClass::Temperature,
        format!("Temperature: {:.1}°C", k2c(temp)),
    );

    if let Some(humidity) = data.main.as_ref().and_then(|m| m.humidity.as_ref()) {
        card.push(
            NodeKind::Paragraph,
            NodeClass::Humidity,
            format!("Humidity: {humidity}%"),
        );
    }

    if let Some(first) = data.weather.first() {
        card.push(
            NodeKind::Paragraph,
            NodeClass::Description,
            format!(
                "Description: {}",
                first.description.as_deref().unwrap_or_default()
            ),
        );
        card.push(
            NodeKind::Paragraph,
            NodeClass::Emoji,
            weather_emoji(first.code()),
        );
        show_weather_video(first.code(), video);
    }
}
