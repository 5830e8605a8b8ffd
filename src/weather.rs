/// Display category of an OpenWeatherMap condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Fog,
    Clear,
    Clouds,
    Unknown,
}

impl Condition {
    /// Classifies a condition code. Missing codes are `Unknown`.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(200..=299) => Condition::Thunderstorm,
            Some(300..=399) => Condition::Drizzle,
            Some(500..=599) => Condition::Rain,
            Some(600..=699) => Condition::Snow,
            Some(700..=799) => Condition::Fog,
            Some(800) => Condition::Clear,
            Some(801..=899) => Condition::Clouds,
            _ => Condition::Unknown,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Condition::Thunderstorm => "🌩️",
            Condition::Drizzle | Condition::Rain => "🌧️",
            Condition::Snow => "❄️",
            Condition::Fog => "🌫️",
            Condition::Clear => "☀️",
            Condition::Clouds => "☁️",
            Condition::Unknown => "?",
        }
    }
}

pub fn weather_emoji(code: Option<i64>) -> &'static str {
    Condition::from_code(code).emoji()
}
