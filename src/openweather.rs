use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

pub const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

pub const LOOKUP_FAILED: &str = "City not found or API error.";

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Any non-success response, whatever the status.
    #[error("{}", LOOKUP_FAILED)]
    Lookup,

    #[error(transparent)]
    Transport(anyhow::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Current weather payload. Every field is optional and a field of the wrong
/// type reads as missing; the renderer decides what is usable.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct WeatherResult {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub main: Option<Main>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub weather: Vec<ConditionEntry>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Main {
    /// Kelvin
    #[serde(default, deserialize_with = "lenient")]
    pub temp: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<serde_json::Number>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ConditionEntry {
    pub id: Option<Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

impl ConditionEntry {
    /// The condition code, if the provider sent an integer.
    pub fn code(&self) -> Option<i64> {
        self.id.as_ref().and_then(Value::as_i64)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// Anything but an array is an empty list; entries that are not objects read
// as entries with no fields.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(vec![]);
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

pub struct Reply {
    pub status: u16,
    pub body: String,
}

pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> Result<Reply, WeatherError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("wx-card")
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<Reply, WeatherError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| WeatherError::Transport(e.without_url().into()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| WeatherError::Transport(e.without_url().into()))?;
        Ok(Reply { status, body })
    }
}

/// Anything that can look up the current weather for a city.
pub trait WeatherSource: Send + Sync {
    fn fetch_weather(&self, city: &str) -> Result<WeatherResult, WeatherError>;
}

pub struct OpenWeatherClient<T = HttpTransport> {
    transport: T,
    endpoint: String,
    api_key: String,
}

impl<T: Transport> OpenWeatherClient<T> {
    pub fn new(transport: T, endpoint: &str, api_key: &str) -> Self {
        Self {
            transport,
            endpoint: endpoint.to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    fn url_for(&self, city: &str) -> Result<Url, WeatherError> {
        Ok(Url::parse_with_params(
            &self.endpoint,
            &[("q", city), ("appid", self.api_key.as_str())],
        )?)
    }
}

impl<T: Transport> WeatherSource for OpenWeatherClient<T> {
    fn fetch_weather(&self, city: &str) -> Result<WeatherResult, WeatherError> {
        let url = self.url_for(city)?;
        debug!(endpoint = %self.endpoint, city, "requesting current weather");
        let reply = self.transport.get(&url)?;
        if !(200..300).contains(&reply.status) {
            error!(status = reply.status, city, "weather lookup failed");
            return Err(WeatherError::Lookup);
        }
        Ok(serde_json::from_str(&reply.body)?)
    }
}
