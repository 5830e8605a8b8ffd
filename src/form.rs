use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::card::{render_error, render_weather, Card};
use crate::openweather::{WeatherError, WeatherResult, WeatherSource};
use crate::video::BackgroundVideo;

pub const EMPTY_CITY: &str = "Please enter a city name.";

/// The city text field. Its value is used exactly as typed.
#[derive(Debug, Default)]
pub struct CityInput {
    value: String,
}

impl CityInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn push(&mut self, ch: char) {
        self.value.push(ch);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }
}

#[derive(Debug)]
pub struct LookupRequest {
    pub token: u64,
    pub city: String,
}

#[derive(Debug)]
pub struct LookupReply {
    pub token: u64,
    pub outcome: Result<WeatherResult, WeatherError>,
}

/// Owns the input and the card; turns submissions into lookups and lookup
/// replies into renders. Only the reply to the latest submission is shown.
#[derive(Debug)]
pub struct FormController {
    input: CityInput,
    card: Card,
    latest: u64,
    pending: Option<String>,
}

impl FormController {
    /// Wires the form. Returns `None` if either element is missing.
    pub fn attach(input: Option<CityInput>, card: Option<Card>) -> Option<Self> {
        let (Some(input), Some(card)) = (input, card) else {
            debug!("weather form elements missing, submit not wired");
            return None;
        };
        Some(Self {
            input,
            card,
            latest: 0,
            pending: None,
        })
    }

    pub fn input_mut(&mut self) -> &mut CityInput {
        &mut self.input
    }

    pub fn input(&self) -> &CityInput {
        &self.input
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    /// City of the lookup still in flight, if any.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn submit(&mut self) -> Option<LookupRequest> {
        let city = self.input.value().to_owned();
        // Every submission supersedes lookups still in flight.
        self.latest += 1;
        if city.is_empty() {
            self.pending = None;
            render_error(EMPTY_CITY, Some(&mut self.card));
            return None;
        }

        info!(token = self.latest, city = %city, "looking up weather");
        self.pending = Some(city.clone());
        Some(LookupRequest {
            token: self.latest,
            city,
        })
    }

    /// Renders a reply. Returns `false` if a newer submission superseded it.
    pub fn complete(&mut self, reply: LookupReply, video: Option<&mut BackgroundVideo>) -> bool {
        if reply.token != self.latest {
            debug!(
                token = reply.token,
                latest = self.latest,
                "dropping stale weather reply"
            );
            return false;
        }
        self.pending = None;

        match reply.outcome {
            Ok(data) => render_weather(Some(&data), Some(&mut self.card), video),
            Err(err) => {
                error!("{err:?}");
                render_error(&err.to_string(), Some(&mut self.card));
            }
        }
        true
    }
}

/// Runs the lookup on a worker thread and posts the reply to `replies`.
pub fn dispatch(
    request: LookupRequest,
    source: Arc<dyn WeatherSource>,
    replies: Sender<LookupReply>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let outcome = source.fetch_weather(&request.city);
        let reply = LookupReply {
            token: request.token,
            outcome,
        };
        if replies.send(reply).is_err() {
            debug!(token = request.token, "ui closed before weather reply");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{NodeClass, NodeKind};
    use crate::openweather::LOOKUP_FAILED;
    use crate::video::tests::{recording_video, Call};
    use std::collections::HashMap;
    use std::sync::mpsc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        cities: HashMap<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, city: &str, body: &str) -> Self {
            self.cities.insert(city.to_owned(), body.to_owned());
            self
        }
    }

    impl WeatherSource for FakeSource {
        fn fetch_weather(&self, city: &str) -> Result<WeatherResult, WeatherError> {
            self.seen.lock().unwrap().push(city.to_owned());
            match self.cities.get(city) {
                Some(body) => Ok(serde_json::from_str(body)?),
                None => Err(WeatherError::Lookup),
            }
        }
    }

    const BERLIN: &str = r#"{"name":"Berlin","main":{"temp":300,"humidity":50},"weather":[{"id":800,"description":"clear sky"}]}"#;
    const LONDON: &str = r#"{"name":"London","main":{"temp":285.15,"humidity":81},"weather":[{"id":500,"description":"light rain"}]}"#;

    fn form(city: &str) -> FormController {
        FormController::attach(Some(CityInput::new(city)), Some(Card::default())).unwrap()
    }

    fn lookup(form: &mut FormController, source: Arc<dyn WeatherSource>) -> LookupReply {
        let request = form.submit().unwrap();
        let (tx, rx) = mpsc::channel();
        dispatch(request, source, tx).join().unwrap();
        rx.recv().unwrap()
    }

    fn texts(form: &FormController) -> Vec<String> {
        form.card().nodes().iter().map(|n| n.text.clone()).collect()
    }

    #[test]
    fn missing_elements_are_not_wired() {
        assert!(FormController::attach(None, Some(Card::default())).is_none());
        assert!(FormController::attach(Some(CityInput::default()), None).is_none());
        assert!(FormController::attach(None, None).is_none());
    }

    #[test]
    fn submit_shows_weather() {
        let source: Arc<dyn WeatherSource> = Arc::new(FakeSource::default().with("Berlin", BERLIN));
        let (mut video, player) = recording_video();
        let mut form = form("Berlin");

        let reply = lookup(&mut form, source);
        assert!(form.complete(reply, Some(&mut video)));

        assert_eq!(
            texts(&form),
            vec![
                "Berlin",
                "Temperature: 26.9°C",
                "Humidity: 50%",
                "Description: clear sky",
                "☀️",
            ]
        );
        assert_eq!(form.card().nodes()[0].kind, NodeKind::Heading);
        assert_eq!(
            *player.calls.borrow(),
            vec![Call::Load("/srv/wx/Videos/Sunny.mp4".into()), Call::Play]
        );
        assert_eq!(form.pending(), None);
    }

    #[test]
    fn empty_city_shows_error_without_lookup() {
        let mut form = form("");
        assert!(form.submit().is_none());
        assert_eq!(form.card().text(), EMPTY_CITY);
        assert_eq!(form.card().nodes()[0].class, NodeClass::Error);
        assert_eq!(form.pending(), None);
    }

    #[test]
    fn failed_lookup_shows_uniform_error() {
        let source: Arc<dyn WeatherSource> = Arc::new(FakeSource::default());
        let mut form = form("NotACity");

        let reply = lookup(&mut form, source);
        form.complete(reply, None);

        assert_eq!(form.card().text(), LOOKUP_FAILED);
        assert_eq!(form.card().nodes().len(), 1);
    }

    #[test]
    fn incomplete_payload_leaves_card_empty() {
        let source: Arc<dyn WeatherSource> = Arc::new(FakeSource::default().with("Nowhere", "{}"));
        let mut form = form("Nowhere");

        let reply = lookup(&mut form, source);
        form.complete(reply, None);

        assert!(form.card().nodes().is_empty());
    }

    #[test]
    fn new_search_replaces_previous_city() {
        let source: Arc<dyn WeatherSource> = Arc::new(
            FakeSource::default()
                .with("Berlin", BERLIN)
                .with("London", LONDON),
        );
        let mut form = form("Berlin");
        let reply = lookup(&mut form, source.clone());
        form.complete(reply, None);

        for _ in 0.."Berlin".len() {
            form.input_mut().pop();
        }
        for ch in "London".chars() {
            form.input_mut().push(ch);
        }
        let reply = lookup(&mut form, source);
        form.complete(reply, None);

        let text = form.card().text();
        assert!(text.contains("London"));
        assert!(!text.contains("Berlin"));
        assert!(text.contains("Temperature: 12.0°C"));
    }

    #[test]
    fn city_is_passed_through_untrimmed() {
        let fake = Arc::new(FakeSource::default());
        let source: Arc<dyn WeatherSource> = fake.clone();
        let mut form = form("   Berlin   ");

        let reply = lookup(&mut form, source);
        form.complete(reply, None);

        assert_eq!(*fake.seen.lock().unwrap(), vec!["   Berlin   ".to_string()]);
    }

    #[test]
    fn stale_reply_is_dropped() {
        let mut form = form("Berlin");
        let first = form.submit().unwrap();
        let second = form.submit().unwrap();
        assert!(second.token > first.token);
        assert_eq!(form.pending(), Some("Berlin"));

        let fresh = LookupReply {
            token: second.token,
            outcome: Ok(serde_json::from_str(BERLIN).unwrap()),
        };
        assert!(form.complete(fresh, None));

        let stale = LookupReply {
            token: first.token,
            outcome: Err(WeatherError::Lookup),
        };
        assert!(!form.complete(stale, None));
        assert_eq!(form.card().nodes()[0].text, "Berlin");
    }

    #[test]
    fn transport_failure_message_is_shown() {
        let mut form = form("Berlin");
        let request = form.submit().unwrap();
        let reply = LookupReply {
            token: request.token,
            outcome: Err(WeatherError::Transport(anyhow::anyhow!("Network error"))),
        };
        form.complete(reply, None);
        assert_eq!(form.card().text(), "Network error");
    }

    #[test]
    fn empty_submission_supersedes_lookup_in_flight() {
        let mut form = form("Berlin");
        let first = form.submit().unwrap();

        for _ in 0.."Berlin".len() {
            form.input_mut().pop();
        }
        assert!(form.submit().is_none());
        assert_eq!(form.pending(), None);

        let late = LookupReply {
            token: first.token,
            outcome: Ok(serde_json::from_str(BERLIN).unwrap()),
        };
        assert!(!form.complete(late, None));
        assert_eq!(texts(&form), vec![EMPTY_CITY]);
    }
}
