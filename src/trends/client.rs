use std::{sync::Arc, time::Duration};

use backoff::ExponentialBackoff;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, trace, warn};

use super::{
    oracle::{Interest, ScoringOracle, MAX_PHRASES},
    ScoringError,
};

const GOOGLE_TRENDS: &str = "https://trends.google.com";
const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";

type Result<T, E = ScoringError> = std::result::Result<T, E>;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    /// Any timeframe the trends website accepts, e.g. `today 5-y` or `now 7-d`.
    pub timeframe: String,
    pub geo: String,
    pub language: String,
    /// Offset from UTC in minutes, with the sign flipped (the way the website sends it).
    pub timezone: i32,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeframe: "today 5-y".to_owned(),
            geo: String::new(),
            language: "en-US".to_owned(),
            timezone: 360,
            timeout_secs: 20,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Scores phrases with Google Trends' interest over time.
#[derive(Debug, Clone)]
pub struct TrendsClient {
    client: reqwest::Client,
    base: String,
    settings: Settings,
    cookies: Arc<OnceCell<()>>,
}

impl TrendsClient {
    pub fn new(settings: Settings) -> reqwest::Result<Self> {
        Self::with_base(settings, GOOGLE_TRENDS)
    }

    /// A client for a server other than google trends, e.g. one started by a test.
    pub fn with_base(settings: Settings, base: impl Into<String>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_owned(),
            settings,
            cookies: Arc::default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// The API refuses requests without the cookie the homepage hands out.
    async fn ensure_cookies(&self) -> Result<()> {
        self.cookies
            .get_or_try_init(|| async move {
                trace!("fetching google trends cookies");
                self.get_text(&self.url("/"), &[]).await.map(|_| ())
            })
            .await
            .copied()
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let client = &self.client;
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(self.settings.timeout()),
            ..ExponentialBackoff::default()
        };

        let operation = move || async move {
            let response = client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|err| backoff::Error::transient(ScoringError::from(err)))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                return Err(backoff::Error::transient(ScoringError::unavailable(
                    format_args!("google trends responded with {status}"),
                )));
            }

            if !status.is_success() {
                return Err(backoff::Error::permanent(ScoringError::unavailable(
                    format_args!("google trends responded with {status}"),
                )));
            }

            response
                .text()
                .await
                .map_err(|err| backoff::Error::permanent(ScoringError::from(err)))
        };

        backoff::future::retry_notify(policy, operation, |err, wait| {
            warn!(%err, ?wait, url, "google trends request failed, retrying...");
        })
        .await
    }

    fn explore_request(&self, phrases: &[String]) -> serde_json::Value {
        let items: Vec<_> = phrases
            .iter()
            .map(|keyword| {
                json!({
                    "keyword": keyword,
                    "time": self.settings.timeframe,
                    "geo": self.settings.geo,
                })
            })
            .collect();

        json!({
            "comparisonItem": items,
            "category": 0,
            "property": "",
        })
    }

    async fn fetch(&self, phrases: &[String]) -> Result<Interest> {
        self.ensure_cookies().await?;

        let tz = self.settings.timezone.to_string();

        let explore = self
            .get_text(
                &self.url(EXPLORE_PATH),
                &[
                    ("hl", self.settings.language.clone()),
                    ("tz", tz.clone()),
                    ("req", self.explore_request(phrases).to_string()),
                ],
            )
            .await?;
        let widget = parse_timeseries_widget(&explore)?;

        let multiline = self
            .get_text(
                &self.url(MULTILINE_PATH),
                &[
                    ("hl", self.settings.language.clone()),
                    ("tz", tz),
                    ("req", widget.request.to_string()),
                    ("token", widget.token),
                ],
            )
            .await?;

        parse_interest(&multiline, phrases)
    }
}

impl ScoringOracle for TrendsClient {
    #[instrument(skip_all, fields(phrases = ?phrases))]
    async fn try_query(&self, phrases: &[String]) -> Result<Interest> {
        if phrases.is_empty() {
            return Err(ScoringError::NoData);
        }

        if phrases.len() > MAX_PHRASES {
            return Err(ScoringError::unavailable(format_args!(
                "at most {MAX_PHRASES} phrases can be compared at once"
            )));
        }

        let interest = tokio::time::timeout(self.settings.timeout(), self.fetch(phrases)).await??;
        debug!(?interest, "scored phrases");
        Ok(interest)
    }
}

/// Responses start with a few junk bytes to stop them being run as scripts.
fn json_body(body: &str) -> &str {
    body.find('{').map_or(body, |start| &body[start..])
}

#[derive(Deserialize, Debug)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Deserialize, Debug)]
struct Widget {
    id: String,
    #[serde(default)]
    request: serde_json::Value,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug)]
struct TimeseriesWidget {
    request: serde_json::Value,
    token: String,
}

fn parse_timeseries_widget(body: &str) -> Result<TimeseriesWidget> {
    let response: ExploreResponse = serde_json::from_str(json_body(body))?;

    response
        .widgets
        .into_iter()
        .find(|widget| widget.id == "TIMESERIES")
        .and_then(|widget| {
            Some(TimeseriesWidget {
                token: widget.token?,
                request: widget.request,
            })
        })
        .ok_or(ScoringError::NoData)
}

#[derive(Deserialize, Debug)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Timeline {
    #[serde(default)]
    timeline_data: Vec<TimelineRow>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TimelineRow {
    #[serde(default)]
    value: Vec<u32>,
    #[serde(default)]
    is_partial: bool,
}

/// Reads the latest row of the timeline, one value per phrase in request order.
fn parse_interest(body: &str, phrases: &[String]) -> Result<Interest> {
    let response: MultilineResponse = serde_json::from_str(json_body(body))?;

    let latest = response
        .default
        .timeline_data
        .into_iter()
        .last()
        .ok_or(ScoringError::NoData)?;

    if latest.value.is_empty() {
        return Err(ScoringError::NoData);
    }

    if latest.value.len() != phrases.len() {
        return Err(ScoringError::unavailable(format_args!(
            "expected {} values, got {}",
            phrases.len(),
            latest.value.len()
        )));
    }

    trace!(partial = latest.is_partial, "latest timeline row");

    Ok(phrases.iter().cloned().zip(latest.value).collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use std::time::{Duration, Instant};

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };
    use tracing_test::traced_test;

    use super::{
        parse_interest, parse_timeseries_widget, Settings, TrendsClient, EXPLORE_PATH,
        MULTILINE_PATH,
    };
    use crate::trends::{oracle::ScoringOracle, ScoringError};

    fn phrases(phrases: &[&str]) -> Vec<String> {
        phrases.iter().map(|p| (*p).to_owned()).collect()
    }

    const EXPLORE: &str = r#")]}'
{"widgets":[
    {"id":"GEO_MAP","request":{"x":1},"token":"geo"},
    {"id":"TIMESERIES","request":{"time":"today 5-y","comparisonItem":[]},"token":"abc123"}
]}"#;

    #[test]
    fn finds_timeseries_widget() {
        let widget = parse_timeseries_widget(EXPLORE).expect("widget is present");

        assert_eq!(widget.token, "abc123");
        assert_eq!(widget.request["time"], "today 5-y");
    }

    #[test]
    fn missing_widget_is_no_data() {
        let body = r#")]}'{"widgets":[{"id":"RELATED_QUERIES","token":"x"}]}"#;
        assert_eq!(
            parse_timeseries_widget(body).err(),
            Some(ScoringError::NoData)
        );
    }

    const MULTILINE: &str = r#")]}',
{"default":{"timelineData":[
    {"time":"1","value":[10,20],"hasData":[true,true]},
    {"time":"2","value":[55,3],"hasData":[true,true],"isPartial":true}
]}}"#;

    #[test]
    fn reads_latest_row() {
        let interest =
            parse_interest(MULTILINE, &phrases(&["cat update", "update dog"])).expect("has data");

        assert_eq!(
            interest.iter().collect::<Vec<_>>(),
            vec![("cat update", 55), ("update dog", 3)]
        );
    }

    #[test]
    fn empty_timeline_is_no_data() {
        let body = r#")]}',{"default":{"timelineData":[]}}"#;
        assert_eq!(
            parse_interest(body, &phrases(&["cat update"])).err(),
            Some(ScoringError::NoData)
        );
    }

    #[test]
    fn mismatched_row_is_unavailable() {
        let body = r#")]}',{"default":{"timelineData":[{"value":[1]}]}}"#;
        assert!(matches!(
            parse_interest(body, &phrases(&["a", "b"])),
            Err(ScoringError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn garbage_is_unavailable() {
        assert!(matches!(
            parse_interest("<html>rate limited</html>", &phrases(&["a"])),
            Err(ScoringError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn explore_request_keeps_phrases() {
        let client = TrendsClient::new(Settings::default()).expect("client builds");
        let request = client.explore_request(&phrases(&["Cat  update", "update dog"]));

        assert_eq!(request["comparisonItem"][0]["keyword"], "Cat  update");
        assert_eq!(request["comparisonItem"][1]["time"], "today 5-y");
        assert_eq!(request["category"], 0);
    }

    #[tokio::test]
    async fn too_many_phrases_rejected_before_sending() {
        let client = TrendsClient::new(Settings::default()).expect("client builds");
        let result = client
            .try_query(&phrases(&["a", "b", "c", "d", "e", "f"]))
            .await;

        assert!(matches!(result, Err(ScoringError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn no_phrases_is_no_data() {
        let client = TrendsClient::new(Settings::default()).expect("client builds");
        assert_eq!(client.try_query(&[]).await, Err(ScoringError::NoData));
    }

    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("a local port is free");
        let base = format!("http://{}", listener.local_addr().expect("listener is bound"));
        (listener, base)
    }

    /// Reads one request off the stream and returns its path, query included.
    async fn read_path(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut buf = [0; 1024];

        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut buf).await.expect("request is readable");
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
        }

        String::from_utf8_lossy(&request)
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_owned()
    }

    async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("response is writable");
    }

    #[tokio::test]
    #[traced_test]
    async fn rate_limited_requests_are_retried() {
        let (listener, base) = bind().await;

        let server = tokio::spawn(async move {
            let mut explore_requests = 0;

            loop {
                let (mut stream, _) = listener.accept().await.expect("client connects");
                let path = read_path(&mut stream).await;

                if path.starts_with(MULTILINE_PATH) {
                    respond(&mut stream, "200 OK", MULTILINE).await;
                    return explore_requests;
                } else if path.starts_with(EXPLORE_PATH) {
                    explore_requests += 1;
                    if explore_requests == 1 {
                        respond(&mut stream, "429 Too Many Requests", "").await;
                    } else {
                        respond(&mut stream, "200 OK", EXPLORE).await;
                    }
                } else {
                    respond(&mut stream, "200 OK", "<html></html>").await;
                }
            }
        });

        let client = TrendsClient::with_base(Settings::default(), base).expect("client builds");
        let interest = client
            .try_query(&phrases(&["cat update", "update dog"]))
            .await
            .expect("second explore request succeeds");

        assert_eq!(interest.score("cat update"), Some(55));
        assert_eq!(interest.score("update dog"), Some(3));
        assert_eq!(server.await.expect("server finishes"), 2);
        assert!(logs_contain("retrying"));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let (listener, base) = bind().await;

        let server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.expect("client connects");
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let settings = Settings {
            timeout_secs: 1,
            ..Settings::default()
        };
        let client = TrendsClient::with_base(settings, base).expect("client builds");

        let started = Instant::now();
        let result = client.try_query(&phrases(&["cat update"])).await;

        assert!(matches!(result, Err(ScoringError::ProviderUnavailable(_))));
        assert!(started.elapsed() < Duration::from_secs(5));

        server.abort();
    }
}
