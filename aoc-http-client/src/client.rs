//! AOC HTTP client implementation

use crate::error::AocError;
use crate::rate_limit::{Rate, RateLimiter};
use regex::Regex;
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header::{COOKIE, HeaderValue};
use reqwest::{StatusCode, Url};
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{info, warn};
use zeroize::{Zeroize, Zeroizing};

/// Default site root
pub const DEFAULT_BASE_URL: &str = "https://adventofcode.com";

/// Timeout applied to every request made by the default HTTP client
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Identifying user agent used when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION")
);

/// Result of session verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// User ID if session is valid, None otherwise
    pub user_id: Option<u64>,
}

/// Rate-limited client for the Advent of Code website
///
/// Every request first takes a slot from the shared [`RateLimiter`], then
/// goes out with the configured user agent and, when a session is set, the
/// session cookie. Only `200 OK` counts as success.
///
/// # Example
///
/// ```no_run
/// use aoc_http_client::{AocClient, RateLimiter};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = Arc::new(RateLimiter::open(Path::new(".advent-tool/ratelimit.sqlite"))?);
/// let client = AocClient::builder()
///     .session(Some("your_session_cookie"))
///     .rate_limiter(limiter)
///     .build()?;
///
/// let page = client.get(client.page_url(2024, 1)?)?;
/// println!("{} bytes", page.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AocClient {
    client: reqwest::blocking::Client,
    base_url: Url,
    session: Option<Zeroizing<String>>,
    limiter: Arc<RateLimiter>,
}

impl fmt::Debug for AocClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AocClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session.as_ref().map(|_| "<redacted>"))
            .field("rate", &self.limiter.rate())
            .finish()
    }
}

impl AocClient {
    /// Create an unauthenticated client against the default site root
    ///
    /// The client gets a process-local rate limiter; use the builder to share
    /// a durable one.
    pub fn new() -> Result<Self, AocError> {
        Self::builder().build()
    }

    /// Create a builder for configuring the AOC client
    pub fn builder() -> AocClientBuilder {
        AocClientBuilder::new()
    }

    /// Whether requests carry a session cookie
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The configured site root
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The rate limiter every request goes through
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// URL of the puzzle page: `{root}/{year}/day/{day}`
    pub fn page_url(&self, year: u16, day: u8) -> Result<Url, AocError> {
        self.url(&[&year.to_string(), "day", &day.to_string()])
    }

    /// URL of the puzzle input: `{root}/{year}/day/{day}/input`
    pub fn input_url(&self, year: u16, day: u8) -> Result<Url, AocError> {
        self.url(&[&year.to_string(), "day", &day.to_string(), "input"])
    }

    /// URL answers are posted to: `{root}/{year}/day/{day}/answer`
    pub fn answer_url(&self, year: u16, day: u8) -> Result<Url, AocError> {
        self.url(&[&year.to_string(), "day", &day.to_string(), "answer"])
    }

    fn url(&self, segments: &[&str]) -> Result<Url, AocError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AocError::ClientInit("Cannot modify base URL path".to_string()))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// Create a secure cookie header value from a session string
    ///
    /// The header is flagged sensitive and the temporary string is zeroized.
    fn create_cookie_header(session: &str) -> Result<HeaderValue, AocError> {
        let mut cookie_string = format!("session={}", session);
        let header_value = HeaderValue::from_bytes(cookie_string.as_bytes())
            .map_err(|_| AocError::ClientInit("Invalid session cookie format".to_string()));
        cookie_string.zeroize();

        let mut sensitive_header = header_value?;
        sensitive_header.set_sensitive(true);
        Ok(sensitive_header)
    }

    fn authorize(&self, request: RequestBuilder, url: &Url) -> Result<RequestBuilder, AocError> {
        match &self.session {
            Some(session) => Ok(request.header(COOKIE, Self::create_cookie_header(session)?)),
            None => {
                warn!(%url, "No session cookie configured, sending unauthenticated request");
                Ok(request)
            }
        }
    }

    /// GET `url` and return the body of a `200 OK` response
    ///
    /// # Errors
    ///
    /// * `AocError::RateLimit` - the limiter store failed or the wait was too long
    /// * `AocError::Request` - network error
    /// * `AocError::Fetch` - any status other than 200
    /// * `AocError::Encoding` - response is not valid UTF-8
    pub fn get(&self, url: Url) -> Result<String, AocError> {
        self.limiter.acquire(url.as_str())?;
        let response = self
            .authorize(self.client.get(url.clone()), &url)?
            .send()?;
        Self::classify("GET", &url, response)
    }

    /// POST `form` to `url` and return the body of a `200 OK` response
    ///
    /// Errors are the same as for [`AocClient::get`].
    pub fn post(&self, url: Url, form: &[(&str, &str)]) -> Result<String, AocError> {
        self.limiter.acquire(url.as_str())?;
        let response = self
            .authorize(self.client.post(url.clone()), &url)?
            .form(form)
            .send()?;
        Self::classify("POST", &url, response)
    }

    fn classify(method: &str, url: &Url, response: Response) -> Result<String, AocError> {
        let status = response.status();
        info!("{method} - {url} - {status}");

        if status != StatusCode::OK {
            return Err(AocError::Fetch {
                status,
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        response.text().map_err(|_| AocError::Encoding)
    }

    /// Verify if a session cookie is valid and retrieve user ID
    ///
    /// Requests the settings page without following redirects. A 2xx status
    /// means the session is valid and the user ID is read from the page; a
    /// redirect or error status means it is not.
    pub fn verify_session(&self, session: &str) -> Result<SessionInfo, AocError> {
        let cookie_header = Self::create_cookie_header(session)?;
        let url = self.url(&["settings"])?;

        self.limiter.acquire(url.as_str())?;
        let response = self
            .client
            .get(url)
            .header(COOKIE, cookie_header)
            .send()?;

        if !response.status().is_success() {
            return Ok(SessionInfo { user_id: None });
        }

        let html = response.text().map_err(|_| AocError::Encoding)?;
        Ok(SessionInfo {
            user_id: extract_user_id(&html),
        })
    }
}

/// Extract user ID from settings page HTML
fn extract_user_id(html: &str) -> Option<u64> {
    static USER_ID: OnceLock<Regex> = OnceLock::new();
    let regex = USER_ID.get_or_init(|| Regex::new(r"\(anonymous user #(\d+)\)").unwrap());
    regex.captures(html)?.get(1)?.as_str().parse().ok()
}

/// Builder for configuring an AOC HTTP client
///
/// Redirects are never followed, whatever reqwest builder is supplied.
#[derive(Debug, Default)]
pub struct AocClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    session: Option<Zeroizing<String>>,
    limiter: Option<Arc<RateLimiter>>,
    client_builder: Option<reqwest::blocking::ClientBuilder>,
}

impl AocClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom site root, validated immediately
    pub fn base_url(mut self, url: impl reqwest::IntoUrl) -> Result<Self, AocError> {
        self.base_url = Some(url.into_url()?);
        Ok(self)
    }

    /// Set the identifying user agent sent with every request
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set (or clear) the session cookie value, without the `session=` prefix
    pub fn session<S: Into<String>>(mut self, session: Option<S>) -> Self {
        self.session = session
            .map(|s| Zeroizing::new(s.into()))
            .filter(|s| !s.trim().is_empty());
        self
    }

    /// Share an existing rate limiter handle
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Set a custom HTTP client builder (timeouts, proxies, TLS)
    ///
    /// The default builder uses rustls and a 60 second timeout.
    pub fn client_builder(mut self, builder: reqwest::blocking::ClientBuilder) -> Self {
        self.client_builder = Some(builder);
        self
    }

    /// Build the AOC client with the configured settings
    pub fn build(self) -> Result<AocClient, AocError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| AocError::ClientInit(e.to_string()))?,
        };

        let limiter = match self.limiter {
            Some(limiter) => limiter,
            None => Arc::new(RateLimiter::in_memory(Rate::default())?),
        };

        let builder = self.client_builder.unwrap_or_else(|| {
            reqwest::blocking::Client::builder()
                .use_rustls_tls()
                .timeout(REQUEST_TIMEOUT)
        });

        let client = builder
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AocError::ClientInit(e.to_string()))?;

        Ok(AocClient {
            client,
            base_url,
            session: self.session,
            limiter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use proptest::prelude::*;

    fn client_for(server: &mockito::Server, session: Option<&str>) -> AocClient {
        AocClient::builder()
            .base_url(server.url())
            .unwrap()
            .user_agent("aoc-test-agent")
            .session(session)
            .rate_limiter(Arc::new(
                RateLimiter::in_memory(Rate::new(1000, Duration::from_secs(1))).unwrap(),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_base_url() {
        let client = AocClient::new().unwrap();
        assert_eq!(client.base_url().as_str(), "https://adventofcode.com/");
        assert!(!client.has_session());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = AocClient::builder().base_url("not a valid url");
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_session_is_treated_as_missing() {
        let client = AocClient::builder().session(Some("  ")).build().unwrap();
        assert!(!client.has_session());
    }

    #[test]
    fn test_debug_redacts_session() {
        let client = AocClient::builder()
            .session(Some("super-secret-cookie"))
            .build()
            .unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret-cookie"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_get_sends_cookie_and_user_agent() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/2023/day/10")
            .match_header("cookie", "session=abc123")
            .match_header("user-agent", "aoc-test-agent")
            .with_status(200)
            .with_body("<html>page</html>")
            .expect(1)
            .create();

        let client = client_for(&server, Some("abc123"));
        let body = client.get(client.page_url(2023, 10).unwrap()).unwrap();

        assert_eq!(body, "<html>page</html>");
        mock.assert();
    }

    #[test]
    fn test_get_without_session_omits_cookie() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/2023/day/10/input")
            .match_header("cookie", Matcher::Missing)
            .with_status(200)
            .with_body("1\n2\n3\n")
            .expect(1)
            .create();

        let client = client_for(&server, None);
        let body = client.get(client.input_url(2023, 10).unwrap()).unwrap();

        assert_eq!(body, "1\n2\n3\n");
        mock.assert();
    }

    #[test]
    fn test_post_sends_form_fields() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/2022/day/3/answer")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("level".into(), "2".into()),
                Matcher::UrlEncoded("answer".into(), "a b/c".into()),
            ]))
            .with_status(200)
            .with_body("<article><p>That's the right answer!</p></article>")
            .expect(1)
            .create();

        let client = client_for(&server, Some("abc123"));
        let body = client
            .post(
                client.answer_url(2022, 3).unwrap(),
                &[("level", "2"), ("answer", "a b/c")],
            )
            .unwrap();

        assert!(body.contains("right answer"));
        mock.assert();
    }

    #[test]
    fn test_redirect_is_not_followed() {
        let mut server = mockito::Server::new();
        let home = server.mock("GET", "/").expect(0).create();
        let page = server
            .mock("GET", "/2023/day/1")
            .with_status(302)
            .with_header("location", "/")
            .expect(1)
            .create();

        let client = client_for(&server, None);
        let result = client.get(client.page_url(2023, 1).unwrap());

        match result {
            Err(AocError::Fetch { status, .. }) => assert_eq!(status.as_u16(), 302),
            other => panic!("Expected Fetch error, got {:?}", other),
        }
        home.assert();
        page.assert();
    }

    #[test]
    fn test_rate_limiter_runs_before_request() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/2023/day/1")
            .with_status(200)
            .with_body("ok")
            .expect(1)
            .create();

        let limiter = RateLimiter::in_memory(Rate::new(1, Duration::from_secs(30)))
            .unwrap()
            .with_max_delay(Duration::from_millis(20));
        let client = AocClient::builder()
            .base_url(server.url())
            .unwrap()
            .rate_limiter(Arc::new(limiter))
            .build()
            .unwrap();

        let url = client.page_url(2023, 1).unwrap();
        assert!(client.get(url.clone()).is_ok());
        assert!(matches!(
            client.get(url),
            Err(AocError::RateLimit(crate::RateLimitError::DelayExceeded { .. }))
        ));
        mock.assert();
    }

    #[test]
    fn test_verify_session_reads_user_id() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/settings")
            .match_header("cookie", "session=abc123")
            .with_status(200)
            .with_body("<html><body>Settings (anonymous user #424242)</body></html>")
            .expect(1)
            .create();

        let client = client_for(&server, None);
        let info = client.verify_session("abc123").unwrap();

        assert_eq!(info.user_id, Some(424242));
        mock.assert();
    }

    #[test]
    fn test_verify_session_redirect_is_invalid() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/settings")
            .with_status(303)
            .with_header("location", "/")
            .expect(1)
            .create();

        let client = client_for(&server, None);
        let info = client.verify_session("expired").unwrap();

        assert!(info.user_id.is_none());
        mock.assert();
    }

    // Non-success statuses surface as Fetch errors carrying status and reason
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_non_ok_status_is_fetch_error(
            year in 2015u16..2030u16,
            day in 1u8..=25u8,
            status_code in prop::sample::select(vec![201, 202, 400, 401, 404, 429, 500, 502, 503]),
        ) {
            let mut server = mockito::Server::new();
            let expected_path = format!("/{}/day/{}/input", year, day);
            let mock = server.mock("GET", expected_path.as_str())
                .with_status(status_code)
                .with_body("Error response")
                .expect(1)
                .create();

            let client = client_for(&server, Some("abc123"));
            let result = client.get(client.input_url(year, day).unwrap());

            match result {
                Err(AocError::Fetch { status, reason }) => {
                    prop_assert_eq!(status.as_u16(), status_code as u16);
                    prop_assert_eq!(
                        reason.as_str(),
                        status.canonical_reason().unwrap_or("Unknown")
                    );
                }
                other => prop_assert!(false, "Expected AocError::Fetch, got {:?}", other),
            }
            mock.assert();
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_user_id_extraction(
            user_id in 100000u64..9999999u64,
            prefix in "[a-zA-Z0-9 .,!?\\n]{0,100}",
            suffix in "[a-zA-Z0-9 .,!?\\n]{0,100}",
        ) {
            let html = format!(
                r#"<html><body>{} (anonymous user #{}) {}</body></html>"#,
                prefix, user_id, suffix
            );
            prop_assert_eq!(extract_user_id(&html), Some(user_id));
        }
    }
}
