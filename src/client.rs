use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use reqwest::{
    Client, Response,
    cookie::{CookieStore, Jar},
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::{
    config::Credentials,
    error::{Error, Result},
    model::Timetable,
    parsing::{
        page::{HandshakeExtractor, RegexExtractor, cookie_pairs, find_xsrf_token},
        timetable::extract_table,
    },
    week::{format_week_start, week_windows},
};

/// Tokens every authenticated request has to echo back. Cookies live in the client's jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub xsrf_token: String,
    pub version: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
    remember: bool,
}

pub struct Digi1 {
    client: Client,
    jar: Arc<Jar>,
    base_uri: Url,
    entry_page: Url,
    login_post: Url,
    dashboard: Url,
    extractor: Box<dyn HandshakeExtractor>,
}

impl Digi1 {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_extractor(base_url, Box::new(RegexExtractor))
    }

    /// Uses `extractor` to read the handshake blob from the entry page.
    pub fn with_extractor(base_url: &str, extractor: Box<dyn HandshakeExtractor>) -> Result<Self> {
        let base_uri = parse_url(base_url)?;
        let entry_page = join(&base_uri, "/")?;
        let login_post = join(&base_uri, "/login")?;
        let dashboard = join(&base_uri, "/teacher/dashboard")?;
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("lt,en-US;q=0.7,en;q=0.3"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let client = Client::builder()
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            jar,
            base_uri,
            entry_page,
            login_post,
            dashboard,
            extractor,
        })
    }

    /// Loads the entry page for the protocol version and CSRF cookie, then logs in.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn establish_session(&self, credentials: &Credentials) -> Result<Session> {
        let entry = self.client.get(self.entry_page.clone()).send().await?;
        let entry = ensure_success(entry, Error::Protocol)?;

        let cookies: Vec<(String, String)> = entry
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let set_cookie_token =
            find_xsrf_token(cookies.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        let html = entry.text().await?;

        let version = self.extractor.version(&html)?;
        debug!(%version, "found inertia version");

        let xsrf_token = set_cookie_token
            .or_else(|| self.jar_xsrf_token())
            .ok_or_else(|| Error::Protocol("could not find XSRF token".into()))?;

        let session = Session {
            xsrf_token,
            version,
        };

        let body = LoginBody {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
            remember: false,
        };

        let response = self
            .client
            .post(self.login_post.clone())
            .headers(inertia_headers(&session)?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Auth(format!("login failed with status {status}")));
        }

        info!("logged in");
        Ok(session)
    }

    /// Fetches the dashboard's timetable table. Without `week_start` the server picks
    /// the current week.
    #[instrument(skip(self, session))]
    pub async fn query_timetable(
        &self,
        session: &Session,
        week_start: Option<DateTime<Utc>>,
    ) -> Result<Timetable> {
        let mut request = self
            .client
            .get(self.dashboard.clone())
            .headers(inertia_headers(session)?);
        if let Some(week_start) = week_start {
            request = request.query(&[("weekStart", format_week_start(week_start))]);
        }

        let response = request.send().await?;
        let response = ensure_success(response, Error::Protocol)?;
        let page: Value = response
            .json()
            .await
            .map_err(|e| Error::Protocol(format!("dashboard did not return JSON: {e}")))?;

        let table = extract_table(&page)?;
        debug!(days = table.len(), "received timetable");
        Ok(table)
    }

    /// Logs in and fetches this week and next week, concatenated in that order.
    pub async fn fetch_timetable(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<Timetable> {
        let session = self.establish_session(credentials).await?;

        let mut days = Timetable::new();
        for week_start in week_windows(now) {
            days.extend(self.query_timetable(&session, Some(week_start)).await?);
        }
        Ok(days)
    }

    fn jar_xsrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_uri)?;
        let header = header.to_str().ok()?;
        find_xsrf_token(cookie_pairs(header))
    }
}

/// Headers that make the server answer with a JSON page object instead of HTML.
pub fn inertia_headers(session: &Session) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html, application/xhtml+xml"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("x-inertia", HeaderValue::from_static("true"));
    headers.insert("x-inertia-version", header_value(&session.version)?);
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert("x-xsrf-token", header_value(&session.xsrf_token)?);
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::Protocol(format!("token is not a valid header value: {value:?}")))
}

fn ensure_success(response: Response, error: fn(String) -> Error) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(error(format!("{} returned status {status}", response.url())))
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Protocol(format!("invalid base url {raw:?}: {e}")))
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::Protocol(format!("invalid endpoint {path:?}: {e}")))
}
