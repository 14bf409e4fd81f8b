//! Minimal HTTP client with a cookie-backed session and safe logging.
//!
//! - Request options: headers, query params, form body, timeout
//! - One fixed timeout per client (5 s unless overridden); timeouts surface as
//!   [`HttpError::Timeout`], non-2xx responses as [`HttpError::Status`]
//! - Cookies set by the server (e.g. a login session) are replayed on every
//!   later request made through the same client
//! - Redacts secret query/form fields and never logs their values
//! - Optional *raw* request/response logging via `TUBELET_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), tubelet_http::HttpError> {
//! let client = tubelet_http::HttpClient::new("https://invidious.example.org")?;
//! let got: serde_json::Value = client
//!     .get_json("api/v1/trending", tubelet_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

pub use reqwest::{Method, StatusCode};

/// Timeout applied to every request unless the client or request overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "TUBELET_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password"
            | "passwd"
            | "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "cookie"
    )
}

fn redact_pairs(pairs: Option<&Params<'_>>) -> Vec<(String, String)> {
    pairs
        .map(|q| {
            q.iter()
                .map(|(k, v)| {
                    let v = if is_secret_key(k) {
                        "<redacted>".to_string()
                    } else {
                        v.to_string()
                    };
                    ((*k).to_string(), v)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, opts: &RequestOpts<'_>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    if let Some(headers) = &opts.headers {
        for (name, val) in headers.iter() {
            let v = if is_secret_key(name.as_str()) {
                "<redacted>"
            } else {
                val.to_str().unwrap_or("")
            };
            parts.push(format!("-H '{}: {}'", name.as_str(), v.replace('\'', r"'\''")));
        }
    }
    for (k, v) in redact_pairs(opts.form.as_ref()) {
        parts.push(format!("--data-urlencode '{}={}'", k, v.replace('\'', r"'\''")));
    }
    let mut shown = url.clone();
    if opts.query.is_some() {
        let mut q = shown.query_pairs_mut();
        for (k, v) in redact_pairs(opts.query.as_ref()) {
            q.append_pair(&k, &v);
        }
    }
    parts.push(format!("'{}'", shown.as_str()));
    parts.join(" ")
}

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> String {
    format!("r{}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed))
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned {status} {reason}: {message}")]
    Status {
        status: StatusCode,
        reason: String,
        message: String,
    },
}

impl HttpError {
    /// HTTP status for [`HttpError::Status`], `None` for transport failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout(_))
    }
}

// ==============================
// Request Options
// ==============================

/// Ordered key/value pairs for query strings and form bodies.
pub type Params<'a> = Vec<(&'a str, Cow<'a, str>)>;

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use tubelet_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(2)),
///     query: Some(vec![("q", "cats".into())]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 2);
/// assert!(opts.form.is_none());
/// assert!(!opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Params<'a>>,
    /// Sent as `application/x-www-form-urlencoded`.
    pub form: Option<Params<'a>>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// A trailing slash is enforced so that relative paths resolve *below*
    /// the base even when it carries a path prefix.
    ///
    /// ```no_run
    /// use tubelet_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://invidious.example.org/sub")?;
    /// assert_eq!(client.base().as_str(), "https://invidious.example.org/sub/");
    /// assert_eq!(client.default_timeout, Duration::from_secs(5));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = format!("{}/", base.trim_end_matches('/'));
        let base = Url::parse(&base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.send(Method::GET, path, opts).await?;
        decode_json(&bytes)
    }

    /// GET returning the raw body; an empty body is not an error.
    pub async fn get_bytes(&self, path: &str, opts: RequestOpts<'_>) -> Result<Vec<u8>, HttpError> {
        self.send(Method::GET, path, opts).await
    }

    pub async fn post(&self, path: &str, opts: RequestOpts<'_>) -> Result<Vec<u8>, HttpError> {
        self.send(Method::POST, path, opts).await
    }

    pub async fn delete(&self, path: &str, opts: RequestOpts<'_>) -> Result<Vec<u8>, HttpError> {
        self.send(Method::DELETE, path, opts).await
    }

    // ==============================
    // Core request implementation
    // ==============================

    /// Send one request and return the body of a 2xx response.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<Vec<u8>, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let req_id = next_request_id();

        let mut rb = self.inner.request(method.clone(), url.clone()).timeout(timeout);
        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }
        if let Some(f) = &opts.form {
            let pairs: Vec<(&str, &str)> = f.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.form(&pairs);
        }
        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?redact_pairs(opts.query.as_ref()),
            form=?redact_pairs(opts.form.as_ref()),
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&method, &url, &opts);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|e| transport_error(&req_id, e, timeout))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| transport_error(&req_id, e, timeout))?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            "http.response"
        );
        if raw_enabled() {
            let mut body = String::from_utf8_lossy(&bytes).into_owned();
            let truncated = body.len() > RAW_MAX_BODY;
            if truncated {
                body = truncate_on_char(body, RAW_MAX_BODY);
            }
            tracing::debug!(target: "http.raw", %req_id, %status, %body, truncated, "response");
        }

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let message = extract_error_message(&bytes);
        let reason = status.canonical_reason().unwrap_or("").to_string();
        tracing::warn!(
            req_id=%req_id,
            %status,
            reason=%reason,
            message=%message,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            "http.error"
        );
        Err(HttpError::Status {
            status,
            reason,
            message,
        })
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))
    }
}

// ==============================
// Helpers
// ==============================

/// Decode a JSON body, logging a snippet when it does not match `T`.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, HttpError> {
    serde_json::from_slice::<T>(bytes).map_err(|e| {
        let snippet = snip_body(bytes);
        tracing::warn!(
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e,
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn transport_error(req_id: &str, err: reqwest::Error, timeout: Duration) -> HttpError {
    if err.is_timeout() {
        tracing::warn!(req_id=%req_id, timeout_ms=timeout.as_millis() as u64, "http.timeout");
        return HttpError::Timeout(timeout);
    }
    let message = err.to_string();
    tracing::warn!(req_id=%req_id, message=%message, "http.network_error");
    HttpError::Network(message)
}

/// Invidious reports failures as `{"error": "..."}`; anything else is shown as a snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        error: String,
        #[serde(default)]
        message: String,
    }

    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.error.is_empty() {
            return m.error;
        }
        if !m.message.is_empty() {
            return m.message;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let snip = String::from_utf8_lossy(body).into_owned();
    if snip.len() > 500 {
        let mut s = truncate_on_char(snip, 500);
        s.push_str("...");
        s
    } else {
        snip
    }
}

fn truncate_on_char(mut s: String, max: usize) -> String {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gets_trailing_slash_and_paths_resolve_below_it() {
        let c = HttpClient::new("https://yt.example.org/inv//").unwrap();
        assert_eq!(c.base().as_str(), "https://yt.example.org/inv/");
        let u = c.resolve("/api/v1/search", false).unwrap();
        assert_eq!(u.as_str(), "https://yt.example.org/inv/api/v1/search");
    }

    #[test]
    fn absolute_paths_only_when_allowed() {
        let c = HttpClient::new("https://yt.example.org").unwrap();
        let u = c.resolve("https://other.example.org/x", true).unwrap();
        assert_eq!(u.host_str(), Some("other.example.org"));
    }

    #[test]
    fn secrets_are_redacted() {
        let form: Params<'_> = vec![("email", "me".into()), ("password", "hunter2".into())];
        let red = redact_pairs(Some(&form));
        assert_eq!(red[0], ("email".to_string(), "me".to_string()));
        assert_eq!(red[1].1, "<redacted>");

        let opts = RequestOpts {
            form: Some(form),
            ..Default::default()
        };
        let url = Url::parse("https://yt.example.org/login").unwrap();
        let curl = make_curl(&Method::POST, &url, &opts);
        assert!(!curl.contains("hunter2"));
        assert!(curl.contains("password=<redacted>"));
    }

    #[test]
    fn error_message_prefers_invidious_error_field() {
        assert_eq!(extract_error_message(br#"{"error":"Video unavailable"}"#), "Video unavailable");
        assert_eq!(extract_error_message(b"plain text"), "plain text");
    }

    #[test]
    fn snippets_respect_char_boundaries() {
        let long = "é".repeat(400);
        let s = snip_body(long.as_bytes());
        assert!(s.ends_with("..."));
        assert!(s.len() <= 503);
    }
}
