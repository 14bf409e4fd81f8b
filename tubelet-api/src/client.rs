//! Invidious API client.
//!
//! Wraps the shared HTTP client with the `api/v1` endpoints Tubelet uses, the
//! cookie session login, and lazy result streams. Cloning is cheap and clones
//! share the session.
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use futures::Stream;
use tokio::sync::OnceCell;
use tubelet_http::{HttpClient, Method, Params, RequestOpts, decode_json};

use crate::error::ApiError;
use crate::parse::{channel_result, parse_list_response};
use crate::result::{ChannelResult, SearchResultItem, VideoResult};
use crate::types::{ChannelItem, SubscriptionEntry, VideoInfo};
use crate::ResultStream;

const API_PREFIX: &str = "api/v1/";
const LOGIN_PATH: &str = "login";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Instance-wide lists served without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedList {
    Popular,
    Trending,
}

impl NamedList {
    pub fn as_str(self) -> &'static str {
        match self {
            NamedList::Popular => "popular",
            NamedList::Trending => "trending",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "popular" => Some(NamedList::Popular),
            "trending" => Some(NamedList::Trending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub instance_url: String,
    pub credentials: Option<Credentials>,
    /// Ask the instance to proxy media (`local=true` on every GET).
    pub local: bool,
    pub timeout: Duration,
    /// Shown for videos the API returns without a description.
    pub no_description: String,
}

impl ApiConfig {
    pub fn new(instance_url: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            credentials: None,
            local: false,
            timeout: tubelet_http::DEFAULT_TIMEOUT,
            no_description: String::new(),
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    credentials: Option<Arc<Credentials>>,
    session: Arc<OnceCell<()>>,
    local: bool,
    no_description: Arc<str>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = HttpClient::new(&config.instance_url)?.with_timeout(config.timeout);
        Ok(Self {
            http,
            credentials: config.credentials.map(Arc::new),
            session: Arc::new(OnceCell::new()),
            local: config.local,
            no_description: config.no_description.into(),
        })
    }

    /// Instance root, always with a trailing slash.
    pub fn instance_url(&self) -> &str {
        self.http.base().as_str()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.initialized()
    }

    // ==============================
    // Session
    // ==============================

    /// Sign in with the configured credentials and keep the session cookie.
    pub async fn login(&self) -> Result<(), ApiError> {
        let creds = self.credentials.as_deref().ok_or(ApiError::AuthRequired)?;
        self.post_login(creds).await?;
        let _ = self.session.set(());
        Ok(())
    }

    /// Log in on first use; later calls reuse the established session.
    async fn ensure_session(&self) -> Result<(), ApiError> {
        let creds = self.credentials.as_deref().ok_or(ApiError::AuthRequired)?;
        self.session
            .get_or_try_init(|| self.post_login(creds))
            .await
            .map(|_| ())
    }

    async fn post_login(&self, creds: &Credentials) -> Result<(), ApiError> {
        tracing::info!(username=%creds.username, "api.login.start");
        let form: Params<'_> = vec![
            ("email", Cow::Borrowed(creds.username.as_str())),
            ("password", Cow::Borrowed(creds.password.as_str())),
            ("action", Cow::Borrowed("signin")),
        ];
        self.http
            .post(
                LOGIN_PATH,
                RequestOpts {
                    form: Some(form),
                    ..Default::default()
                },
            )
            .await
            .inspect_err(|e| tracing::warn!(error=%e, "api.login.failed"))?;
        tracing::info!("api.login.ok");
        Ok(())
    }

    // ==============================
    // Raw requests
    // ==============================

    async fn api_get(&self, path: &str, query: Params<'_>) -> Result<Vec<u8>, ApiError> {
        let mut query = query;
        if self.local {
            query.push(("local", Cow::Borrowed("true")));
        }
        let opts = RequestOpts {
            query: (!query.is_empty()).then_some(query),
            ..Default::default()
        };
        Ok(self.http.get_bytes(&format!("{API_PREFIX}{path}"), opts).await?)
    }

    async fn api_get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.api_get(path, Vec::new()).await?;
        Ok(decode_json(&body)?)
    }

    fn list(&self, path: String, query: Vec<(&'static str, String)>) -> ResultStream<SearchResultItem> {
        Box::pin(list_stream(self.clone(), path, query))
    }

    // ==============================
    // Listings
    // ==============================

    /// Search by upload date, newest first. Terms are joined with single spaces.
    pub fn search<S: AsRef<str>>(&self, terms: &[S]) -> ResultStream<SearchResultItem> {
        let q = terms.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        tracing::debug!(query=%q, "api.search");
        self.list(
            "search".into(),
            vec![("q", q), ("sort_by", "upload_date".into())],
        )
    }

    pub fn fetch_channel_videos(&self, channel_id: &str) -> ResultStream<SearchResultItem> {
        self.list(format!("channels/{channel_id}/videos"), Vec::new())
    }

    pub fn fetch_playlist_videos(&self, playlist_id: &str) -> ResultStream<SearchResultItem> {
        self.list(format!("playlists/{playlist_id}"), Vec::new())
    }

    pub fn fetch_named_list(&self, list: NamedList) -> ResultStream<SearchResultItem> {
        self.list(list.as_str().into(), Vec::new())
    }

    /// Videos of the signed-in user's subscriptions. Logs in on demand.
    pub fn fetch_feed(&self) -> ResultStream<VideoResult> {
        Box::pin(feed_stream(self.clone()))
    }

    /// Subscribed channels, one detail request per channel. Logs in on demand.
    pub fn fetch_subscriptions(&self) -> ResultStream<ChannelResult> {
        Box::pin(subscriptions_stream(self.clone()))
    }

    // ==============================
    // Single records
    // ==============================

    pub async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo, ApiError> {
        self.api_get_json(&format!("videos/{video_id}")).await
    }

    pub async fn fetch_channel_info(&self, channel_id: &str) -> Result<ChannelResult, ApiError> {
        let item: ChannelItem = self.api_get_json(&format!("channels/{channel_id}")).await?;
        Ok(channel_result(item))
    }

    // ==============================
    // Mutations
    // ==============================

    pub async fn subscribe(&self, channel_id: &str) -> Result<(), ApiError> {
        self.mutate(Method::POST, &format!("auth/subscriptions/{channel_id}"))
            .await
    }

    pub async fn unsubscribe(&self, channel_id: &str) -> Result<(), ApiError> {
        self.mutate(Method::DELETE, &format!("auth/subscriptions/{channel_id}"))
            .await
    }

    pub async fn mark_watched(&self, video_id: &str) -> Result<(), ApiError> {
        self.mutate(Method::POST, &format!("auth/history/{video_id}"))
            .await
    }

    async fn mutate(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.ensure_session().await?;
        tracing::debug!(method=%method, path=%path, "api.mutate");
        self.http
            .send(method, &format!("{API_PREFIX}{path}"), RequestOpts::default())
            .await
            .map(|_| ())
            .map_err(|e| ApiError::from(e).into_request_failed())
    }
}

fn list_stream(
    client: ApiClient,
    path: String,
    query: Vec<(&'static str, String)>,
) -> impl Stream<Item = Result<SearchResultItem, ApiError>> + Send + 'static {
    try_stream! {
        let params: Params<'_> = query.iter().map(|(k, v)| (*k, Cow::Borrowed(v.as_str()))).collect();
        let body = client.api_get(&path, params).await?;
        for item in parse_list_response(&body, &client.no_description)? {
            yield item?;
        }
    }
}

fn feed_stream(client: ApiClient) -> impl Stream<Item = Result<VideoResult, ApiError>> + Send + 'static {
    try_stream! {
        client.ensure_session().await?;
        let body = client.api_get("auth/feed", Vec::new()).await?;
        for item in parse_list_response(&body, &client.no_description)? {
            match item? {
                SearchResultItem::Video(v) => yield v,
                other => tracing::debug!(kind=%other.kind(), id=%other.id(), "api.feed.skip_non_video"),
            }
        }
    }
}

fn subscriptions_stream(
    client: ApiClient,
) -> impl Stream<Item = Result<ChannelResult, ApiError>> + Send + 'static {
    try_stream! {
        client.ensure_session().await?;
        let subs: Vec<SubscriptionEntry> = client.api_get_json("auth/subscriptions").await?;
        tracing::debug!(count = subs.len(), "api.subscriptions");
        for sub in subs {
            yield client.fetch_channel_info(&sub.author_id).await?;
        }
    }
}
