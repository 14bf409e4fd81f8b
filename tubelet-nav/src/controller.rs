//! One invocation: initialize, dispatch one action, report through the host.
use futures::StreamExt;
use tubelet_api::{
    ApiClient, ApiConfig, ApiError, Credentials, NamedList, ResultStream, SearchResultItem,
};
use tubelet_common::Msg;
use tubelet_config::Settings;

use crate::action::Action;
use crate::autodetect::instance_autodetect;
use crate::error::NavError;
use crate::history::SearchHistory;
use crate::host::{Host, ListItem, NotificationIcon};
use crate::playback::{DASH_MANIFEST_TYPE, PlaybackTarget, select_stream};
use crate::render::{Entry, entry_for, folder};

/// Settings key the detected instance is stored under.
pub const INSTANCE_URL_KEY: &str = "instance_url";

#[derive(Debug, Clone, Copy)]
struct Features {
    disable_dash: bool,
    show_trending: bool,
    show_popular: bool,
    mark_watched: bool,
}

pub struct Navigator<H: Host> {
    base_url: String,
    handle: i64,
    host: H,
    api: ApiClient,
    history: SearchHistory,
    features: Features,
}

impl<H: Host> Navigator<H> {
    /// Resolve the instance (auto-detecting it when allowed) and build the client.
    pub async fn init(
        settings: &Settings,
        base_url: impl Into<String>,
        handle: i64,
        mut host: H,
    ) -> Result<Self, NavError> {
        let (instance_url, credentials) = match settings.instance_url() {
            None if settings.auto_instance => {
                let timeout = settings.request_timeout();
                match instance_autodetect(&settings.instance_directory_url, timeout).await {
                    Ok(url) => {
                        host.store_setting(INSTANCE_URL_KEY, &url);
                        (url, None)
                    }
                    Err(e) => {
                        let title = host.localized(Msg::AutodetectFailedTitle);
                        let message = host.localized(Msg::AutodetectFailedMessage);
                        host.notify(&title, &message, NotificationIcon::Error);
                        return Err(e);
                    }
                }
            }
            None => return Err(NavError::NoServerConfigured),
            Some(url) => {
                // Public instances picked automatically never see credentials.
                let credentials = settings
                    .username()
                    .filter(|_| !settings.auto_instance)
                    .map(|username| Credentials {
                        username: username.to_string(),
                        password: settings.password().to_string(),
                    });
                (url.to_string(), credentials)
            }
        };

        tracing::info!(instance=%instance_url, authenticated = credentials.is_some(), "nav.init");
        let api = ApiClient::new(
            ApiConfig {
                local: settings.local,
                timeout: settings.request_timeout(),
                no_description: host.localized(Msg::NoDescription),
                ..ApiConfig::new(instance_url)
            }
            .with_credentials(credentials),
        )?;
        let history = SearchHistory::in_profile(&settings.profile_dir(), settings.history_depth)?;

        Ok(Self {
            base_url: base_url.into(),
            handle,
            host,
            api,
            history,
            features: Features {
                disable_dash: settings.disable_dash,
                show_trending: settings.show_instance_trending,
                show_popular: settings.show_instance_popular,
                mark_watched: settings.mark_items_watched,
            },
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Parse the host's query string and run the action it names.
    pub async fn handle_query(&mut self, query: &str) -> Result<(), NavError> {
        let action = Action::parse(query)?;
        self.run(action).await
    }

    /// Run `action`; timeouts and HTTP status errors become a notification.
    pub async fn run(&mut self, action: Action) -> Result<(), NavError> {
        tracing::debug!(
            base_url=%self.base_url,
            handle = self.handle,
            action=?action,
            "nav.dispatch"
        );
        match self.dispatch(action).await {
            Err(NavError::Api(ApiError::Timeout)) => {
                tracing::warn!("nav.action.timeout");
                let message = self.host.localized(Msg::TimeoutMessage);
                self.notify_error(Msg::TimeoutTitle, message);
                Ok(())
            }
            Err(NavError::Api(e)) if e.is_http_status() => {
                let status = e.status().unwrap_or_default();
                tracing::warn!(status, error=%e, "nav.action.http_status");
                let message = format!("{}{status}", self.host.localized(Msg::HttpErrorMessage));
                self.notify_error(Msg::HttpErrorTitle, message);
                Ok(())
            }
            other => other,
        }
    }

    fn notify_error(&mut self, title: Msg, message: String) {
        let title = self.host.localized(title);
        self.host.notify(&title, &message, NotificationIcon::Error);
    }

    async fn dispatch(&mut self, action: Action) -> Result<(), NavError> {
        match action {
            Action::RootMenu => self.root_menu(),
            Action::SearchMenu => self.search_menu(),
            Action::NewSearch => self.new_search().await,
            Action::Search { query } => self.search(&query).await,
            Action::PlayVideo { video_id } => self.play_video(&video_id).await,
            Action::ViewChannel { channel_id } => {
                let results = self.api.fetch_channel_videos(&channel_id);
                self.render(results).await
            }
            Action::ViewPlaylist { playlist_id } => {
                let results = self.api.fetch_playlist_videos(&playlist_id);
                self.render(results).await
            }
            Action::UserFeed => {
                let results = self.api.fetch_feed();
                self.render(results).await
            }
            Action::UserSubscriptions => {
                let results = self.api.fetch_subscriptions();
                self.render(results).await
            }
            Action::Named(list) => {
                let results = self.api.fetch_named_list(list);
                self.render(results).await
            }
        }
    }

    // ==============================
    // Menus
    // ==============================

    fn add(&mut self, entry: Entry) {
        self.host
            .add_entry(self.handle, &entry.url, &entry.item, entry.is_folder);
    }

    fn root_menu(&mut self) -> Result<(), NavError> {
        let mut items = vec![(Msg::Search, Action::SearchMenu)];
        if self.api.has_credentials() {
            items.push((Msg::Feed, Action::UserFeed));
            items.push((Msg::Subscriptions, Action::UserSubscriptions));
        }
        if self.features.show_popular {
            items.push((Msg::Popular, Action::Named(NamedList::Popular)));
        }
        if self.features.show_trending {
            items.push((Msg::Trending, Action::Named(NamedList::Trending)));
        }

        for (label, action) in items {
            let entry = folder(&self.base_url, &self.host.localized(label), &action);
            self.add(entry);
        }
        self.host.end_of_listing(self.handle);
        Ok(())
    }

    fn search_menu(&mut self) -> Result<(), NavError> {
        let entry = folder(
            &self.base_url,
            &self.host.localized(Msg::NewSearch),
            &Action::NewSearch,
        );
        self.add(entry);

        for query in self.history.queries()? {
            let url = Action::Search {
                query: query.clone(),
            }
            .url(&self.base_url);
            let item = ListItem::new(&query).with_path(&query);
            self.add(Entry {
                url,
                item,
                is_folder: true,
            });
        }
        self.host.end_of_listing(self.handle);
        Ok(())
    }

    // ==============================
    // Listings
    // ==============================

    async fn new_search(&mut self) -> Result<(), NavError> {
        let heading = self.host.localized(Msg::Search);
        let Some(query) = self.host.prompt_text(&heading) else {
            tracing::debug!("nav.search.cancelled");
            return Ok(());
        };
        if query.is_empty() {
            return Ok(());
        }
        self.history.push(&query)?;
        self.search(&query).await
    }

    async fn search(&mut self, query: &str) -> Result<(), NavError> {
        if query.is_empty() {
            return Ok(());
        }
        tracing::debug!(query, "nav.search");
        let results = self.api.search(&[query]);
        self.render(results).await
    }

    /// Add one entry per result; the listing ends only if the stream completes.
    async fn render<T>(&mut self, mut results: ResultStream<T>) -> Result<(), NavError>
    where
        T: Into<SearchResultItem> + 'static,
    {
        let mut count = 0usize;
        while let Some(result) = results.next().await {
            let entry = entry_for(&self.base_url, &result?.into());
            self.add(entry);
            count += 1;
        }
        tracing::debug!(count, "nav.listing.done");
        self.host.end_of_listing(self.handle);
        Ok(())
    }

    // ==============================
    // Playback
    // ==============================

    async fn play_video(&mut self, video_id: &str) -> Result<(), NavError> {
        let resolved = self.resolve(video_id).await;
        if resolved.is_err() && self.handle >= 0 {
            self.host
                .resolve_playback(self.handle, false, &ListItem::default());
        }
        let target = resolved?;

        if self.features.mark_watched && self.api.has_credentials() {
            if let Err(e) = self.api.mark_watched(video_id).await {
                tracing::error!(video_id, error=%e, "nav.playback.mark_watched_failed");
            }
        }

        if self.handle >= 0 {
            self.host.resolve_playback(self.handle, true, &target.item);
        } else {
            self.host.play_direct(&target.url, &target.item);
        }
        Ok(())
    }

    async fn resolve(&self, video_id: &str) -> Result<PlaybackTarget, NavError> {
        let info = self.api.fetch_video_info(video_id).await?;
        let helper = if !self.features.disable_dash && info.dash_url.is_some() {
            let helper = self.host.adaptive_helper(DASH_MANIFEST_TYPE);
            if helper.is_none() {
                tracing::debug!("nav.playback.no_adaptive_helper");
            }
            helper
        } else {
            None
        };
        select_stream(video_id, &info, helper.as_deref())
    }
}
