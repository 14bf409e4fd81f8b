//! Normalized result records handed to the navigation layer.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoResult {
    pub id: String,
    pub thumbnail_url: String,
    pub heading: String,
    pub author: String,
    pub description: String,
    /// `-1` when the endpoint does not report views.
    pub view_count: i64,
    /// Unix seconds, `0` when unknown.
    pub published: i64,
    /// Always positive; shorter items are dropped while parsing.
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelResult {
    pub id: String,
    pub thumbnail_url: String,
    pub heading: String,
    pub description: String,
    pub verified: bool,
    pub sub_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistResult {
    pub id: String,
    pub thumbnail_url: String,
    pub heading: String,
    pub channel_name: String,
    pub channel_id: String,
    pub verified: bool,
    pub video_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Video,
    Channel,
    Playlist,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResultKind::Video => "video",
            ResultKind::Channel => "channel",
            ResultKind::Playlist => "playlist",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchResultItem {
    Video(VideoResult),
    Channel(ChannelResult),
    Playlist(PlaylistResult),
}

impl SearchResultItem {
    pub fn kind(&self) -> ResultKind {
        match self {
            SearchResultItem::Video(_) => ResultKind::Video,
            SearchResultItem::Channel(_) => ResultKind::Channel,
            SearchResultItem::Playlist(_) => ResultKind::Playlist,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SearchResultItem::Video(v) => &v.id,
            SearchResultItem::Channel(c) => &c.id,
            SearchResultItem::Playlist(p) => &p.id,
        }
    }

    pub fn heading(&self) -> &str {
        match self {
            SearchResultItem::Video(v) => &v.heading,
            SearchResultItem::Channel(c) => &c.heading,
            SearchResultItem::Playlist(p) => &p.heading,
        }
    }

    pub fn thumbnail_url(&self) -> &str {
        match self {
            SearchResultItem::Video(v) => &v.thumbnail_url,
            SearchResultItem::Channel(c) => &c.thumbnail_url,
            SearchResultItem::Playlist(p) => &p.thumbnail_url,
        }
    }
}

impl From<VideoResult> for SearchResultItem {
    fn from(v: VideoResult) -> Self {
        SearchResultItem::Video(v)
    }
}

impl From<ChannelResult> for SearchResultItem {
    fn from(c: ChannelResult) -> Self {
        SearchResultItem::Channel(c)
    }
}

impl From<PlaylistResult> for SearchResultItem {
    fn from(p: PlaylistResult) -> Self {
        SearchResultItem::Playlist(p)
    }
}
