//! Wire shapes returned by the Invidious `api/v1` endpoints.
//!
//! Only the fields Tubelet reads are modelled; everything else in the JSON is
//! ignored. Fields that some endpoints omit (playlist-embedded videos have no
//! `viewCount`/`published`/`description`) are `Option`s or `#[serde(default)]`.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    #[serde(default)]
    pub quality: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// `type: "video" | "shortVideo"` entries, and untyped playlist entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_count: Option<i64>,
    #[serde(default)]
    pub published: Option<i64>,
    pub length_seconds: i64,
    #[serde(default)]
    pub video_thumbnails: Vec<Thumbnail>,
}

/// `type: "channel"` search entries and the `channels/{id}` detail object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub author_id: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author_verified: bool,
    #[serde(default)]
    pub sub_count: i64,
    #[serde(default)]
    pub author_thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub playlist_id: String,
    pub title: String,
    #[serde(default)]
    pub playlist_thumbnail: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_verified: bool,
    #[serde(default)]
    pub video_count: i64,
}

/// Entry of `auth/subscriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionEntry {
    #[serde(default)]
    pub author: String,
    pub author_id: String,
}

/// Full metadata of `videos/{id}`, used for playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published: i64,
    #[serde(default)]
    pub length_seconds: i64,
    /// Adaptive (MPEG-DASH) manifest, when the instance offers one.
    #[serde(default)]
    pub dash_url: Option<String>,
    /// Legacy muxed streams, roughly ordered by ascending quality.
    #[serde(default)]
    pub format_streams: Vec<FormatStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatStream {
    pub url: String,
    #[serde(default)]
    pub itag: Option<String>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub quality_label: Option<String>,
}
