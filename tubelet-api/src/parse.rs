//! Normalization of list-style responses into [`SearchResultItem`]s.
//!
//! Every item is tagged first ([`ItemKind::of`]) and only then deserialized
//! into the wire shape of that kind. Untagged items are videos: playlist
//! detail responses embed their entries without a `type` field, and those
//! entries are always videos.
use serde_json::Value;

use crate::error::ApiError;
use crate::result::{ChannelResult, PlaylistResult, SearchResultItem, VideoResult};
use crate::types::{ChannelItem, PlaylistItem, Thumbnail, VideoItem};

/// Thumbnail quality preferred for videos (about 480x360).
pub const PREFERRED_VIDEO_QUALITY: &str = "high";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Video,
    Channel,
    Playlist,
    Unknown(String),
}

impl ItemKind {
    pub fn of(item: &Value) -> Self {
        match item.get("type") {
            None => ItemKind::Video,
            Some(Value::String(t)) => match t.as_str() {
                "video" | "shortVideo" => ItemKind::Video,
                "channel" => ItemKind::Channel,
                "playlist" => ItemKind::Playlist,
                other => ItemKind::Unknown(other.to_string()),
            },
            Some(other) => ItemKind::Unknown(other.to_string()),
        }
    }
}

/// Split a response body into its items.
///
/// Accepts a bare array or an object carrying a `videos` array (channel,
/// playlist and feed endpoints). An empty body has no items.
pub fn list_items(body: &[u8]) -> Result<Vec<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Value>(body)? {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("videos") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::Decode(
                "expected an array or an object with a `videos` array".into(),
            )),
        },
        other => Err(ApiError::Decode(format!(
            "expected a list response, got {}",
            json_type(&other)
        ))),
    }
}

/// Parse a list response lazily.
///
/// The iterator skips videos without a positive duration and items of an
/// unknown kind (logged as warnings). A malformed item of a known kind yields
/// an `Err`.
pub fn parse_list_response(body: &[u8], no_description: &str) -> Result<ParsedItems, ApiError> {
    Ok(ParsedItems {
        items: list_items(body)?.into_iter(),
        no_description: no_description.to_string(),
    })
}

pub struct ParsedItems {
    items: std::vec::IntoIter<Value>,
    no_description: String,
}

impl Iterator for ParsedItems {
    type Item = Result<SearchResultItem, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.items.by_ref() {
            match parse_item(item, &self.no_description) {
                Ok(Some(parsed)) => return Some(Ok(parsed)),
                Ok(None) => continue,
                Err(ApiError::UnknownResultType(kind)) => {
                    tracing::warn!(kind=%kind, "api.parse.unknown_type");
                }
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Parse one item. `Ok(None)` means the item was filtered out.
pub fn parse_item(item: Value, no_description: &str) -> Result<Option<SearchResultItem>, ApiError> {
    match ItemKind::of(&item) {
        ItemKind::Video => {
            let video: VideoItem = serde_json::from_value(item)?;
            Ok(video_result(video, no_description).map(SearchResultItem::Video))
        }
        ItemKind::Channel => {
            let channel: ChannelItem = serde_json::from_value(item)?;
            Ok(Some(SearchResultItem::Channel(channel_result(channel))))
        }
        ItemKind::Playlist => {
            let playlist: PlaylistItem = serde_json::from_value(item)?;
            Ok(Some(SearchResultItem::Playlist(playlist_result(playlist))))
        }
        ItemKind::Unknown(kind) => Err(ApiError::UnknownResultType(kind)),
    }
}

pub fn video_result(item: VideoItem, no_description: &str) -> Option<VideoResult> {
    if item.length_seconds <= 0 {
        tracing::debug!(video_id=%item.video_id, length=item.length_seconds, "api.parse.skip_no_duration");
        return None;
    }
    let thumbnail_url = select_video_thumbnail(&item.video_thumbnails)
        .unwrap_or_default()
        .to_string();
    Some(VideoResult {
        id: item.video_id,
        thumbnail_url,
        heading: item.title,
        author: item.author,
        description: item
            .description
            .unwrap_or_else(|| no_description.to_string()),
        view_count: item.view_count.unwrap_or(-1),
        published: item.published.unwrap_or(0),
        duration: item.length_seconds,
    })
}

pub fn channel_result(item: ChannelItem) -> ChannelResult {
    let thumbnail_url = select_channel_avatar(&item.author_thumbnails)
        .map(normalize_protocol_relative)
        .unwrap_or_default();
    ChannelResult {
        id: item.author_id,
        thumbnail_url,
        heading: item.author,
        description: item.description,
        verified: item.author_verified,
        sub_count: item.sub_count,
    }
}

pub fn playlist_result(item: PlaylistItem) -> PlaylistResult {
    PlaylistResult {
        id: item.playlist_id,
        thumbnail_url: item.playlist_thumbnail,
        heading: item.title,
        channel_name: item.author,
        channel_id: item.author_id,
        verified: item.author_verified,
        video_count: item.video_count,
    }
}

/// The `high` quality thumbnail, else the last one listed (usually the smallest).
pub fn select_video_thumbnail(thumbs: &[Thumbnail]) -> Option<&str> {
    thumbs
        .iter()
        .find(|t| t.quality.as_deref() == Some(PREFERRED_VIDEO_QUALITY))
        .or_else(|| thumbs.last())
        .map(|t| t.url.as_str())
}

/// The tallest avatar; the first one wins among equal heights.
pub fn select_channel_avatar(thumbs: &[Thumbnail]) -> Option<&str> {
    let mut best: Option<&Thumbnail> = None;
    for t in thumbs {
        let taller = best.is_none_or(|b| t.height.unwrap_or(0) > b.height.unwrap_or(0));
        if taller {
            best = Some(t);
        }
    }
    best.map(|t| t.url.as_str())
}

/// `//host/path` becomes `https://host/path`; other URLs are returned unchanged.
pub fn normalize_protocol_relative(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
