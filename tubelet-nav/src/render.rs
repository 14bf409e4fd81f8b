//! Projection of API results into host list entries.
use chrono::DateTime;
use tubelet_api::SearchResultItem;

use crate::action::Action;
use crate::host::{ListItem, VideoInfoTag};

/// One host directory entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub url: String,
    pub item: ListItem,
    pub is_folder: bool,
}

/// `YYYY-MM-DD` (UTC) of a unix timestamp; empty when out of range.
pub fn iso_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_default()
}

/// Info tag shared by listing entries and playback items.
pub fn video_info_tag(
    title: &str,
    plot: &str,
    credits: &str,
    published: i64,
    duration: i64,
) -> VideoInfoTag {
    let date = iso_date(published);
    VideoInfoTag {
        title: title.to_string(),
        mediatype: Some("video".into()),
        plot: Some(plot.to_string()),
        credits: Some(credits.to_string()),
        date: Some(date.clone()),
        dateadded: Some(date.clone()),
        premiered: Some(date),
        duration: Some(duration),
    }
}

pub fn entry_for(base_url: &str, result: &SearchResultItem) -> Entry {
    let mut item = ListItem::new(result.heading());
    item.thumb = Some(result.thumbnail_url().to_string());
    // Hosts hand out an invalid handle for items without the flag.
    item.playable = true;

    match result {
        SearchResultItem::Video(v) => {
            item.info = Some(video_info_tag(
                &v.heading,
                &v.description,
                &v.author,
                v.published,
                v.duration,
            ));
            Entry {
                url: Action::PlayVideo {
                    video_id: v.id.clone(),
                }
                .url(base_url),
                item,
                is_folder: false,
            }
        }
        SearchResultItem::Channel(c) => {
            item.info = Some(VideoInfoTag {
                title: c.heading.clone(),
                plot: Some(c.description.clone()),
                ..Default::default()
            });
            Entry {
                url: Action::ViewChannel {
                    channel_id: c.id.clone(),
                }
                .url(base_url),
                item,
                is_folder: true,
            }
        }
        SearchResultItem::Playlist(p) => Entry {
            url: Action::ViewPlaylist {
                playlist_id: p.id.clone(),
            }
            .url(base_url),
            item,
            is_folder: true,
        },
    }
}

/// Plain folder entry used by the root and search menus.
pub fn folder(base_url: &str, label: &str, action: &Action) -> Entry {
    let url = action.url(base_url);
    Entry {
        item: ListItem::new(label).with_path(action.name().unwrap_or_default()),
        url,
        is_folder: true,
    }
}
