//! Stream selection for `play_video`.
use tubelet_api::VideoInfo;

use crate::error::NavError;
use crate::host::ListItem;
use crate::render::video_info_tag;

pub const DASH_MANIFEST_TYPE: &str = "mpd";

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackTarget {
    pub url: String,
    pub item: ListItem,
    pub dash: bool,
}

/// Choose the stream for `info`.
///
/// `dash_helper` is the adaptive helper the host offers, already `None` when
/// DASH is disabled. Without a usable manifest the last legacy stream is used;
/// the instance lists those in ascending quality.
pub fn select_stream(
    video_id: &str,
    info: &VideoInfo,
    dash_helper: Option<&str>,
) -> Result<PlaybackTarget, NavError> {
    let manifest = info.dash_url.as_deref().filter(|u| !u.is_empty());

    let (url, mut item, dash) = match (manifest, dash_helper) {
        (Some(url), Some(helper)) => {
            tracing::debug!(url, helper, "nav.playback.dash");
            let item = ListItem::new(&info.title)
                .with_path(url)
                .with_property("inputstream", helper)
                .with_property("inputstream.adaptive.manifest_type", DASH_MANIFEST_TYPE);
            (url.to_string(), item, true)
        }
        _ => {
            let stream = info
                .format_streams
                .last()
                .ok_or_else(|| NavError::NoPlayableStream(video_id.to_string()))?;
            tracing::info!(url=%stream.url, "nav.playback.fallback_stream");
            let item = ListItem::new(&info.title).with_path(&stream.url);
            (stream.url.clone(), item, false)
        }
    };

    item.playable = true;
    item.info = Some(video_info_tag(
        &info.title,
        &info.description,
        &info.author,
        info.published,
        info.length_seconds,
    ));
    Ok(PlaybackTarget { url, item, dash })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubelet_api::types::FormatStream;

    fn info(dash: Option<&str>, streams: &[&str]) -> VideoInfo {
        VideoInfo {
            title: "T".into(),
            author: "A".into(),
            description: "D".into(),
            published: 1_600_000_000,
            length_seconds: 120,
            dash_url: dash.map(str::to_string),
            format_streams: streams
                .iter()
                .map(|u| FormatStream {
                    url: u.to_string(),
                    itag: None,
                    mime_type: None,
                    quality_label: None,
                })
                .collect(),
        }
    }

    #[test]
    fn manifest_with_helper_is_tagged_as_dash() {
        let target = select_stream(
            "v",
            &info(Some("https://inv/api/manifest/dash/id/v"), &["https://cdn/360.mp4"]),
            Some("inputstream.adaptive"),
        )
        .unwrap();
        assert!(target.dash);
        assert_eq!(target.url, "https://inv/api/manifest/dash/id/v");
        assert_eq!(target.item.properties["inputstream"], "inputstream.adaptive");
        assert_eq!(target.item.properties["inputstream.adaptive.manifest_type"], "mpd");
    }

    #[test]
    fn falls_back_to_last_legacy_stream() {
        let streams = ["https://cdn/360.mp4", "https://cdn/720.mp4"];

        let no_manifest = select_stream("v", &info(None, &streams), Some("helper")).unwrap();
        assert!(!no_manifest.dash);
        assert_eq!(no_manifest.url, "https://cdn/720.mp4");
        assert!(no_manifest.item.properties.is_empty());

        let no_helper = select_stream("v", &info(Some("https://m"), &streams), None).unwrap();
        assert_eq!(no_helper.url, "https://cdn/720.mp4");
    }

    #[test]
    fn metadata_dates_share_one_timestamp() {
        let target = select_stream("v", &info(None, &["https://cdn/a.mp4"]), None).unwrap();
        let tag = target.item.info.unwrap();
        assert_eq!(tag.date, tag.dateadded);
        assert_eq!(tag.date, tag.premiered);
        assert_eq!(tag.duration, Some(120));
        assert_eq!(tag.plot.as_deref(), Some("D"));
    }

    #[test]
    fn nothing_to_play_is_an_error() {
        assert!(matches!(
            select_stream("gone", &info(None, &[]), Some("helper")),
            Err(NavError::NoPlayableStream(id)) if id == "gone"
        ));
    }
}
