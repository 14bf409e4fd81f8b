//! The media-center side of the contract.
//!
//! The controller never renders anything itself: it hands [`ListItem`]s and
//! playback resolutions to a [`Host`], and asks it for localized strings,
//! persisted settings and user input.
use std::collections::BTreeMap;

use serde::Serialize;
use tubelet_common::Msg;

/// Display metadata attached to video entries and playback items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoInfoTag {
    pub title: String,
    pub mediatype: Option<String>,
    pub plot: Option<String>,
    pub credits: Option<String>,
    pub date: Option<String>,
    pub dateadded: Option<String>,
    pub premiered: Option<String>,
    /// Seconds.
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListItem {
    pub label: String,
    pub path: Option<String>,
    pub thumb: Option<String>,
    /// Hosts only hand a resolvable handle to items flagged playable.
    pub playable: bool,
    pub properties: BTreeMap<String, String>,
    pub info: Option<VideoInfoTag>,
}

impl ListItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationIcon {
    Info,
    Warning,
    Error,
}

/// Collaborator calls the controller makes during one invocation.
///
/// `handle` is the opaque request id the host passed in; a negative handle
/// means the host is not waiting for a playback resolution.
pub trait Host {
    fn add_entry(&mut self, handle: i64, url: &str, item: &ListItem, is_folder: bool);

    fn end_of_listing(&mut self, handle: i64);

    fn resolve_playback(&mut self, handle: i64, succeeded: bool, item: &ListItem);

    /// Start playback outside of a pending resolution.
    fn play_direct(&mut self, url: &str, item: &ListItem);

    fn store_setting(&mut self, key: &str, value: &str);

    fn localized(&self, msg: Msg) -> String;

    fn notify(&mut self, title: &str, message: &str, icon: NotificationIcon);

    /// Ask the user for a line of text; `None` when cancelled.
    fn prompt_text(&mut self, heading: &str) -> Option<String>;

    /// Name of an installed helper able to play `manifest_type` streams.
    fn adaptive_helper(&self, manifest_type: &str) -> Option<String>;
}

impl<H: Host + ?Sized> Host for &mut H {
    fn add_entry(&mut self, handle: i64, url: &str, item: &ListItem, is_folder: bool) {
        (**self).add_entry(handle, url, item, is_folder)
    }

    fn end_of_listing(&mut self, handle: i64) {
        (**self).end_of_listing(handle)
    }

    fn resolve_playback(&mut self, handle: i64, succeeded: bool, item: &ListItem) {
        (**self).resolve_playback(handle, succeeded, item)
    }

    fn play_direct(&mut self, url: &str, item: &ListItem) {
        (**self).play_direct(url, item)
    }

    fn store_setting(&mut self, key: &str, value: &str) {
        (**self).store_setting(key, value)
    }

    fn localized(&self, msg: Msg) -> String {
        (**self).localized(msg)
    }

    fn notify(&mut self, title: &str, message: &str, icon: NotificationIcon) {
        (**self).notify(title, message, icon)
    }

    fn prompt_text(&mut self, heading: &str) -> Option<String> {
        (**self).prompt_text(heading)
    }

    fn adaptive_helper(&self, manifest_type: &str) -> Option<String> {
        (**self).adaptive_helper(manifest_type)
    }
}
