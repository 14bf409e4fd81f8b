#![allow(dead_code)]

use std::path::Path;
use std::sync::OnceLock;

use serde_json::{Value, json};
use tubelet_common::Msg;
use tubelet_common::observability::{LogConfig, LogFormat};
use tubelet_config::Settings;
use tubelet_nav::{Host, ListItem, NotificationIcon};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub const BASE: &str = "plugin://plugin.video.tubelet/";

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "tubelet-nav-tests",
            emit_stderr: true,
            format: LogFormat::from_env(),
            default_filter: "debug",
            ..LogConfig::default()
        };

        tubelet_common::observability::init_logging(config).unwrap_or_default()
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddedEntry {
    pub handle: i64,
    pub url: String,
    pub item: ListItem,
    pub is_folder: bool,
}

/// Host that records every collaborator call.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub entries: Vec<AddedEntry>,
    pub ended: Vec<i64>,
    pub resolved: Vec<(i64, bool, ListItem)>,
    pub direct: Vec<(String, ListItem)>,
    pub stored: Vec<(String, String)>,
    pub notifications: Vec<(String, String, NotificationIcon)>,
    pub prompts: Vec<String>,
    pub prompt_answer: Option<String>,
    pub helper: Option<String>,
}

impl RecordingHost {
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.item.label.as_str()).collect()
    }

    /// True when nothing was listed, played or stored.
    pub fn untouched(&self) -> bool {
        self.entries.is_empty()
            && self.ended.is_empty()
            && self.resolved.is_empty()
            && self.direct.is_empty()
            && self.stored.is_empty()
            && self.notifications.is_empty()
    }
}

impl Host for RecordingHost {
    fn add_entry(&mut self, handle: i64, url: &str, item: &ListItem, is_folder: bool) {
        self.entries.push(AddedEntry {
            handle,
            url: url.to_string(),
            item: item.clone(),
            is_folder,
        });
    }

    fn end_of_listing(&mut self, handle: i64) {
        self.ended.push(handle);
    }

    fn resolve_playback(&mut self, handle: i64, succeeded: bool, item: &ListItem) {
        self.resolved.push((handle, succeeded, item.clone()));
    }

    fn play_direct(&mut self, url: &str, item: &ListItem) {
        self.direct.push((url.to_string(), item.clone()));
    }

    fn store_setting(&mut self, key: &str, value: &str) {
        self.stored.push((key.to_string(), value.to_string()));
    }

    fn localized(&self, msg: Msg) -> String {
        msg.fallback().to_string()
    }

    fn notify(&mut self, title: &str, message: &str, icon: NotificationIcon) {
        self.notifications
            .push((title.to_string(), message.to_string(), icon));
    }

    fn prompt_text(&mut self, heading: &str) -> Option<String> {
        self.prompts.push(heading.to_string());
        self.prompt_answer.clone()
    }

    fn adaptive_helper(&self, _manifest_type: &str) -> Option<String> {
        self.helper.clone()
    }
}

pub fn settings(instance: &str, profile: &Path) -> Settings {
    Settings {
        instance_url: Some(instance.to_string()),
        auto_instance: false,
        profile_dir: Some(profile.to_path_buf()),
        request_timeout_secs: 1,
        ..Settings::default()
    }
}

pub fn video_json(id: &str, length: i64) -> Value {
    json!({
        "type": "video",
        "videoId": id,
        "title": format!("Video {id}"),
        "author": "Author",
        "description": "A video",
        "viewCount": 10,
        "published": 1_600_000_000,
        "lengthSeconds": length,
        "videoThumbnails": [
            {"quality": "high", "url": format!("https://img/{id}/high.jpg"), "width": 480, "height": 360}
        ]
    })
}

pub fn video_info_json(dash: Option<&str>, streams: &[&str]) -> Value {
    let mut info = json!({
        "title": "Playable",
        "author": "Author",
        "description": "Plot",
        "published": 1_600_000_000,
        "lengthSeconds": 321,
        "formatStreams": streams.iter().map(|u| json!({"url": u})).collect::<Vec<_>>()
    });
    if let Some(url) = dash {
        info["dashUrl"] = json!(url);
    }
    info
}
