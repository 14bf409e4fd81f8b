#![allow(dead_code)]

use std::sync::OnceLock;

use serde_json::{Value, json};
use tubelet_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "tubelet-tests",
            emit_stderr: true,
            format: LogFormat::from_env(),
            default_filter: "debug",
            ..LogConfig::default()
        };

        tubelet_common::observability::init_logging(config).unwrap_or_default()
    });
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
            {"quality": "maxres", "url": format!("https://img/{id}/maxres.jpg"), "width": 1280, "height": 720},
            {"quality": "high", "url": format!("https://img/{id}/high.jpg"), "width": 480, "height": 360}
        ]
    })
}

pub fn channel_json(id: &str) -> Value {
    json!({
        "type": "channel",
        "author": format!("Channel {id}"),
        "authorId": id,
        "authorVerified": false,
        "authorThumbnails": [
            {"url": format!("//yt3.example/{id}/32.jpg"), "width": 32, "height": 32},
            {"url": format!("//yt3.example/{id}/512.jpg"), "width": 512, "height": 512}
        ],
        "subCount": 99,
        "description": "channel"
    })
}
