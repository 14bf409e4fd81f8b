//! Terminal stand-in for a media-center host.
//!
//! Every collaborator call becomes one JSON line on the output stream, so a
//! wrapper script (or a human with `jq`) can follow the navigation. Text input
//! is read from stdin.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde::Serialize;
use tubelet_common::Msg;
use tubelet_config::store_overlay_setting;
use tubelet_nav::playback::DASH_MANIFEST_TYPE;
use tubelet_nav::{Host, ListItem, NotificationIcon};

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ConsoleEvent<'a> {
    Entry {
        handle: i64,
        url: &'a str,
        folder: bool,
        item: &'a ListItem,
    },
    EndOfListing {
        handle: i64,
    },
    Resolved {
        handle: i64,
        succeeded: bool,
        item: &'a ListItem,
    },
    Play {
        url: &'a str,
        item: &'a ListItem,
    },
    Notification {
        title: &'a str,
        message: &'a str,
        icon: NotificationIcon,
    },
}

pub struct ConsoleHost<W: Write> {
    out: W,
    overlay_path: PathBuf,
    adaptive_helper: Option<String>,
}

impl ConsoleHost<io::Stdout> {
    pub fn stdout(overlay_path: PathBuf, adaptive_helper: Option<String>) -> Self {
        Self::new(io::stdout(), overlay_path, adaptive_helper)
    }
}

impl<W: Write> ConsoleHost<W> {
    pub fn new(out: W, overlay_path: PathBuf, adaptive_helper: Option<String>) -> Self {
        Self {
            out,
            overlay_path,
            adaptive_helper: adaptive_helper.filter(|h| !h.is_empty()),
        }
    }

    fn emit(&mut self, event: ConsoleEvent<'_>) {
        let written = serde_json::to_writer(&mut self.out, &event)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            tracing::warn!(error=%e, "console.write_failed");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Host for ConsoleHost<W> {
    fn add_entry(&mut self, handle: i64, url: &str, item: &ListItem, is_folder: bool) {
        self.emit(ConsoleEvent::Entry {
            handle,
            url,
            folder: is_folder,
            item,
        });
    }

    fn end_of_listing(&mut self, handle: i64) {
        self.emit(ConsoleEvent::EndOfListing { handle });
    }

    fn resolve_playback(&mut self, handle: i64, succeeded: bool, item: &ListItem) {
        self.emit(ConsoleEvent::Resolved {
            handle,
            succeeded,
            item,
        });
    }

    fn play_direct(&mut self, url: &str, item: &ListItem) {
        self.emit(ConsoleEvent::Play { url, item });
    }

    fn store_setting(&mut self, key: &str, value: &str) {
        match store_overlay_setting(&self.overlay_path, key, value) {
            Ok(()) => tracing::info!(key, value, "console.setting.stored"),
            Err(e) => tracing::error!(key, error=%e, "console.setting.store_failed"),
        }
    }

    fn localized(&self, msg: Msg) -> String {
        msg.fallback().to_string()
    }

    fn notify(&mut self, title: &str, message: &str, icon: NotificationIcon) {
        eprintln!("[{title}] {message}");
        self.emit(ConsoleEvent::Notification {
            title,
            message,
            icon,
        });
    }

    fn prompt_text(&mut self, heading: &str) -> Option<String> {
        eprint!("{heading}: ");
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error=%e, "console.prompt_failed");
                None
            }
        }
    }

    fn adaptive_helper(&self, manifest_type: &str) -> Option<String> {
        if manifest_type == DASH_MANIFEST_TYPE {
            self.adaptive_helper.clone()
        } else {
            None
        }
    }
}
