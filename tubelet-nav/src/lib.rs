//! Navigation controller: turns one host invocation into menu entries or a
//! playback resolution.
//!
//! The host calls the binary once per user action with a base URL, an opaque
//! handle and a query string such as `?action=view_channel&channel_id=UC...`.
//! [`Navigator::init`] settles which instance to talk to,
//! [`Navigator::handle_query`] runs the action and reports back through the
//! [`Host`] trait.
pub mod action;
pub mod autodetect;
pub mod controller;
pub mod error;
pub mod history;
pub mod host;
pub mod playback;
pub mod render;

pub use action::{Action, build_url};
pub use controller::{INSTANCE_URL_KEY, Navigator};
pub use error::NavError;
pub use history::SearchHistory;
pub use host::{Host, ListItem, NotificationIcon, VideoInfoTag};
pub use playback::PlaybackTarget;
