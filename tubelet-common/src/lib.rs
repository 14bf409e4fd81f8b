//! Common types and utilities shared across Tubelet crates.
//!
//! This crate holds the pieces every other crate (and the binary) agrees on:
//! the logging initializer and the catalogue of localized message ids the
//! controller asks the host to translate. It is intentionally
//! dependency-minimal so that all crates can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`Msg`]: Localized message ids with English fallbacks
//!
//! # Examples
//!
//! ```rust
//! use tubelet_common::Msg;
//!
//! assert_eq!(Msg::NewSearch.id(), 30002);
//! assert_eq!(Msg::from_id(30002), Some(Msg::NewSearch));
//! ```

pub mod observability;

/// Localized strings requested from the host.
///
/// The numeric ids are stable: hosts keep translation tables keyed by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Msg {
    /// Placeholder for videos without a description.
    NoDescription,
    /// Root menu entry and heading of the search prompt.
    Search,
    /// First entry of the search submenu.
    NewSearch,
    /// Notification title for HTTP status errors.
    HttpErrorTitle,
    /// Notification message prefix, followed by the status code.
    HttpErrorMessage,
    /// Notification title for timeouts.
    TimeoutTitle,
    TimeoutMessage,
    AutodetectFailedTitle,
    AutodetectFailedMessage,
    Feed,
    Subscriptions,
    Popular,
    Trending,
}

impl Msg {
    pub const ALL: [Msg; 13] = [
        Msg::NoDescription,
        Msg::Search,
        Msg::NewSearch,
        Msg::HttpErrorTitle,
        Msg::HttpErrorMessage,
        Msg::TimeoutTitle,
        Msg::TimeoutMessage,
        Msg::AutodetectFailedTitle,
        Msg::AutodetectFailedMessage,
        Msg::Feed,
        Msg::Subscriptions,
        Msg::Popular,
        Msg::Trending,
    ];

    pub fn id(self) -> u32 {
        match self {
            Msg::NoDescription => 30000,
            Msg::Search => 30001,
            Msg::NewSearch => 30002,
            Msg::HttpErrorTitle => 30003,
            Msg::HttpErrorMessage => 30004,
            Msg::TimeoutTitle => 30005,
            Msg::TimeoutMessage => 30006,
            Msg::AutodetectFailedTitle => 30012,
            Msg::AutodetectFailedMessage => 30013,
            Msg::Popular => 30020,
            Msg::Trending => 30021,
            Msg::Feed => 30030,
            Msg::Subscriptions => 30031,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    /// English text used when the host has no translation.
    pub fn fallback(self) -> &'static str {
        match self {
            Msg::NoDescription => "No description available.",
            Msg::Search => "Search",
            Msg::NewSearch => "New search",
            Msg::HttpErrorTitle => "Request failed",
            Msg::HttpErrorMessage => "HTTP status: ",
            Msg::TimeoutTitle => "Request timed out",
            Msg::TimeoutMessage => "The instance did not answer in time.",
            Msg::AutodetectFailedTitle => "No instance found",
            Msg::AutodetectFailedMessage => "Could not find a working instance automatically.",
            Msg::Feed => "Feed",
            Msg::Subscriptions => "Subscriptions",
            Msg::Popular => "Popular",
            Msg::Trending => "Trending",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_round_trip() {
        let ids: HashSet<u32> = Msg::ALL.iter().map(|m| m.id()).collect();
        assert_eq!(ids.len(), Msg::ALL.len());
        for m in Msg::ALL {
            assert_eq!(Msg::from_id(m.id()), Some(m));
        }
        assert_eq!(Msg::from_id(1), None);
    }
}
