//! Invocation parameters: `?action=...&<key>=...` in, plugin URLs out.
use std::collections::HashMap;

use tubelet_api::NamedList;
use url::form_urlencoded;

use crate::error::NavError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RootMenu,
    SearchMenu,
    NewSearch,
    Search { query: String },
    PlayVideo { video_id: String },
    ViewChannel { channel_id: String },
    ViewPlaylist { playlist_id: String },
    UserFeed,
    UserSubscriptions,
    Named(NamedList),
}

impl Action {
    /// Parse the host's query string (leading `?` optional).
    ///
    /// Only the first value of a repeated key counts.
    ///
    /// ```
    /// use tubelet_nav::Action;
    ///
    /// let action = Action::parse("?action=search&q=rust+streams").unwrap();
    /// assert_eq!(action, Action::Search { query: "rust streams".into() });
    /// assert_eq!(Action::parse("").unwrap(), Action::RootMenu);
    /// ```
    pub fn parse(query: &str) -> Result<Self, NavError> {
        let mut params: HashMap<String, String> = HashMap::new();
        for (k, v) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
        let take = |key: &'static str| {
            params
                .get(key)
                .cloned()
                .ok_or(NavError::MissingParameter(key))
        };

        let Some(name) = params.get("action").filter(|a| !a.is_empty()) else {
            return Ok(Action::RootMenu);
        };
        let action = match name.as_str() {
            "search_menu" => Action::SearchMenu,
            "new_search" => Action::NewSearch,
            "search" => Action::Search { query: take("q")? },
            "play_video" => Action::PlayVideo {
                video_id: take("video_id")?,
            },
            "view_channel" => Action::ViewChannel {
                channel_id: take("channel_id")?,
            },
            "view_playlist" => Action::ViewPlaylist {
                playlist_id: take("playlist_id")?,
            },
            "user_feed" => Action::UserFeed,
            "user_subscriptions" => Action::UserSubscriptions,
            other => match NamedList::from_name(other) {
                Some(list) => Action::Named(list),
                None => return Err(NavError::UnknownAction(other.to_string())),
            },
        };
        Ok(action)
    }

    /// Wire name; `None` for the root menu, which is invoked without one.
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Action::RootMenu => return None,
            Action::SearchMenu => "search_menu",
            Action::NewSearch => "new_search",
            Action::Search { .. } => "search",
            Action::PlayVideo { .. } => "play_video",
            Action::ViewChannel { .. } => "view_channel",
            Action::ViewPlaylist { .. } => "view_playlist",
            Action::UserFeed => "user_feed",
            Action::UserSubscriptions => "user_subscriptions",
            Action::Named(list) => list.as_str(),
        })
    }

    fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            Action::Search { query } => vec![("q", query.as_str())],
            Action::PlayVideo { video_id } => vec![("video_id", video_id.as_str())],
            Action::ViewChannel { channel_id } => vec![("channel_id", channel_id.as_str())],
            Action::ViewPlaylist { playlist_id } => vec![("playlist_id", playlist_id.as_str())],
            _ => Vec::new(),
        }
    }

    /// Plugin URL that invokes this action again.
    pub fn url(&self, base_url: &str) -> String {
        match self.name() {
            Some(name) => build_url(base_url, name, &self.params()),
            None => base_url.to_string(),
        }
    }
}

/// `{base_url}?{params}&action={action}`, form-urlencoded.
pub fn build_url(base_url: &str, action: &str, params: &[(&str, &str)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.extend_pairs(params.iter().copied());
    query.append_pair("action", action);
    format!("{base_url}?{}", query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_action() {
        let cases = [
            ("action=search_menu", Action::SearchMenu),
            ("action=new_search", Action::NewSearch),
            ("action=play_video&video_id=abc", Action::PlayVideo { video_id: "abc".into() }),
            ("action=view_channel&channel_id=UC1", Action::ViewChannel { channel_id: "UC1".into() }),
            ("action=view_playlist&playlist_id=PL1", Action::ViewPlaylist { playlist_id: "PL1".into() }),
            ("action=user_feed", Action::UserFeed),
            ("action=user_subscriptions", Action::UserSubscriptions),
            ("action=trending", Action::Named(NamedList::Trending)),
            ("action=popular", Action::Named(NamedList::Popular)),
            ("?action=", Action::RootMenu),
        ];
        for (raw, expected) in cases {
            assert_eq!(Action::parse(raw).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn first_value_wins() {
        assert_eq!(
            Action::parse("action=search&q=one&q=two").unwrap(),
            Action::Search { query: "one".into() }
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete_actions() {
        assert!(matches!(
            Action::parse("action=delete_everything"),
            Err(NavError::UnknownAction(a)) if a == "delete_everything"
        ));
        assert!(matches!(
            Action::parse("action=play_video"),
            Err(NavError::MissingParameter("video_id"))
        ));
    }

    #[test]
    fn urls_round_trip_through_parse() {
        let base = "plugin://plugin.video.tubelet/";
        let action = Action::Search { query: "a & b=c".into() };
        let url = action.url(base);
        assert_eq!(url, "plugin://plugin.video.tubelet/?q=a+%26+b%3Dc&action=search");

        let query = url.split_once('?').unwrap().1;
        assert_eq!(Action::parse(query).unwrap(), action);
        assert_eq!(Action::RootMenu.url(base), base);
    }
}
