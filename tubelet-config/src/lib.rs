//! Settings loader: YAML files + `TUBELET_` environment overlay.
//!
//! Sources are merged in the order they are added, then environment variables
//! (`TUBELET_INSTANCE_URL`, `TUBELET_DISABLE_DASH`, ...) are applied on top.
//! String values may reference other environment variables as `${VAR}`; the
//! expansion is recursive up to a fixed depth.
//!
//! Values the controller persists (the auto-detected instance) go to a YAML
//! overlay file via [`store_overlay_setting`]. On the next run the binary
//! loads that file on its own and applies it through
//! [`Settings::with_detected_instance`], so it never shadows the user's file.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TUBELET";

pub const DEFAULT_INSTANCE_DIRECTORY: &str =
    "https://api.invidious.io/instances.json?sort_by=type,health";

/// Name of the overlay file inside the profile directory.
pub const OVERLAY_FILE: &str = "settings.yaml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Explicit instance; empty means "not configured".
    pub instance_url: Option<String>,
    /// Pick an instance from the public directory when none is configured.
    pub auto_instance: bool,
    pub instance_directory_url: String,
    pub instance_username: Option<String>,
    pub instance_password: Option<String>,
    pub disable_dash: bool,
    pub show_instance_trending: bool,
    pub show_instance_popular: bool,
    pub mark_items_watched: bool,
    /// Proxy media through the instance.
    pub local: bool,
    pub history_depth: usize,
    pub request_timeout_secs: u64,
    pub profile_dir: Option<PathBuf>,
    /// Adaptive-streaming helper the console host reports as available.
    pub adaptive_helper: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instance_url: None,
            auto_instance: true,
            instance_directory_url: DEFAULT_INSTANCE_DIRECTORY.into(),
            instance_username: None,
            instance_password: None,
            disable_dash: false,
            show_instance_trending: true,
            show_instance_popular: true,
            mark_items_watched: false,
            local: false,
            history_depth: 20,
            request_timeout_secs: 5,
            profile_dir: None,
            adaptive_helper: None,
        }
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Settings {
    pub fn instance_url(&self) -> Option<&str> {
        non_empty(&self.instance_url)
    }

    pub fn username(&self) -> Option<&str> {
        non_empty(&self.instance_username)
    }

    pub fn password(&self) -> &str {
        self.instance_password.as_deref().unwrap_or("")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Per-installation state directory (search history, settings overlay).
    pub fn profile_dir(&self) -> PathBuf {
        match &self.profile_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tubelet"),
        }
    }

    pub fn overlay_path(&self) -> PathBuf {
        self.profile_dir().join(OVERLAY_FILE)
    }

    /// Take the instance persisted in `overlay` by an earlier auto-detection.
    ///
    /// Only applies while no instance is configured and auto-detection is on;
    /// an explicitly configured server always beats the persisted one.
    pub fn with_detected_instance(mut self, overlay: &Settings) -> Self {
        if self.auto_instance && self.instance_url().is_none() {
            self.instance_url = overlay.instance_url().map(str::to_string);
        }
        self
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring.
pub struct SettingsLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Start from the built-in defaults.
    ///
    /// ```
    /// use tubelet_config::SettingsLoader;
    ///
    /// let settings = SettingsLoader::new()
    ///     .with_yaml_str("instance_url: https://yt.example.org\nhistory_depth: 5")
    ///     .load()
    ///     .expect("valid settings");
    ///
    /// assert_eq!(settings.instance_url(), Some("https://yt.example.org"));
    /// assert_eq!(settings.history_depth, 5);
    /// assert!(settings.auto_instance);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may not exist yet (e.g. the settings overlay).
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, apply `TUBELET_` env vars, expand `${VAR}` and
    /// deserialize into [`Settings`].
    pub fn load(self) -> Result<Settings, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // Re-read through `config` so string values from the environment
        // coerce into bools and numbers.
        let expanded =
            serde_json::to_string(&v).map_err(|e| ConfigError::Message(e.to_string()))?;
        Config::builder()
            .add_source(File::from_str(&expanded, FileFormat::Json))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings overlay I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("settings overlay {path} is not a YAML mapping: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Set `key: value` in the YAML overlay at `path`, keeping other keys.
///
/// The file is rewritten through a temporary sibling and a rename.
pub fn store_overlay_setting(path: &Path, key: &str, value: &str) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let yaml_err = |source| SettingsError::Yaml {
        path: path.to_path_buf(),
        source,
    };

    let mut map = match std::fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => serde_yaml::Mapping::new(),
        Ok(raw) => serde_yaml::from_str::<serde_yaml::Mapping>(&raw).map_err(yaml_err)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => serde_yaml::Mapping::new(),
        Err(e) => return Err(io_err(e)),
    };
    map.insert(key.into(), value.into());

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    let rendered = serde_yaml::to_string(&map).map_err(yaml_err)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, rendered).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    tracing::debug!(path=%path.display(), key, "config.overlay.stored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("HOST", Some("yt.example.org")), ("SCHEME", Some("https"))], || {
            let mut v = json!([
                "${SCHEME}://$HOST",
                { "url": "${SCHEME}://${HOST}/" },
                5,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["https://yt.example.org", { "url": "https://yt.example.org/" }, 5, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_and_stops_on_cycles() {
        temp_env::with_vars(
            [
                ("INNER", Some("pw")),
                ("OUTER", Some("x-${INNER}")),
                ("A", Some("${B}")),
                ("B", Some("${A}")),
            ],
            || {
                let mut v = json!("${OUTER}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("x-pw"));

                let mut cyclic = json!("${A}");
                expand_env_in_value(&mut cyclic);
                assert!(cyclic.as_str().unwrap().contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${TUBELET_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${TUBELET_DOES_NOT_EXIST}"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let s = Settings {
            instance_url: Some("  ".into()),
            instance_username: Some(String::new()),
            ..Settings::default()
        };
        assert_eq!(s.instance_url(), None);
        assert_eq!(s.username(), None);
        assert_eq!(s.password(), "");
    }

    #[test]
    fn timeout_is_never_zero() {
        let s = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert_eq!(s.request_timeout(), Duration::from_secs(1));
    }
}
