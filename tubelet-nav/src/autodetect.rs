//! Picks a working public instance from the directory at api.invidious.io.
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tubelet_api::{ApiClient, ApiConfig, ApiError};
use tubelet_http::{HttpClient, RequestOpts};
use url::Url;

use crate::error::NavError;

/// Known-good video; instances that serve lists but fail single videos are
/// rejected by probing it.
pub const PROBE_VIDEO_ID: &str = "1l2_uCyBXQ0";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InstanceInfo {
    #[serde(rename = "type")]
    pub kind: String,
    /// `null` on instances whose API status is unknown.
    #[serde(default)]
    pub api: Option<bool>,
    pub uri: String,
}

/// Directory entry, a `[name, info]` pair on the wire.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Instance(pub String, pub InstanceInfo);

impl Instance {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn info(&self) -> &InstanceInfo {
        &self.1
    }

    /// HTTPS instances not known to have their API disabled.
    pub fn is_candidate(&self) -> bool {
        self.1.kind == "https" && self.1.api != Some(false)
    }
}

/// Fetch the directory. Entries that do not have the `[name, info]` shape are
/// skipped.
pub async fn fetch_directory(
    directory_url: &str,
    timeout: Duration,
) -> Result<Vec<Instance>, NavError> {
    let parsed = Url::parse(directory_url).map_err(|e| ApiError::Url(e.to_string()))?;
    let http = HttpClient::new(&parsed.origin().ascii_serialization())
        .map_err(ApiError::from)?
        .with_timeout(timeout);

    let raw: Vec<Value> = http
        .get_json(
            directory_url,
            RequestOpts {
                allow_absolute: true,
                ..Default::default()
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(raw
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Instance>(entry.clone()) {
            Ok(instance) => Some(instance),
            Err(e) => {
                tracing::debug!(entry=%entry, error=%e, "nav.autodetect.malformed_entry");
                None
            }
        })
        .collect())
}

/// Probe `uri` by fetching metadata of [`PROBE_VIDEO_ID`].
pub async fn probe(uri: &str, timeout: Duration) -> bool {
    let api = match ApiClient::new(ApiConfig {
        timeout,
        ..ApiConfig::new(uri)
    }) {
        Ok(api) => api,
        Err(e) => {
            tracing::debug!(uri, error=%e, "nav.autodetect.bad_uri");
            return false;
        }
    };
    match api.fetch_video_info(PROBE_VIDEO_ID).await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(uri, error=%e, "nav.autodetect.probe_failed");
            false
        }
    }
}

/// First candidate, in directory order, whose probe succeeds.
pub async fn select_instance(instances: &[Instance], timeout: Duration) -> Option<String> {
    for instance in instances {
        tracing::debug!(name = instance.name(), info=?instance.info(), "nav.autodetect.consider");
        if !instance.is_candidate() {
            continue;
        }
        if probe(&instance.info().uri, timeout).await {
            tracing::info!(name = instance.name(), uri=%instance.info().uri, "nav.autodetect.selected");
            return Some(instance.info().uri.clone());
        }
        tracing::debug!(name = instance.name(), "nav.autodetect.rejected");
    }
    None
}

/// Fetch the directory and pick an instance.
///
/// An unreachable directory counts as a failed detection.
pub async fn instance_autodetect(directory_url: &str, timeout: Duration) -> Result<String, NavError> {
    tracing::info!(directory = directory_url, "nav.autodetect.start");
    let instances = match fetch_directory(directory_url, timeout).await {
        Ok(instances) => instances,
        Err(e) => {
            tracing::warn!(error=%e, "nav.autodetect.directory_failed");
            return Err(NavError::AutodetectionFailed);
        }
    };
    match select_instance(&instances, timeout).await {
        Some(uri) => Ok(uri),
        None => {
            tracing::warn!(considered = instances.len(), "nav.autodetect.failed");
            Err(NavError::AutodetectionFailed)
        }
    }
}
