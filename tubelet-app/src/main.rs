use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tubelet_common::observability::{LogConfig, LogFormat, init_logging};
use tubelet_config::{Settings, SettingsLoader};
use tubelet_nav::Navigator;

use console::ConsoleHost;
mod console;

const DEFAULT_CONFIG_FILE: &str = "tubelet.yaml";

/// Browse an Invidious instance: one navigation action per invocation.
#[derive(Debug, Parser)]
#[command(name = "tubelet", version)]
struct Cli {
    /// Plugin base URL entries link back to.
    base_url: String,

    /// Request handle; negative when no playback resolution is awaited.
    #[arg(allow_negative_numbers = true)]
    handle: i64,

    /// Query string such as `?action=search&q=...`; empty for the root menu.
    #[arg(default_value = "")]
    query: String,

    /// Settings file (YAML). Defaults to ./tubelet.yaml when present.
    #[arg(long, env = "TUBELET_CONFIG")]
    config: Option<PathBuf>,

    /// Mirror logs to stderr.
    #[arg(long)]
    log_stderr: bool,

    #[arg(long)]
    log_json: bool,
}

/// User settings, plus the instance an earlier run detected when they leave it open.
fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let loader = match config {
        Some(path) => SettingsLoader::new().with_file(path),
        None => SettingsLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let settings = loader.load().context("failed to load settings")?;
    let overlay = SettingsLoader::new()
        .with_optional_file(settings.overlay_path())
        .load()
        .context("failed to load settings overlay")?;
    Ok(settings.with_detected_instance(&overlay))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Settings (env wins), then logging
    let settings = load_settings(cli.config.as_deref())?;
    let log_path = init_logging(LogConfig {
        log_dir: Some(settings.profile_dir().join("logs")),
        emit_stderr: cli.log_stderr,
        format: LogFormat::json_if(cli.log_json),
        ..LogConfig::default()
    })?;
    tracing::info!(log=%log_path.display(), handle = cli.handle, query=%cli.query, "app.invoked");

    let host = ConsoleHost::stdout(
        settings.overlay_path(),
        settings.adaptive_helper.clone(),
    );
    let mut nav = Navigator::init(&settings, cli.base_url, cli.handle, host).await?;
    nav.handle_query(&cli.query).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tubelet_config::store_overlay_setting;

    fn write_config(tmp: &TempDir, yaml: &str) -> PathBuf {
        let path = tmp.path().join("tubelet.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn detected_instance_is_reused_until_the_user_configures_one() {
        let tmp = TempDir::new().unwrap();
        let profile = tmp.path().join("profile");

        // First run: nothing configured, auto-detection stored a public instance.
        let config = write_config(&tmp, &format!("profile_dir: {}\n", profile.display()));
        let first = load_settings(Some(config.as_path())).unwrap();
        store_overlay_setting(&first.overlay_path(), "instance_url", "https://public.example.org")
            .unwrap();
        let second = load_settings(Some(config.as_path())).unwrap();
        assert_eq!(second.instance_url(), Some("https://public.example.org"));

        // Later run: the user points at a private server with credentials.
        let config = write_config(
            &tmp,
            &format!(
                "profile_dir: {}\ninstance_url: https://private.example.org\nauto_instance: false\ninstance_username: me\n",
                profile.display()
            ),
        );
        let settings = load_settings(Some(config.as_path())).unwrap();
        assert_eq!(settings.instance_url(), Some("https://private.example.org"));
        assert!(!settings.auto_instance);
        assert_eq!(settings.username(), Some("me"));
    }

    #[test]
    fn manual_mode_ignores_the_detected_instance() {
        let tmp = TempDir::new().unwrap();
        let profile = tmp.path().join("profile");
        store_overlay_setting(
            &profile.join("settings.yaml"),
            "instance_url",
            "https://public.example.org",
        )
        .unwrap();
        let config = write_config(
            &tmp,
            &format!("profile_dir: {}\nauto_instance: false\n", profile.display()),
        );

        let settings = load_settings(Some(config.as_path())).unwrap();
        assert_eq!(settings.instance_url(), None);
    }
}
