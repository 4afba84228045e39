use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupStyle {
    /// Text is fixed once the window opens.
    Plain,
    /// Without an explicit message the time is refreshed like a live clock.
    Clock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupSettings {
    pub style: PopupStyle,
    pub refresh_interval: Duration,
    pub always_on_top: bool,
    pub title_case: bool,
    pub title: String,
    pub font_size: f32,
    pub foreground: [u8; 3],
    pub background: [u8; 3],
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            style: PopupStyle::Clock,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            always_on_top: true,
            title_case: true,
            title: "Ring!".to_string(),
            font_size: 48.0,
            foreground: [255, 0, 0],
            background: [255, 248, 220],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingSettings {
    pub poll_interval: Duration,
    pub popup: PopupSettings,
}

impl Default for RingSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            popup: PopupSettings::default(),
        }
    }
}

pub fn load_settings(path: &Path) -> Result<RingSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read settings file {}", path.display()))?;
    parse_settings_text(&content)
}

pub fn parse_settings_text(content: &str) -> Result<RingSettings> {
    let raw = serde_json::from_str::<SettingsFile>(content).map_err(|err| {
        let line = err.line();
        let column = err.column();
        anyhow::anyhow!("invalid JSON at line {line}, column {column}: {err}")
    })?;

    if raw.version != 1 {
        bail!(
            "unsupported settings version {}; expected version 1",
            raw.version
        );
    }

    let mut settings = RingSettings::default();
    if let Some(secs) = raw.poll_interval_secs {
        settings.poll_interval = positive_secs("poll_interval_secs", secs)?;
    }

    let popup = raw.popup;
    let resolved = &mut settings.popup;
    if let Some(style) = popup.style {
        resolved.style = style;
    }
    if let Some(secs) = popup.refresh_interval_secs {
        resolved.refresh_interval = positive_secs("refresh_interval_secs", secs)?;
    }
    if let Some(always_on_top) = popup.always_on_top {
        resolved.always_on_top = always_on_top;
    }
    if let Some(title_case) = popup.title_case {
        resolved.title_case = title_case;
    }
    if let Some(title) = popup.title {
        resolved.title = title;
    }
    if let Some(font_size) = popup.font_size {
        if !(font_size.is_finite() && font_size > 0.0) {
            bail!("font_size must be greater than zero, got {font_size}");
        }
        resolved.font_size = font_size;
    }
    if let Some(foreground) = popup.foreground {
        resolved.foreground = foreground;
    }
    if let Some(background) = popup.background {
        resolved.background = background;
    }

    Ok(settings)
}

pub fn positive_secs(field: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        bail!("{field} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    version: u32,
    #[serde(default)]
    poll_interval_secs: Option<u64>,
    #[serde(default)]
    popup: PopupSettingsFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PopupSettingsFile {
    #[serde(default)]
    style: Option<PopupStyle>,
    #[serde(default)]
    refresh_interval_secs: Option<u64>,
    #[serde(default)]
    always_on_top: Option<bool>,
    #[serde(default)]
    title_case: Option<bool>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    font_size: Option<f32>,
    #[serde(default)]
    foreground: Option<[u8; 3]>,
    #[serde(default)]
    background: Option<[u8; 3]>,
}
