use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The player's view mode, as passed to `initAd` and `resizeAd`
///
/// Unknown strings are kept verbatim in [`ViewMode::Other`]; the ad unit never
/// rejects a view mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ViewMode {
    #[default]
    Normal,
    Thumbnail,
    Fullscreen,
    Other(String),
}

impl ViewMode {
    pub fn as_str(&self) -> &str {
        match self {
            ViewMode::Normal => "normal",
            ViewMode::Thumbnail => "thumbnail",
            ViewMode::Fullscreen => "fullscreen",
            ViewMode::Other(mode) => mode,
        }
    }
}

impl From<&str> for ViewMode {
    fn from(value: &str) -> Self {
        match value {
            "normal" => ViewMode::Normal,
            "thumbnail" => ViewMode::Thumbnail,
            "fullscreen" => ViewMode::Fullscreen,
            other => ViewMode::Other(other.to_string()),
        }
    }
}

impl From<String> for ViewMode {
    fn from(value: String) -> Self {
        ViewMode::from(value.as_str())
    }
}

impl From<ViewMode> for String {
    fn from(mode: ViewMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The attribute bag exposed through the ad contract's getters and setters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdAttributes {
    /// Companion banner payload handed back to the player
    pub companions: String,

    /// The bitrate the player asked for, in kbps
    pub desired_bitrate: f64,

    /// Total ad duration in seconds
    pub duration: f64,

    /// Whether the ad is currently expanded
    pub expanded: bool,

    /// Ad height in pixels
    pub height: i32,

    /// Icon payload handed back to the player
    pub icons: String,

    /// Whether the ad is in linear (video takeover) mode
    pub linear: bool,

    /// Whether the ad may currently be skipped
    pub skippable_state: bool,

    /// The player's view mode
    pub view_mode: ViewMode,

    /// Ad volume
    pub volume: f64,

    /// Ad width in pixels
    pub width: i32,
}

impl Default for AdAttributes {
    fn default() -> Self {
        Self {
            companions: String::new(),
            desired_bitrate: 256.0,
            duration: 30.0,
            expanded: false,
            height: 0,
            icons: String::new(),
            linear: false,
            skippable_state: false,
            view_mode: ViewMode::Normal,
            volume: 50.0,
            width: 0,
        }
    }
}

/// The `creativeData` object handed to `initAd`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreativeData {
    /// The raw JSON string carried under the `AdParameters` key
    #[serde(rename = "AdParameters", default)]
    pub ad_parameters: Option<String>,
}

impl CreativeData {
    pub fn new(ad_parameters: impl Into<String>) -> Self {
        Self {
            ad_parameters: Some(ad_parameters.into()),
        }
    }
}

/// A video the ad can switch to when it goes linear
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    /// The video URL
    pub url: Url,

    /// The MIME type to probe the video element with
    pub mime_type: String,
}

/// Creative parameters decoded from `AdParameters`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdParameters {
    /// Overlay images, rendered in order
    pub overlays: Vec<Url>,

    /// Candidate videos, probed in order
    pub videos: Vec<MediaSource>,
}

/// How a started ad is being presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    NonLinear,
    Linear,
}

/// Lifecycle state of an ad unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdState {
    Uninitialized,
    Loaded,
    Started(Presentation),
    Stopped,
}

impl AdState {
    pub fn is_started(&self) -> bool {
        matches!(self, AdState::Started(_))
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, AdState::Started(Presentation::Linear))
    }
}

impl fmt::Display for AdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdState::Uninitialized => f.write_str("uninitialized"),
            AdState::Loaded => f.write_str("loaded"),
            AdState::Started(Presentation::NonLinear) => f.write_str("started (non-linear)"),
            AdState::Started(Presentation::Linear) => f.write_str("started (linear)"),
            AdState::Stopped => f.write_str("stopped"),
        }
    }
}
