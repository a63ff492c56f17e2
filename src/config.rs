use crate::error::Result;
use crate::events::AdEvent;
use crate::models::AdAttributes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Delay between `stopAd` and the `AdStopped` event, in milliseconds
pub const DEFAULT_STOP_DELAY_MS: u64 = 75;

/// Behaviour switches for an ad unit
///
/// The defaults reproduce the non-linear sample creative. The switches cover
/// the places where the known variants of that creative disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdUnitConfig {
    /// How long `AdStopped` is held back after `stopAd`
    pub stop_delay_ms: u64,

    /// Seconds added to the duration by the first overlay click, if any
    pub click_duration_extension: Option<f64>,

    /// Event fired by `resumeAd`: `AdResumed` or `AdPlaying`
    pub resume_event: AdEvent,

    /// Whether `collapseAd` fires `AdExpanded` like `expandAd` does
    pub emit_on_collapse: bool,

    /// Attribute values the unit starts with before `initAd`
    pub initial_attributes: AdAttributes,
}

impl Default for AdUnitConfig {
    fn default() -> Self {
        Self {
            stop_delay_ms: DEFAULT_STOP_DELAY_MS,
            click_duration_extension: None,
            resume_event: AdEvent::AdResumed,
            emit_on_collapse: false,
            initial_attributes: AdAttributes::default(),
        }
    }
}

impl AdUnitConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn stop_delay(&self) -> Duration {
        Duration::from_millis(self.stop_delay_ms)
    }
}
