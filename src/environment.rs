//! The host-provided surface the ad renders into.
//!
//! A browser player would back these traits with a DOM container and an
//! `HTMLVideoElement`; [`crate::host`] provides in-memory versions.

use url::Url;

/// Answer to "can you play this MIME type", shaped like `HTMLMediaElement.canPlayType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanPlay {
    #[default]
    No,
    Maybe,
    Probably,
}

impl CanPlay {
    /// Anything other than an outright "no" counts as playable
    pub fn is_playable(self) -> bool {
        self != CanPlay::No
    }
}

/// The container element the player hands over for overlay rendering
pub trait AdSlot {
    /// Append an image element showing `src`
    fn append_image(&mut self, src: &Url);

    /// Remove every child element
    fn clear(&mut self);
}

/// The video element the ad plays its linear creative through
pub trait VideoSlot {
    fn can_play_type(&self, mime_type: &str) -> CanPlay;

    fn set_src(&mut self, src: &Url);

    /// Update the element's `width`/`height` attributes
    fn set_size(&mut self, width: i32, height: i32);

    fn play(&mut self);

    fn pause(&mut self);
}

/// The `environmentVars` object handed to `initAd`
pub struct EnvironmentVars {
    pub slot: Box<dyn AdSlot>,
    pub video_slot: Box<dyn VideoSlot>,

    /// Whether the player allows the video slot to start without a user gesture
    pub video_slot_can_autoplay: bool,
}

impl EnvironmentVars {
    pub fn new(slot: impl AdSlot + 'static, video_slot: impl VideoSlot + 'static) -> Self {
        Self {
            slot: Box::new(slot),
            video_slot: Box::new(video_slot),
            video_slot_can_autoplay: true,
        }
    }

    pub fn with_autoplay(mut self, can_autoplay: bool) -> Self {
        self.video_slot_can_autoplay = can_autoplay;
        self
    }
}
