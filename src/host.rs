//! In-memory host collaborators.
//!
//! These stand in for the DOM container and video element of a browser
//! player. Each type is a cheap handle over shared state: clone it before
//! handing it to [`crate::EnvironmentVars`] and keep the clone to inspect
//! what the ad did.

use crate::environment::{AdSlot, CanPlay, VideoSlot};
use log::info;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use url::Url;

#[derive(Debug, Default)]
struct SlotState {
    images: Vec<Url>,
    clear_count: usize,
}

/// A render container that records the overlay images appended to it
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    state: Rc<RefCell<SlotState>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images currently in the container
    pub fn images(&self) -> Vec<Url> {
        self.state.borrow().images.clone()
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clear_count
    }
}

impl AdSlot for MemorySlot {
    fn append_image(&mut self, src: &Url) {
        info!("slot: <img src=\"{}\">", src);
        self.state.borrow_mut().images.push(src.clone());
    }

    fn clear(&mut self) {
        info!("slot: cleared");
        let mut state = self.state.borrow_mut();
        state.images.clear();
        state.clear_count += 1;
    }
}

#[derive(Debug, Default)]
struct VideoState {
    supported: HashMap<String, CanPlay>,
    src: Option<Url>,
    size: Option<(i32, i32)>,
    playing: bool,
    play_count: usize,
    pause_count: usize,
}

/// A video element with a configurable set of playable MIME types
#[derive(Debug, Clone, Default)]
pub struct MemoryVideoSlot {
    state: Rc<RefCell<VideoState>>,
}

impl MemoryVideoSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `answer` when probed with `mime_type`; unknown types answer [`CanPlay::No`]
    pub fn supporting(self, mime_type: &str, answer: CanPlay) -> Self {
        self.state
            .borrow_mut()
            .supported
            .insert(mime_type.to_string(), answer);
        self
    }

    pub fn src(&self) -> Option<Url> {
        self.state.borrow().src.clone()
    }

    pub fn size(&self) -> Option<(i32, i32)> {
        self.state.borrow().size
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn play_count(&self) -> usize {
        self.state.borrow().play_count
    }

    pub fn pause_count(&self) -> usize {
        self.state.borrow().pause_count
    }
}

impl VideoSlot for MemoryVideoSlot {
    fn can_play_type(&self, mime_type: &str) -> CanPlay {
        self.state
            .borrow()
            .supported
            .get(mime_type)
            .copied()
            .unwrap_or_default()
    }

    fn set_src(&mut self, src: &Url) {
        info!("video: src = {}", src);
        self.state.borrow_mut().src = Some(src.clone());
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.state.borrow_mut().size = Some((width, height));
    }

    fn play(&mut self) {
        info!("video: play");
        let mut state = self.state.borrow_mut();
        state.playing = true;
        state.play_count += 1;
    }

    fn pause(&mut self) {
        info!("video: pause");
        let mut state = self.state.borrow_mut();
        state.playing = false;
        state.pause_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_handles_share_state() {
        let slot = MemorySlot::new();
        let mut handle = slot.clone();
        let url = Url::parse("https://cdn.example.com/banner.png").unwrap();

        handle.append_image(&url);
        assert_eq!(slot.images(), vec![url]);

        handle.clear();
        assert!(slot.images().is_empty());
        assert_eq!(slot.clear_count(), 1);
    }

    #[test]
    fn test_video_slot_probes_configured_types() {
        let video = MemoryVideoSlot::new()
            .supporting("video/mp4", CanPlay::Probably)
            .supporting("video/ogg", CanPlay::Maybe);

        assert_eq!(video.can_play_type("video/mp4"), CanPlay::Probably);
        assert!(video.can_play_type("video/ogg").is_playable());
        assert!(!video.can_play_type("video/webm").is_playable());
    }

    #[test]
    fn test_video_slot_tracks_playback() {
        let video = MemoryVideoSlot::new();
        let mut handle = video.clone();

        handle.play();
        assert!(video.is_playing());
        handle.pause();
        assert!(!video.is_playing());
        assert_eq!((video.play_count(), video.pause_count()), (1, 1));
    }
}
