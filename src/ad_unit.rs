use crate::config::AdUnitConfig;
use crate::environment::{AdSlot, EnvironmentVars, VideoSlot};
use crate::error::{Result, VpaidError};
use crate::events::{AdEvent, EventDispatcher};
use crate::models::{
    AdAttributes, AdParameters, AdState, CreativeData, MediaSource, Presentation, ViewMode,
};
use crate::parser;
use crate::scheduler::Scheduler;
use log::{debug, info, warn};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// The ad contract version this unit speaks
pub const VPAID_VERSION: &str = "2.0";

/// Progress thresholds (percent of the video) and the event each one fires
const QUARTILE_EVENTS: [(AdEvent, f64); 6] = [
    (AdEvent::AdImpression, 0.0),
    (AdEvent::AdVideoStart, 0.0),
    (AdEvent::AdVideoFirstQuartile, 25.0),
    (AdEvent::AdVideoMidpoint, 50.0),
    (AdEvent::AdVideoThirdQuartile, 75.0),
    (AdEvent::AdVideoComplete, 100.0),
];

/// A sample VPAID ad unit
///
/// The unit starts as an overlay (non-linear) ad. The first click on an
/// overlay is reported as a click-through; the second one clears the overlay
/// and switches to the first playable video (linear). One instance serves
/// exactly one impression.
///
/// Host-side DOM events are delivered through [`VpaidAd::overlay_clicked`],
/// [`VpaidAd::video_time_update`] and [`VpaidAd::video_ended`].
pub struct VpaidAd {
    impression_id: String,
    config: AdUnitConfig,
    attributes: AdAttributes,
    state: AdState,
    events: Rc<RefCell<EventDispatcher>>,
    scheduler: Box<dyn Scheduler>,
    parameters: Option<AdParameters>,
    slot: Option<Box<dyn AdSlot>>,
    video_slot: Option<Box<dyn VideoSlot>>,
    video_slot_can_autoplay: bool,
    active_source: Option<MediaSource>,
    overlay_clicks: u32,
    linear_switch_attempted: bool,
    started_at: Option<Duration>,
    next_quartile: usize,
}

impl VpaidAd {
    pub fn new(scheduler: impl Scheduler + 'static) -> Self {
        Self::with_config(AdUnitConfig::default(), scheduler)
    }

    pub fn with_config(config: AdUnitConfig, scheduler: impl Scheduler + 'static) -> Self {
        // Random id so log lines from concurrent impressions can be told apart
        let impression_id: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();

        debug!("[{}] Created ad unit", impression_id);

        Self {
            impression_id,
            attributes: config.initial_attributes.clone(),
            config,
            state: AdState::Uninitialized,
            events: Rc::new(RefCell::new(EventDispatcher::new())),
            scheduler: Box::new(scheduler),
            parameters: None,
            slot: None,
            video_slot: None,
            video_slot_can_autoplay: true,
            active_source: None,
            overlay_clicks: 0,
            linear_switch_attempted: false,
            started_at: None,
            next_quartile: 0,
        }
    }

    pub fn impression_id(&self) -> &str {
        &self.impression_id
    }

    pub fn state(&self) -> AdState {
        self.state
    }

    pub fn config(&self) -> &AdUnitConfig {
        &self.config
    }

    pub fn attributes(&self) -> &AdAttributes {
        &self.attributes
    }

    /// Creative parameters parsed by `initAd`
    pub fn ad_parameters(&self) -> Option<&AdParameters> {
        self.parameters.as_ref()
    }

    /// The video selected when the ad went linear
    pub fn active_source(&self) -> Option<&MediaSource> {
        self.active_source.as_ref()
    }

    pub fn handshake_version(&self, player_version: &str) -> &'static str {
        debug!(
            "[{}] Handshake with player version {}",
            self.impression_id, player_version
        );
        VPAID_VERSION
    }

    pub fn init_ad(
        &mut self,
        width: i32,
        height: i32,
        view_mode: ViewMode,
        desired_bitrate: f64,
        creative_data: &CreativeData,
        environment: EnvironmentVars,
    ) -> Result<()> {
        if self.state != AdState::Uninitialized {
            return Err(VpaidError::invalid_state("initialize", self.state));
        }

        // Parse before touching any state so a bad payload leaves the unit untouched
        let parameters = parser::parse_creative_parameters(creative_data)?;

        self.attributes.width = width;
        self.attributes.height = height;
        self.attributes.view_mode = view_mode;
        self.attributes.desired_bitrate = desired_bitrate;

        self.slot = Some(environment.slot);
        self.video_slot = Some(environment.video_slot);
        self.video_slot_can_autoplay = environment.video_slot_can_autoplay;
        self.parameters = Some(parameters);
        self.state = AdState::Loaded;

        info!(
            "[{}] Ad loaded ({}x{}, {})",
            self.impression_id, width, height, self.attributes.view_mode
        );
        self.emit(AdEvent::AdLoaded);
        Ok(())
    }

    /// Render the overlays and start the non-linear presentation
    pub fn start_ad(&mut self) -> Result<()> {
        if self.state != AdState::Loaded {
            return Err(VpaidError::invalid_state("start", self.state));
        }

        if let (Some(slot), Some(parameters)) = (self.slot.as_mut(), self.parameters.as_ref()) {
            for overlay in &parameters.overlays {
                debug!("[{}] Rendering overlay {}", self.impression_id, overlay);
                slot.append_image(overlay);
            }
        }

        self.state = AdState::Started(Presentation::NonLinear);
        self.started_at = Some(self.scheduler.now());

        info!("[{}] Ad started", self.impression_id);
        self.emit(AdEvent::AdStarted);
        Ok(())
    }

    /// Move to `Stopped` and fire `AdStopped` once the stop delay has passed
    pub fn stop_ad(&mut self) {
        if self.state == AdState::Stopped {
            warn!("[{}] stopAd called on a stopped ad", self.impression_id);
            return;
        }

        self.state = AdState::Stopped;

        let events = Rc::clone(&self.events);
        let impression_id = self.impression_id.clone();
        self.scheduler.schedule_once(
            self.config.stop_delay(),
            Box::new(move || {
                info!("[{}] Ad stopped", impression_id);
                events.borrow_mut().emit(AdEvent::AdStopped.as_str());
            }),
        );
    }

    pub fn pause_ad(&mut self) {
        if self.ignored_after_stop("pauseAd") {
            return;
        }

        if self.state.is_linear() {
            if let Some(video) = self.video_slot.as_mut() {
                video.pause();
            }
        }
        self.emit(AdEvent::AdPaused);
    }

    pub fn resume_ad(&mut self) {
        if self.ignored_after_stop("resumeAd") {
            return;
        }

        if self.state.is_linear() {
            if let Some(video) = self.video_slot.as_mut() {
                video.play();
            }
        }
        self.emit(self.config.resume_event);
    }

    pub fn resize_ad(&mut self, width: i32, height: i32, view_mode: ViewMode) {
        if self.ignored_after_stop("resizeAd") {
            return;
        }

        self.attributes.width = width;
        self.attributes.height = height;
        self.attributes.view_mode = view_mode;

        if let Some(video) = self.video_slot.as_mut() {
            video.set_size(width, height);
        }

        debug!(
            "[{}] Resized to {}x{} ({})",
            self.impression_id, width, height, self.attributes.view_mode
        );
        self.emit(AdEvent::AdSizeChange);
    }

    pub fn expand_ad(&mut self) {
        if self.ignored_after_stop("expandAd") {
            return;
        }

        self.attributes.expanded = true;
        self.emit(AdEvent::AdExpanded);
    }

    /// Clear the expanded flag
    ///
    /// Fires nothing unless `emit_on_collapse` is set, unlike `expand_ad`.
    pub fn collapse_ad(&mut self) {
        if self.ignored_after_stop("collapseAd") {
            return;
        }

        self.attributes.expanded = false;
        if self.config.emit_on_collapse {
            self.emit(AdEvent::AdExpanded);
        }
    }

    pub fn skip_ad(&mut self) {
        if self.ignored_after_stop("skipAd") {
            return;
        }

        if self.attributes.skippable_state {
            self.emit(AdEvent::AdSkipped);
        } else {
            debug!("[{}] skipAd ignored, ad is not skippable", self.impression_id);
        }
    }

    /// Register `callback` for `event_name`, replacing any earlier registration
    pub fn subscribe<C, F>(&mut self, callback: F, event_name: &str, context: C)
    where
        C: 'static,
        F: FnMut(&C) + 'static,
    {
        debug!("[{}] Subscribed to {}", self.impression_id, event_name);
        self.events
            .borrow_mut()
            .subscribe(callback, event_name, context);
    }

    pub fn unsubscribe(&mut self, event_name: &str) {
        let mut events = self.events.borrow_mut();
        if events.is_subscribed(event_name) {
            debug!("[{}] Unsubscribed from {}", self.impression_id, event_name);
        } else {
            debug!(
                "[{}] Unsubscribe from {} found no callback",
                self.impression_id, event_name
            );
        }
        events.unsubscribe(event_name);
    }

    /// Whether a host callback is registered for `event_name`
    pub fn is_subscribed(&self, event_name: &str) -> bool {
        self.events.borrow().is_subscribed(event_name)
    }

    pub fn get_ad_linear(&self) -> bool {
        self.attributes.linear
    }

    pub fn get_ad_width(&self) -> i32 {
        self.attributes.width
    }

    pub fn get_ad_height(&self) -> i32 {
        self.attributes.height
    }

    pub fn get_ad_expanded(&self) -> bool {
        self.attributes.expanded
    }

    pub fn get_ad_skippable_state(&self) -> bool {
        self.attributes.skippable_state
    }

    /// Seconds left: the duration minus the time elapsed since `startAd`, never negative
    ///
    /// Before the ad starts this is the full duration.
    pub fn get_ad_remaining_time(&self) -> f64 {
        match self.started_at {
            Some(started_at) => {
                let elapsed = self.scheduler.now().saturating_sub(started_at);
                (self.attributes.duration - elapsed.as_secs_f64()).max(0.0)
            }
            None => self.attributes.duration,
        }
    }

    pub fn get_ad_duration(&self) -> f64 {
        self.attributes.duration
    }

    pub fn get_ad_volume(&self) -> f64 {
        self.attributes.volume
    }

    pub fn set_ad_volume(&mut self, volume: f64) {
        self.attributes.volume = volume;
        debug!("[{}] Volume set to {}", self.impression_id, volume);
        self.emit(AdEvent::AdVolumeChange);
    }

    pub fn get_ad_companions(&self) -> &str {
        &self.attributes.companions
    }

    pub fn get_ad_icons(&self) -> &str {
        &self.attributes.icons
    }

    pub fn get_ad_view_mode(&self) -> &ViewMode {
        &self.attributes.view_mode
    }

    pub fn get_ad_desired_bitrate(&self) -> f64 {
        self.attributes.desired_bitrate
    }

    /// Flip the skippable flag, firing `AdSkippableStateChange`
    pub fn set_ad_skippable_state(&mut self, skippable: bool) {
        self.attributes.skippable_state = skippable;
        self.emit(AdEvent::AdSkippableStateChange);
    }

    /// A click on one of the rendered overlays
    ///
    /// Ignored unless the ad is showing overlays.
    pub fn overlay_clicked(&mut self) {
        if self.state != AdState::Started(Presentation::NonLinear) {
            debug!(
                "[{}] Overlay click ignored while {}",
                self.impression_id, self.state
            );
            return;
        }

        self.overlay_clicks += 1;
        if self.overlay_clicks == 1 {
            self.emit(AdEvent::AdClickThru);

            if let Some(extension) = self.config.click_duration_extension {
                self.attributes.duration += extension;
                debug!(
                    "[{}] Duration extended to {}s",
                    self.impression_id, self.attributes.duration
                );
                self.emit(AdEvent::AdDurationChange);
                self.emit(AdEvent::AdRemainingTimeChange);
            }
        } else if !self.linear_switch_attempted {
            self.switch_to_linear();
        } else {
            debug!(
                "[{}] Overlay click ignored, linear switch already attempted",
                self.impression_id
            );
        }
    }

    /// A `timeupdate` from the video slot while the linear creative plays
    ///
    /// Fires every progress event whose threshold has been reached, each one once.
    pub fn video_time_update(&mut self, current_time: f64, video_duration: f64) {
        // A video element reports NaN as its duration until metadata has loaded
        if !self.state.is_linear()
            || !current_time.is_finite()
            || !video_duration.is_finite()
            || video_duration <= 0.0
        {
            return;
        }

        let percent_played = current_time * 100.0 / video_duration;
        while let Some((event, threshold)) = QUARTILE_EVENTS.get(self.next_quartile).copied() {
            if percent_played < threshold {
                break;
            }
            self.next_quartile += 1;
            self.emit(event);
        }
    }

    /// The video slot reported the end of playback
    pub fn video_ended(&mut self) {
        if self.state.is_linear() {
            info!("[{}] Video ended", self.impression_id);
            self.stop_ad();
        }
    }

    fn switch_to_linear(&mut self) {
        self.linear_switch_attempted = true;

        if let Some(slot) = self.slot.as_mut() {
            slot.clear();
        }

        let Some(video) = self.video_slot.as_mut() else {
            warn!("[{}] No video slot to go linear in", self.impression_id);
            self.emit(AdEvent::AdError);
            return;
        };

        // First playable entry wins
        let source = self.parameters.as_ref().and_then(|parameters| {
            parameters
                .videos
                .iter()
                .find(|candidate| video.can_play_type(&candidate.mime_type).is_playable())
                .cloned()
        });

        let Some(source) = source else {
            warn!("[{}] No playable video source", self.impression_id);
            self.emit(AdEvent::AdError);
            return;
        };

        video.set_src(&source.url);
        video.set_size(self.attributes.width, self.attributes.height);
        info!(
            "[{}] Going linear with {} ({})",
            self.impression_id, source.url, source.mime_type
        );

        self.active_source = Some(source);
        self.attributes.linear = true;
        self.state = AdState::Started(Presentation::Linear);
        self.next_quartile = 0;
        self.emit(AdEvent::AdLinearChange);

        if self.video_slot_can_autoplay {
            if let Some(video) = self.video_slot.as_mut() {
                video.play();
            }
        } else {
            info!(
                "[{}] Autoplay not allowed, waiting for resumeAd",
                self.impression_id
            );
        }
    }

    fn ignored_after_stop(&self, operation: &str) -> bool {
        if self.state == AdState::Stopped {
            warn!("[{}] {} ignored, ad is stopped", self.impression_id, operation);
            true
        } else {
            false
        }
    }

    fn emit(&self, event: AdEvent) {
        let delivered = self.events.borrow_mut().emit(event.as_str());
        debug!(
            "[{}] {} {}",
            self.impression_id,
            event,
            if delivered { "delivered" } else { "has no subscriber" }
        );
    }
}
