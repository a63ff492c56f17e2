use crate::error::{Result, VpaidError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Events the ad unit can fire at its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdEvent {
    AdLoaded,
    AdStarted,
    AdStopped,
    AdSkipped,
    AdSkippableStateChange,
    AdSizeChange,
    AdLinearChange,
    AdDurationChange,
    AdExpanded,
    AdRemainingTimeChange,
    AdVolumeChange,
    AdImpression,
    AdVideoStart,
    AdVideoFirstQuartile,
    AdVideoMidpoint,
    AdVideoThirdQuartile,
    AdVideoComplete,
    AdClickThru,
    AdPaused,
    AdPlaying,
    AdResumed,
    AdError,
}

impl AdEvent {
    pub const ALL: [AdEvent; 22] = [
        AdEvent::AdLoaded,
        AdEvent::AdStarted,
        AdEvent::AdStopped,
        AdEvent::AdSkipped,
        AdEvent::AdSkippableStateChange,
        AdEvent::AdSizeChange,
        AdEvent::AdLinearChange,
        AdEvent::AdDurationChange,
        AdEvent::AdExpanded,
        AdEvent::AdRemainingTimeChange,
        AdEvent::AdVolumeChange,
        AdEvent::AdImpression,
        AdEvent::AdVideoStart,
        AdEvent::AdVideoFirstQuartile,
        AdEvent::AdVideoMidpoint,
        AdEvent::AdVideoThirdQuartile,
        AdEvent::AdVideoComplete,
        AdEvent::AdClickThru,
        AdEvent::AdPaused,
        AdEvent::AdPlaying,
        AdEvent::AdResumed,
        AdEvent::AdError,
    ];

    /// The event name as it appears on the wire of the ad contract
    pub fn as_str(&self) -> &'static str {
        match self {
            AdEvent::AdLoaded => "AdLoaded",
            AdEvent::AdStarted => "AdStarted",
            AdEvent::AdStopped => "AdStopped",
            AdEvent::AdSkipped => "AdSkipped",
            AdEvent::AdSkippableStateChange => "AdSkippableStateChange",
            AdEvent::AdSizeChange => "AdSizeChange",
            AdEvent::AdLinearChange => "AdLinearChange",
            AdEvent::AdDurationChange => "AdDurationChange",
            AdEvent::AdExpanded => "AdExpanded",
            AdEvent::AdRemainingTimeChange => "AdRemainingTimeChange",
            AdEvent::AdVolumeChange => "AdVolumeChange",
            AdEvent::AdImpression => "AdImpression",
            AdEvent::AdVideoStart => "AdVideoStart",
            AdEvent::AdVideoFirstQuartile => "AdVideoFirstQuartile",
            AdEvent::AdVideoMidpoint => "AdVideoMidpoint",
            AdEvent::AdVideoThirdQuartile => "AdVideoThirdQuartile",
            AdEvent::AdVideoComplete => "AdVideoComplete",
            AdEvent::AdClickThru => "AdClickThru",
            AdEvent::AdPaused => "AdPaused",
            AdEvent::AdPlaying => "AdPlaying",
            AdEvent::AdResumed => "AdResumed",
            AdEvent::AdError => "AdError",
        }
    }
}

impl fmt::Display for AdEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdEvent {
    type Err = VpaidError;

    fn from_str(name: &str) -> Result<Self> {
        AdEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == name)
            .ok_or_else(|| VpaidError::UnknownEvent(name.to_string()))
    }
}

type Callback = Box<dyn FnMut()>;

/// Subscription table with one callback slot per event name
///
/// Subscribing twice to the same name replaces the first callback.
/// Unsubscribing clears the slot but keeps the name in the table.
#[derive(Default)]
pub struct EventDispatcher {
    slots: HashMap<String, Option<Callback>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `callback` to `context` and store it under `event_name`
    pub fn subscribe<C, F>(&mut self, mut callback: F, event_name: &str, context: C)
    where
        C: 'static,
        F: FnMut(&C) + 'static,
    {
        let bound: Callback = Box::new(move || callback(&context));
        if let Some(Some(_)) = self.slots.insert(event_name.to_string(), Some(bound)) {
            debug!("Replaced existing subscription for {}", event_name);
        }
    }

    /// Clear the slot for `event_name`
    pub fn unsubscribe(&mut self, event_name: &str) {
        self.slots.insert(event_name.to_string(), None);
    }

    /// Invoke the callback stored under `event_name`, if any
    ///
    /// Returns whether a callback ran. An empty slot is not an error.
    pub fn emit(&mut self, event_name: &str) -> bool {
        match self.slots.get_mut(event_name) {
            Some(Some(callback)) => {
                callback();
                true
            }
            _ => false,
        }
    }

    /// Whether a callback is currently registered for `event_name`
    pub fn is_subscribed(&self, event_name: &str) -> bool {
        matches!(self.slots.get(event_name), Some(Some(_)))
    }

    /// Whether `event_name` has ever been subscribed or unsubscribed
    #[cfg(test)]
    fn has_slot(&self, event_name: &str) -> bool {
        self.slots.contains_key(event_name)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<(&str, bool)> = self
            .slots
            .iter()
            .map(|(name, slot)| (name.as_str(), slot.is_some()))
            .collect();
        names.sort();
        f.debug_struct("EventDispatcher").field("slots", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_emit_invokes_callback_once_with_context() {
        let calls = recorder();
        let mut dispatcher = EventDispatcher::new();

        let sink = Rc::clone(&calls);
        dispatcher.subscribe(
            move |context: &String| sink.borrow_mut().push(context.clone()),
            "AdLoaded",
            "player-1".to_string(),
        );

        assert!(dispatcher.emit("AdLoaded"));
        assert_eq!(*calls.borrow(), vec!["player-1".to_string()]);
    }

    #[test]
    fn test_resubscribe_overwrites_previous_callback() {
        let calls = recorder();
        let mut dispatcher = EventDispatcher::new();

        let first = Rc::clone(&calls);
        dispatcher.subscribe(move |_: &()| first.borrow_mut().push("first".into()), "AdStarted", ());
        let second = Rc::clone(&calls);
        dispatcher.subscribe(move |_: &()| second.borrow_mut().push("second".into()), "AdStarted", ());

        dispatcher.emit("AdStarted");
        assert_eq!(*calls.borrow(), vec!["second".to_string()]);
    }

    #[test]
    fn test_unsubscribe_clears_slot_but_keeps_name() {
        let calls = recorder();
        let mut dispatcher = EventDispatcher::new();

        let sink = Rc::clone(&calls);
        dispatcher.subscribe(move |_: &()| sink.borrow_mut().push("paused".into()), "AdPaused", ());
        dispatcher.unsubscribe("AdPaused");

        assert!(!dispatcher.emit("AdPaused"));
        assert!(calls.borrow().is_empty());
        assert!(dispatcher.has_slot("AdPaused"));
        assert!(!dispatcher.is_subscribed("AdPaused"));
    }

    #[test]
    fn test_emit_and_unsubscribe_without_registration_are_noops() {
        let mut dispatcher = EventDispatcher::new();
        assert!(!dispatcher.emit("AdSkipped"));

        dispatcher.unsubscribe("AdSkipped");
        assert!(!dispatcher.emit("AdSkipped"));
    }

    #[test]
    fn test_callback_state_persists_between_emits() {
        let mut dispatcher = EventDispatcher::new();
        let counter = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&counter);
        let mut seen = 0;
        dispatcher.subscribe(
            move |step: &u32| {
                seen += step;
                *sink.borrow_mut() = seen;
            },
            "AdVolumeChange",
            5u32,
        );

        dispatcher.emit("AdVolumeChange");
        dispatcher.emit("AdVolumeChange");
        assert_eq!(*counter.borrow(), 10);
    }

    #[test]
    fn test_event_names() {
        assert_eq!("AdVideoMidpoint".parse::<AdEvent>().unwrap(), AdEvent::AdVideoMidpoint);
        assert_eq!(AdEvent::AdClickThru.to_string(), "AdClickThru");
        assert!(matches!(
            "AdWhatever".parse::<AdEvent>(),
            Err(VpaidError::UnknownEvent(name)) if name == "AdWhatever"
        ));
    }
}
