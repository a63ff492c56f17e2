pub mod ad_unit;
pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod host;
pub mod models;
pub mod parser;
pub mod scheduler;

pub use ad_unit::{VpaidAd, VPAID_VERSION};
pub use config::AdUnitConfig;
pub use environment::{AdSlot, CanPlay, EnvironmentVars, VideoSlot};
pub use error::{Result, VpaidError};
pub use events::{AdEvent, EventDispatcher};
pub use models::{AdAttributes, AdParameters, AdState, CreativeData, MediaSource, Presentation, ViewMode};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};

/// Create a fresh ad unit driven by the Tokio timer, the counterpart of `getVPAIDAd()`
///
/// Must be used from inside a `tokio::task::LocalSet`, since `stopAd` spawns a local task.
pub fn get_vpaid_ad(config: AdUnitConfig) -> VpaidAd {
    VpaidAd::with_config(config, TokioScheduler::new())
}
