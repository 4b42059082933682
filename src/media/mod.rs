//! The production engine: the webrtc-rs-backed driver and its dependencies.

mod audio;
mod driver;
mod event_log;
mod factory;
mod video;

pub use audio::{AudioBackend, AudioDeviceModule, AudioProcessingConfig};
pub use driver::WebRtcDriver;
pub use event_log::{EventLog, RtcEvent};
pub use factory::WebRtcFactory;
pub use video::{DefaultVideoFactoryConfig, VideoCodec, VideoFactoryConfig};
