//! Shared WebRTC engine factory with a reference-counted lifecycle.
//!
//! The underlying engine wants a fixed environment: three dedicated threads
//! (network, worker, signaling), an audio device pinned to the worker
//! thread, and a factory assembled once from a bundle of providers. This
//! crate owns that environment process-wide and hands out counted access:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  callers (any thread)                                │
//! │    acquire() ──► EngineHandle (counted claim)        │
//! │                    │                                 │
//! │  FactoryRegistry ──┴─► EngineInstance (one / epoch)  │
//! │  ├─ ThreadTrio (network / worker / signaling)        │
//! │  ├─ AudioDeviceModule (worker-thread affinity)       │
//! │  └─ WebRtcFactory (peer connection creation)         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The first acquisition of an epoch initializes the secure transport,
//! starts the threads, and builds the factory; the last release tears it
//! all down in reverse. Handles are the only access path, so a released
//! engine cannot be used by construction.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> rtc_engine::Result<()> {
//! let engine = rtc_engine::acquire()?;
//! let connection = engine.factory().create_peer_connection().await?;
//! # let _ = connection;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod driver;
pub mod error;
pub mod lifecycle;
pub mod media;
pub mod runtime;

use std::sync::{Arc, OnceLock};

pub use config::{EngineConfig, TurnServerConfig, DEFAULT_STUN_SERVER};
pub use driver::{EngineDriver, FactoryContext, SecurityOptions, SslVersion};
pub use error::{Error, Result};
pub use lifecycle::{EngineHandle, EngineInstance, FactoryRegistry};
pub use media::{
    AudioBackend, AudioDeviceModule, AudioProcessingConfig, DefaultVideoFactoryConfig, EventLog,
    RtcEvent, VideoCodec, VideoFactoryConfig, WebRtcDriver, WebRtcFactory,
};
pub use runtime::{
    EngineThread, LifecycleObserver, TaskQueue, ThreadRole, ThreadTrio, BLOCKING_CALL_TIMEOUT,
};

// Process-wide registry backing `acquire`.
static DEFAULT_REGISTRY: OnceLock<Arc<FactoryRegistry<WebRtcDriver>>> = OnceLock::new();

/// The process-wide registry wired to the production driver.
///
/// Lazily initialized on first access; embedders needing a custom driver or
/// connection context build their own [`FactoryRegistry`] instead.
pub fn default_registry() -> &'static Arc<FactoryRegistry<WebRtcDriver>> {
    DEFAULT_REGISTRY.get_or_init(|| FactoryRegistry::new(WebRtcDriver::default()))
}

/// Claim shared access to the process-wide engine.
///
/// The returned handle shares one engine instance with every other
/// outstanding handle; dropping the last one tears the instance down.
pub fn acquire() -> Result<EngineHandle<WebRtcDriver>> {
    default_registry().acquire()
}

/// Get the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
