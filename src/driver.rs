//! The boundary between the lifecycle core and the underlying media engine.
//!
//! The lifecycle layer owns reference counting, threads, and teardown order;
//! everything engine-specific sits behind [`EngineDriver`]. The production
//! driver lives in [`crate::media`]; tests substitute stubs.

use crate::error::Result;
use crate::runtime::ThreadTrio;

/// Maximum DTLS protocol version for the secure transport profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslVersion {
    Dtls10,
    Dtls12,
}

/// Fixed transport security profile applied to every factory.
///
/// These are invariants of the engine, not caller tunables: encryption stays
/// on, the protocol version is pinned, and AEAD-GCM SRTP suites are offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityOptions {
    pub disable_encryption: bool,
    pub max_ssl_version: SslVersion,
    pub enable_gcm_crypto_suites: bool,
}

impl Default for SecurityOptions {
    fn default() -> Self {
        Self {
            disable_encryption: false,
            max_ssl_version: SslVersion::Dtls12,
            enable_gcm_crypto_suites: true,
        }
    }
}

/// Everything a driver needs to assemble its factory: the running threads,
/// the audio device already created on the worker thread, and the fixed
/// security profile.
pub struct FactoryContext<'a, D: EngineDriver> {
    pub threads: &'a ThreadTrio,
    pub audio_device: &'a D::AudioDevice,
    pub security: &'a SecurityOptions,
}

/// The black-box engine consumed by the lifecycle core.
///
/// Thread placement is the caller's contract: `create_audio_device` and
/// `destroy_audio_device` are always invoked on the worker thread, and
/// `create_factory` runs once per instance with all three threads confirmed
/// running.
pub trait EngineDriver: Send + Sync + 'static {
    /// The engine factory handle cached for the instance's lifetime.
    type Factory: Send + Sync + 'static;

    /// Opaque audio device handle with worker-thread affinity.
    type AudioDevice: Send + Sync + 'static;

    /// Process-wide secure-transport initialization. Runs on the first
    /// acquisition of an epoch, before any instance state exists.
    fn init_transport(&self) -> Result<()>;

    /// Process-wide secure-transport teardown. Runs after the last instance
    /// of an epoch is gone.
    fn cleanup_transport(&self);

    /// Create the audio device. Invoked on the worker thread.
    fn create_audio_device(&self) -> Result<Self::AudioDevice>;

    /// Release the audio device. Invoked on the worker thread.
    fn destroy_audio_device(&self, device: Self::AudioDevice);

    /// Assemble the dependency bundle and build the factory. Invoked exactly
    /// once per instance; failures abort instance construction.
    fn create_factory(&self, ctx: FactoryContext<'_, Self>) -> Result<Self::Factory>
    where
        Self: Sized;
}
