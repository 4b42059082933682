//! A single engine instance: the threads, the audio device, and the factory
//! built from them.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::driver::{EngineDriver, FactoryContext, SecurityOptions};
use crate::error::Result;
use crate::runtime::{LifecycleObserver, ThreadTrio};

/// One generation of the shared engine.
///
/// Construction brings the three threads up, creates the audio device on the
/// worker thread, and builds the factory from the assembled dependencies.
/// Teardown mirrors it in reverse: factory first, then the device back on
/// the worker thread, then the threads.
pub struct EngineInstance<D: EngineDriver> {
    driver: Arc<D>,
    threads: ThreadTrio,
    audio_device: Option<D::AudioDevice>,
    factory: Option<D::Factory>,
}

impl<D: EngineDriver> EngineInstance<D> {
    pub(crate) fn new(
        driver: Arc<D>,
        security: &SecurityOptions,
        observer: Option<Arc<dyn LifecycleObserver>>,
    ) -> Result<Self> {
        let threads = ThreadTrio::start(observer)?;

        // The device has single-thread affinity; create it where it will
        // live and die. At most one device exists per instance.
        let device_driver = Arc::clone(&driver);
        let audio_device = threads
            .worker()
            .blocking_call(move || device_driver.create_audio_device())??;

        let built = driver.create_factory(FactoryContext {
            threads: &threads,
            audio_device: &audio_device,
            security,
        });
        let factory = match built {
            Ok(factory) => factory,
            Err(err) => {
                // Unwind in teardown order so a failed construction leaves
                // nothing behind.
                let destroy_driver = Arc::clone(&driver);
                let returned = threads
                    .worker()
                    .blocking_call(move || destroy_driver.destroy_audio_device(audio_device));
                if returned.is_err() {
                    warn!("worker thread unavailable during construction unwind");
                }
                threads.stop();
                return Err(err);
            }
        };

        debug!("engine instance constructed");
        Ok(Self {
            driver,
            threads,
            audio_device: Some(audio_device),
            factory: Some(factory),
        })
    }

    /// The engine factory for this instance. Present for the whole lifetime
    /// of the instance as observed through handles.
    pub fn factory(&self) -> &D::Factory {
        self.factory.as_ref().expect("factory is present until teardown")
    }

    /// The runtime threads backing this instance.
    pub fn threads(&self) -> &ThreadTrio {
        &self.threads
    }
}

impl<D: EngineDriver> Drop for EngineInstance<D> {
    fn drop(&mut self) {
        // Release the factory before anything it depends on.
        self.factory = None;

        if let Some(device) = self.audio_device.take() {
            // Device teardown must also run on its owning thread.
            let driver = Arc::clone(&self.driver);
            let returned = self
                .threads
                .worker()
                .blocking_call(move || driver.destroy_audio_device(device));
            if returned.is_err() {
                warn!("worker thread unavailable; audio device released off its owning thread");
            }
        }

        self.threads.stop();
        debug!("engine instance torn down");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct FailingDriver {
        devices_created: AtomicUsize,
        devices_destroyed: AtomicUsize,
    }

    impl EngineDriver for FailingDriver {
        type Factory = ();
        type AudioDevice = ();

        fn init_transport(&self) -> Result<()> {
            Ok(())
        }

        fn cleanup_transport(&self) {}

        fn create_audio_device(&self) -> Result<()> {
            self.devices_created.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn destroy_audio_device(&self, _device: ()) {
            self.devices_destroyed.fetch_add(1, Ordering::SeqCst);
        }

        fn create_factory(&self, _ctx: FactoryContext<'_, Self>) -> Result<()> {
            Err(Error::MediaEngine("assembly failed".to_string()))
        }
    }

    #[test]
    fn failed_factory_construction_unwinds_device() {
        let driver = Arc::new(FailingDriver::default());
        let result = EngineInstance::new(Arc::clone(&driver), &SecurityOptions::default(), None);
        assert!(result.is_err());
        assert_eq!(driver.devices_created.load(Ordering::SeqCst), 1);
        assert_eq!(driver.devices_destroyed.load(Ordering::SeqCst), 1);
    }
}
