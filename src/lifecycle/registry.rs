//! The reference-counted slot holding the shared engine instance.
//!
//! A registry owns at most one live [`EngineInstance`] at a time. Handles
//! are the unit of access: acquiring returns a handle, cloning a handle is
//! an additional acquisition, and dropping the last handle tears the
//! instance down. The count and the slot always agree because every
//! transition happens under one lock.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::instance::EngineInstance;
use crate::driver::{EngineDriver, SecurityOptions};
use crate::error::Result;
use crate::runtime::{LifecycleObserver, ThreadTrio};

struct Slot<D: EngineDriver> {
    holders: usize,
    instance: Option<Arc<EngineInstance<D>>>,
}

/// Reference-counted lifecycle for the shared engine.
///
/// The first acquisition of an epoch initializes the secure transport and
/// constructs the instance; the last release tears the instance down and
/// cleans the secure transport up. Intermediate acquisitions and releases
/// only move the count.
pub struct FactoryRegistry<D: EngineDriver> {
    driver: Arc<D>,
    security: SecurityOptions,
    observer: Option<Arc<dyn LifecycleObserver>>,
    slot: Mutex<Slot<D>>,
}

impl<D: EngineDriver> FactoryRegistry<D> {
    pub fn new(driver: D) -> Arc<Self> {
        Self::with_options(driver, SecurityOptions::default(), None)
    }

    pub fn with_options(
        driver: D,
        security: SecurityOptions,
        observer: Option<Arc<dyn LifecycleObserver>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            driver: Arc::new(driver),
            security,
            observer,
            slot: Mutex::new(Slot {
                holders: 0,
                instance: None,
            }),
        })
    }

    /// Claim shared access to the engine.
    ///
    /// The whole increment-and-maybe-construct sequence runs under one lock,
    /// so concurrent callers during a cold start serialize and all observe
    /// the single instance built by whichever of them got there first.
    ///
    /// A construction failure rolls back completely: the count stays at
    /// zero, the secure transport is cleaned up, and the registry remains
    /// usable for a later attempt.
    pub fn acquire(self: &Arc<Self>) -> Result<EngineHandle<D>> {
        let mut slot = self.slot.lock();
        let instance = match &slot.instance {
            Some(existing) => Arc::clone(existing),
            None => {
                debug_assert_eq!(slot.holders, 0);
                self.driver.init_transport()?;
                let instance = match EngineInstance::new(
                    Arc::clone(&self.driver),
                    &self.security,
                    self.observer.clone(),
                ) {
                    Ok(instance) => Arc::new(instance),
                    Err(err) => {
                        self.driver.cleanup_transport();
                        return Err(err);
                    }
                };
                info!("shared engine instance created");
                slot.instance = Some(Arc::clone(&instance));
                instance
            }
        };
        slot.holders += 1;
        debug!(holders = slot.holders, "engine acquired");
        Ok(EngineHandle {
            registry: Arc::clone(self),
            instance: Some(instance),
        })
    }

    /// Current number of outstanding handles.
    pub fn holders(&self) -> usize {
        self.slot.lock().holders
    }

    /// Whether a live instance exists right now.
    pub fn is_active(&self) -> bool {
        self.slot.lock().instance.is_some()
    }

    fn release(&self, instance: Arc<EngineInstance<D>>) {
        let mut slot = self.slot.lock();
        // Surrender the handle's claim inside the critical section so the
        // teardown below drops the final reference.
        drop(instance);
        slot.holders -= 1;
        debug!(holders = slot.holders, "engine released");
        if slot.holders == 0 {
            // Instance teardown runs here, before the transport state it
            // depends on is cleaned up.
            slot.instance = None;
            self.driver.cleanup_transport();
            info!("shared engine instance torn down");
        }
    }
}

/// Counted handle to the shared engine.
///
/// Each handle is one claim on the instance. `Clone` takes an additional
/// claim; `Drop` releases it. There is no way to reach the factory without
/// holding a claim, so use-after-release is unrepresentable.
pub struct EngineHandle<D: EngineDriver> {
    registry: Arc<FactoryRegistry<D>>,
    instance: Option<Arc<EngineInstance<D>>>,
}

impl<D: EngineDriver> EngineHandle<D> {
    /// The engine factory for the current epoch.
    pub fn factory(&self) -> &D::Factory {
        self.instance().factory()
    }

    /// The runtime threads backing the current instance.
    pub fn threads(&self) -> &ThreadTrio {
        self.instance().threads()
    }

    fn instance(&self) -> &EngineInstance<D> {
        self.instance
            .as_ref()
            .expect("handle holds its instance until drop")
    }
}

impl<D: EngineDriver> std::fmt::Debug for EngineHandle<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("active", &self.instance.is_some())
            .finish()
    }
}

impl<D: EngineDriver> Clone for EngineHandle<D> {
    fn clone(&self) -> Self {
        let mut slot = self.registry.slot.lock();
        slot.holders += 1;
        debug!(holders = slot.holders, "engine acquired (clone)");
        Self {
            registry: Arc::clone(&self.registry),
            instance: self.instance.clone(),
        }
    }
}

impl<D: EngineDriver> Drop for EngineHandle<D> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.registry.release(instance);
        }
    }
}
