//! The three dedicated execution contexts backing an engine instance.

use std::sync::Arc;

use tracing::debug;

use super::thread::{EngineThread, ThreadRole};
use crate::error::Result;

/// Instrumentation hooks for thread lifecycle transitions.
///
/// All methods default to no-ops; implement only what you observe.
pub trait LifecycleObserver: Send + Sync {
    /// The thread's run loop is confirmed running.
    fn thread_started(&self, role: ThreadRole) {
        let _ = role;
    }

    /// The thread's run loop has exited and the thread was joined.
    fn thread_stopped(&self, role: ThreadRole) {
        let _ = role;
    }
}

/// Owns the network, worker, and signaling threads for one engine instance.
///
/// Start order is network, then worker, then signaling; each is confirmed
/// running before the next is spawned, so by the time `start` returns every
/// queue accepts work. Stop order is worker, then signaling, then network;
/// the network thread goes last because resources quiescing during the other
/// stops may still touch it.
pub struct ThreadTrio {
    network: EngineThread,
    worker: EngineThread,
    signaling: EngineThread,
    observer: Option<Arc<dyn LifecycleObserver>>,
}

impl ThreadTrio {
    pub fn start(observer: Option<Arc<dyn LifecycleObserver>>) -> Result<Self> {
        let network = Self::spawn_thread(ThreadRole::Network, &observer)?;
        let worker = Self::spawn_thread(ThreadRole::Worker, &observer)?;
        let signaling = Self::spawn_thread(ThreadRole::Signaling, &observer)?;
        debug!("all engine threads running");
        Ok(Self {
            network,
            worker,
            signaling,
            observer,
        })
    }

    fn spawn_thread(
        role: ThreadRole,
        observer: &Option<Arc<dyn LifecycleObserver>>,
    ) -> Result<EngineThread> {
        let thread = EngineThread::spawn(role)?;
        if let Some(observer) = observer {
            observer.thread_started(role);
        }
        Ok(thread)
    }

    pub fn network(&self) -> &EngineThread {
        &self.network
    }

    pub fn worker(&self) -> &EngineThread {
        &self.worker
    }

    pub fn signaling(&self) -> &EngineThread {
        &self.signaling
    }

    /// Stop all three threads. Idempotent; blocks until each run loop has
    /// fully exited.
    pub fn stop(&self) {
        self.stop_thread(&self.worker);
        self.stop_thread(&self.signaling);
        self.stop_thread(&self.network);
    }

    fn stop_thread(&self, thread: &EngineThread) {
        if thread.stop() {
            if let Some(observer) = &self.observer {
                observer.thread_stopped(thread.role());
            }
        }
    }
}

impl Drop for ThreadTrio {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl LifecycleObserver for Recorder {
        fn thread_started(&self, role: ThreadRole) {
            self.0.lock().unwrap().push(format!("started:{role}"));
        }

        fn thread_stopped(&self, role: ThreadRole) {
            self.0.lock().unwrap().push(format!("stopped:{role}"));
        }
    }

    #[test]
    fn start_and_stop_order() {
        let recorder = Arc::new(Recorder::default());
        let trio = ThreadTrio::start(Some(recorder.clone())).unwrap();
        trio.stop();
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "started:network",
                "started:worker",
                "started:signaling",
                "stopped:worker",
                "stopped:signaling",
                "stopped:network",
            ]
        );
    }

    #[test]
    fn stop_twice_fires_observer_once() {
        let recorder = Arc::new(Recorder::default());
        let trio = ThreadTrio::start(Some(recorder.clone())).unwrap();
        trio.stop();
        trio.stop();
        assert_eq!(recorder.0.lock().unwrap().len(), 6);
    }

    #[test]
    fn drop_stops_threads() {
        let recorder = Arc::new(Recorder::default());
        let trio = ThreadTrio::start(Some(recorder.clone())).unwrap();
        drop(trio);
        let events = recorder.0.lock().unwrap();
        assert!(events.contains(&"stopped:network".to_string()));
    }
}
