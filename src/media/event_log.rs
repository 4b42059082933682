//! RTC event logging over a task-queue handle.
//!
//! Events are posted onto one of the engine's queues and emitted there as
//! `tracing` events, keeping formatting and subscriber work off the caller's
//! thread. Logging is best effort: once the owning thread stops, events are
//! dropped silently.

use tracing::{debug, info};

use crate::runtime::TaskQueue;

/// Structured engine events.
#[derive(Debug, Clone)]
pub enum RtcEvent {
    /// The engine factory finished construction.
    FactoryCreated,
    /// A peer connection was created from the factory.
    PeerConnectionCreated { connection_id: String },
}

/// Event sink bound to a task queue.
pub struct EventLog {
    queue: TaskQueue,
}

impl EventLog {
    pub fn new(queue: TaskQueue) -> Self {
        Self { queue }
    }

    /// Queue an event for emission. Never blocks the caller.
    pub fn emit(&self, event: RtcEvent) {
        let _ = self.queue.post(move || emit_now(&event));
    }
}

fn emit_now(event: &RtcEvent) {
    match event {
        RtcEvent::FactoryCreated => {
            info!(target: "rtc_engine::events", "engine factory created");
        }
        RtcEvent::PeerConnectionCreated { connection_id } => {
            debug!(
                target: "rtc_engine::events",
                connection_id = %connection_id,
                "peer connection created"
            );
        }
    }
}
