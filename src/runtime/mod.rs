//! Dedicated runtime threads for the engine.

mod thread;
mod trio;

pub use thread::{EngineThread, TaskQueue, ThreadRole, BLOCKING_CALL_TIMEOUT};
pub use trio::{LifecycleObserver, ThreadTrio};
