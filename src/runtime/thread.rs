//! Dedicated engine threads and the cross-thread dispatch primitive.
//!
//! Each [`EngineThread`] is a named OS thread draining a job mailbox.
//! [`EngineThread::blocking_call`] is the synchronous request/response
//! primitive used for work that must run on a specific thread (the audio
//! device has worker-thread affinity); the wait is bounded so a wedged
//! thread surfaces as an error instead of a hang.

use std::fmt;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Upper bound on a cross-thread blocking call.
pub const BLOCKING_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on waiting for a spawned thread to enter its run loop.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// The three dedicated execution contexts the engine runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadRole {
    /// Owns socket and event-polling work.
    Network,
    /// Runs blocking media work; the audio device lives here.
    Worker,
    /// Runs session negotiation callbacks.
    Signaling,
}

impl ThreadRole {
    /// Stable short name, also used as the OS thread name.
    pub fn thread_name(self) -> &'static str {
        match self {
            ThreadRole::Network => "rtc-net",
            ThreadRole::Worker => "rtc-worker",
            ThreadRole::Signaling => "rtc-signal",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThreadRole::Network => "network",
            ThreadRole::Worker => "worker",
            ThreadRole::Signaling => "signaling",
        }
    }
}

impl fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Job {
    Run(Box<dyn FnOnce() + Send + 'static>),
    Stop,
}

/// Cheap cloneable handle for posting work onto an engine thread's queue.
///
/// Outlives the thread gracefully: posting to a stopped thread returns
/// [`Error::ThreadUnavailable`].
#[derive(Clone)]
pub struct TaskQueue {
    role: ThreadRole,
    tx: Sender<Job>,
}

impl TaskQueue {
    pub fn role(&self) -> ThreadRole {
        self.role
    }

    /// Enqueue a job, fire and forget.
    pub fn post(&self, f: impl FnOnce() + Send + 'static) -> Result<()> {
        self.tx
            .send(Job::Run(Box::new(f)))
            .map_err(|_| Error::ThreadUnavailable(self.role))
    }
}

/// A dedicated, named OS thread running a job mailbox.
pub struct EngineThread {
    role: ThreadRole,
    tx: Sender<Job>,
    thread_id: ThreadId,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl EngineThread {
    /// Spawn the thread and wait until its run loop is confirmed running.
    pub(crate) fn spawn(role: ThreadRole) -> Result<Self> {
        let (tx, rx) = unbounded::<Job>();
        let (ready_tx, ready_rx) = bounded::<ThreadId>(1);
        let join = thread::Builder::new()
            .name(role.thread_name().to_string())
            .spawn(move || run_loop(role, rx, ready_tx))
            .map_err(|e| Error::ThreadStart {
                role,
                reason: e.to_string(),
            })?;
        let thread_id = ready_rx
            .recv_timeout(STARTUP_TIMEOUT)
            .map_err(|_| Error::ThreadStart {
                role,
                reason: "run loop did not come up".to_string(),
            })?;
        debug!(role = role.as_str(), "engine thread running");
        Ok(Self {
            role,
            tx,
            thread_id,
            join: Mutex::new(Some(join)),
        })
    }

    pub fn role(&self) -> ThreadRole {
        self.role
    }

    /// Whether the caller is already running on this thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Handle for posting work onto this thread's queue.
    pub fn queue(&self) -> TaskQueue {
        TaskQueue {
            role: self.role,
            tx: self.tx.clone(),
        }
    }

    /// Enqueue a job, fire and forget.
    pub fn post(&self, f: impl FnOnce() + Send + 'static) -> Result<()> {
        self.tx
            .send(Job::Run(Box::new(f)))
            .map_err(|_| Error::ThreadUnavailable(self.role))
    }

    /// Run `f` on this thread and wait for its result.
    ///
    /// Calls from the owning thread itself run inline; a blocking round trip
    /// to our own mailbox would deadlock. The wait is bounded by
    /// [`BLOCKING_CALL_TIMEOUT`].
    pub fn blocking_call<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.is_current() {
            return Ok(f());
        }
        let (resp_tx, resp_rx) = bounded::<R>(1);
        self.post(move || {
            let _ = resp_tx.send(f());
        })?;
        resp_rx
            .recv_timeout(BLOCKING_CALL_TIMEOUT)
            .map_err(|e| match e {
                RecvTimeoutError::Timeout => Error::DispatchTimeout {
                    role: self.role,
                    waited_ms: BLOCKING_CALL_TIMEOUT.as_millis(),
                },
                RecvTimeoutError::Disconnected => Error::ThreadUnavailable(self.role),
            })
    }

    /// Stop the run loop and join the thread.
    ///
    /// Idempotent; returns whether this call performed the stop. Blocks until
    /// the run loop has fully exited.
    pub fn stop(&self) -> bool {
        let Some(join) = self.join.lock().take() else {
            return false;
        };
        let _ = self.tx.send(Job::Stop);
        if join.join().is_err() {
            warn!(role = self.role.as_str(), "engine thread panicked before join");
        }
        debug!(role = self.role.as_str(), "engine thread stopped");
        true
    }
}

impl Drop for EngineThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(role: ThreadRole, rx: Receiver<Job>, ready_tx: Sender<ThreadId>) {
    if ready_tx.send(thread::current().id()).is_err() {
        return;
    }
    while let Ok(job) = rx.recv() {
        match job {
            Job::Run(f) => f(),
            Job::Stop => break,
        }
    }
    debug!(role = role.as_str(), "engine thread run loop exited");
}
