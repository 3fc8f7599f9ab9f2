//! Order-preserving task execution.
//!
//! Parsing and execution are decoupled so a slow command never stalls the
//! reading of subsequent commands, but the protocol still requires results in
//! the order commands were issued. [`SerialExecutor`] is the narrow waist
//! that squares these: tasks from any thread run to completion one at a time,
//! strictly in submission order, on a single worker thread.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::error;

const QUEUE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::queue");

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Inner {
    tasks: VecDeque<Task>,
    running: bool,
    shutdown: bool,
}

struct State {
    inner: Mutex<Inner>,
    signal: Condvar,
}

impl State {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The worker catches panics, so poisoning indicates a bug in this
        // module rather than in a task; recover instead of cascading.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// FIFO, single-concurrency task runner.
///
/// Guarantees: at most one task runs at a time; tasks run in submission
/// order regardless of which thread submitted them; a panicking task is
/// logged and the queue advances. No cancellation is provided - a task that
/// never completes stalls the queue and therefore stalls [`drain`].
///
/// [`drain`]: SerialExecutor::drain
pub struct SerialExecutor {
    state: Arc<State>,
    worker: Option<JoinHandle<()>>,
}

impl SerialExecutor {
    /// Creates the executor and spawns its worker thread.
    pub fn new() -> Self {
        let state = Arc::new(State {
            inner: Mutex::new(Inner {
                tasks: VecDeque::new(),
                running: false,
                shutdown: false,
            }),
            signal: Condvar::new(),
        });
        let worker_state = Arc::clone(&state);
        let worker = thread::spawn(move || run_worker(&worker_state));
        Self {
            state,
            worker: Some(worker),
        }
    }

    /// Enqueues a task; may be called concurrently from any thread.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) {
        {
            let mut inner = self.state.lock();
            inner.tasks.push_back(Box::new(task));
        }
        self.state.signal.notify_all();
    }

    /// Blocks until every submitted task has run to completion, including
    /// tasks submitted by tasks that were running when the call started.
    pub fn drain(&self) {
        let mut inner = self.state.lock();
        while !inner.tasks.is_empty() || inner.running {
            inner = self
                .state
                .signal
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Default for SerialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        {
            let mut inner = self.state.lock();
            inner.shutdown = true;
        }
        self.state.signal.notify_all();
        if let Some(worker) = self.worker.take() {
            // The worker finishes queued tasks before exiting, so already
            // accepted work is not lost on teardown.
            let _ = worker.join();
        }
    }
}

fn run_worker(state: &State) {
    loop {
        let task = {
            let mut inner = state.lock();
            loop {
                if let Some(task) = inner.tasks.pop_front() {
                    inner.running = true;
                    break Some(task);
                }
                if inner.shutdown {
                    break None;
                }
                inner = state
                    .signal
                    .wait(inner)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };
        let Some(task) = task else {
            return;
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            error!(
                target: QUEUE_TARGET,
                panic = panic_message(payload.as_ref()),
                "queued task panicked; advancing queue"
            );
        }
        {
            let mut inner = state.lock();
            inner.running = false;
        }
        state.signal.notify_all();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
