//! Delayed task dispatcher for the foreground execution context.
//!
//! The shell owns a single logical foreground thread; everything that is
//! allowed to touch UI-visible state runs there. The dispatcher provides
//! the three operations the rest of the core is built on:
//!
//! ```text
//!   run(task)               — synchronous when already on the foreground
//!                             thread, FIFO-enqueued otherwise
//!   run_later(task, delay)  — always enqueued, never synchronous
//!   cancel(task)            — best-effort removal before execution
//! ```
//!
//! **Invariants:**
//! - A submitted task executes at most once per submission.
//! - `run_later` with zero delay still defers past all currently queued
//!   foreground work.
//! - Cancellation races only against dequeue-for-execution — once a task
//!   has started it always completes.
//! - Task identity is reference equality of the submitted work item, not
//!   a generated token.
//!
//! The pending-task collection is the only shared mutable resource in the
//! core: enqueue and cancel from any thread, dequeue/execute only on the
//! foreground thread (multi-producer, single-consumer under one mutex).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

/// A unit of work submitted to the [`Dispatcher`].
///
/// Cloning a `Task` clones the handle, not the work: all clones share one
/// identity, and that identity is what [`Dispatcher::cancel`] matches on.
/// The same handle may be resubmitted after it has executed.
#[derive(Clone)]
pub struct Task(Arc<dyn Fn() + Send + Sync + 'static>);

impl Task {
    /// Wrap a closure as a dispatchable task.
    pub fn new(work: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(work))
    }

    /// Two handles are the same task iff they share the submitted work item.
    pub fn same(&self, other: &Task) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn invoke(&self) {
        (self.0)();
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({:p})", Arc::as_ptr(&self.0))
    }
}

struct Pending {
    due: Instant,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Queue {
    ready: VecDeque<Task>,
    delayed: Vec<Pending>,
    next_seq: u64,
    closed: bool,
}

impl Queue {
    /// Move every due delayed entry to the back of the ready queue,
    /// ordered by (due, submission order).
    fn promote_due(&mut self, now: Instant) {
        if self.delayed.is_empty() {
            return;
        }
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.delayed.len() {
            if self.delayed[i].due <= now {
                due.push(self.delayed.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.seq));
        self.ready.extend(due.into_iter().map(|p| p.task));
    }

    fn next_due(&self) -> Option<Instant> {
        self.delayed.iter().map(|p| p.due).min()
    }
}

struct Inner {
    queue: Mutex<Queue>,
    available: Condvar,
    foreground: OnceLock<ThreadId>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        // The mutex is only held for queue bookkeeping; tasks run outside
        // it, so a poisoned queue is still structurally sound.
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_foreground(&self) -> bool {
        self.foreground.get() == Some(&thread::current().id())
    }

    fn run(&self, task: Task) {
        if self.is_foreground() {
            task.invoke();
            return;
        }
        let mut q = self.lock();
        if q.closed {
            tracing::trace!(?task, "dispatcher closed, dropping task");
            return;
        }
        q.ready.push_back(task);
        drop(q);
        self.available.notify_all();
    }

    fn run_later(&self, task: Task, delay: Duration) {
        let mut q = self.lock();
        if q.closed {
            tracing::trace!(?task, "dispatcher closed, dropping delayed task");
            return;
        }
        let seq = q.next_seq;
        q.next_seq += 1;
        q.delayed.push(Pending {
            due: Instant::now() + delay,
            seq,
            task,
        });
        drop(q);
        self.available.notify_all();
    }

    fn cancel(&self, task: &Task) {
        let mut q = self.lock();
        if let Some(pos) = q.ready.iter().position(|t| t.same(task)) {
            q.ready.remove(pos);
            tracing::trace!(?task, "cancelled queued task");
            return;
        }
        if let Some(pos) = q.delayed.iter().position(|p| p.task.same(task)) {
            q.delayed.remove(pos);
            tracing::trace!(?task, "cancelled delayed task");
        }
    }

    fn worker_loop(&self) {
        loop {
            let task = {
                let mut q = self.lock();
                loop {
                    q.promote_due(Instant::now());
                    if let Some(task) = q.ready.pop_front() {
                        break task;
                    }
                    if q.closed {
                        return;
                    }
                    q = match q.next_due() {
                        Some(due) => {
                            let wait = due.saturating_duration_since(Instant::now());
                            self.available
                                .wait_timeout(q, wait)
                                .unwrap_or_else(PoisonError::into_inner)
                                .0
                        }
                        None => self
                            .available
                            .wait(q)
                            .unwrap_or_else(PoisonError::into_inner),
                    };
                }
            };
            // Execution errors belong to the task; nothing is caught here.
            task.invoke();
        }
    }
}

/// Owner of the foreground execution context.
///
/// `new()` spawns the foreground loop thread. Dropping the dispatcher
/// closes the queue, wakes the loop, and joins; tasks still pending at
/// shutdown are dropped unexecuted.
pub struct Dispatcher {
    inner: Arc<Inner>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawn the foreground loop thread and return the owning handle.
    pub fn new() -> Self {
        let inner = Arc::new(Inner {
            queue: Mutex::new(Queue::default()),
            available: Condvar::new(),
            foreground: OnceLock::new(),
        });
        let worker_inner = Arc::clone(&inner);
        let started = Arc::new((Mutex::new(false), Condvar::new()));
        let started_tx = Arc::clone(&started);
        let worker = thread::Builder::new()
            .name("fg-dispatch".into())
            .spawn(move || {
                let _ = worker_inner.foreground.set(thread::current().id());
                {
                    let (flag, cond) = &*started_tx;
                    *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
                    cond.notify_all();
                }
                worker_inner.worker_loop();
            })
            .expect("failed to spawn foreground dispatch thread");
        // Wait for the thread identity to be published so that run() never
        // misclassifies the foreground thread during startup.
        let (flag, cond) = &*started;
        let mut ready = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*ready {
            ready = cond.wait(ready).unwrap_or_else(PoisonError::into_inner);
        }
        Self {
            inner,
            worker: Some(worker),
        }
    }

    /// A cloneable, `Send` handle sharing this dispatcher's queue.
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Execute `task` synchronously if called on the foreground thread,
    /// otherwise enqueue it for the foreground thread (FIFO among tasks
    /// enqueued off-thread).
    pub fn run(&self, task: Task) {
        self.inner.run(task);
    }

    /// Enqueue `task` to run no sooner than `delay` from now. Never
    /// executes synchronously; a zero delay still defers past all
    /// currently queued foreground work.
    pub fn run_later(&self, task: Task, delay: Duration) {
        self.inner.run_later(task, delay);
    }

    /// Remove one queued-but-unexecuted instance of `task`. No-op if the
    /// task already executed or was never queued. Safe from any thread.
    pub fn cancel(&self, task: &Task) {
        self.inner.cancel(task);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        {
            let mut q = self.inner.lock();
            q.closed = true;
        }
        self.inner.available.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Cloneable, `Send` handle to a [`Dispatcher`]'s queue.
///
/// Used by boundary code (e.g. the native-event notifier) that must
/// marshal work onto the foreground thread without owning the dispatcher.
/// Submissions after the dispatcher has shut down are silently dropped.
#[derive(Clone)]
pub struct DispatchHandle {
    inner: Arc<Inner>,
}

impl DispatchHandle {
    /// See [`Dispatcher::run`].
    pub fn run(&self, task: Task) {
        self.inner.run(task);
    }

    /// See [`Dispatcher::run_later`].
    pub fn run_later(&self, task: Task, delay: Duration) {
        self.inner.run_later(task, delay);
    }

    /// See [`Dispatcher::cancel`].
    pub fn cancel(&self, task: &Task) {
        self.inner.cancel(task);
    }
}
