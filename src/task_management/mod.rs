//! # Task Management System
//!
//! This module provides a small worker-pool abstraction for executing units of
//! work on background threads. Work is submitted fire-and-forget to a *named
//! queue*; there is no return value and no ordering guarantee relative to other
//! submissions.
//!
//! ## Architecture Overview
//!
//! - `WorkerPool`: owns a set of named queues, created lazily on first use
//! - `WorkerQueue`: a group of OS threads, each fed by its own mpsc channel
//! - `WorkUnit`: a boxed `FnOnce` closure that owns all the data it needs
//!
//! ## Scheduling
//!
//! Each queue distributes work round-robin across its worker channels. Workers
//! execute units in the order they receive them, but different workers run in
//! parallel, so units submitted to the same queue may complete in any order.
//!
//! ## Lifecycle
//!
//! Worker threads block on their channel and exit when the sending half is
//! dropped, so dropping the pool shuts the workers down once their queued work
//! has drained. The per-queue `unfinished` counter makes completion observable
//! for tests and shutdown logic; production consumers should instead observe
//! the domain-level signal (e.g. a chunk's readiness flag).

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A unit of background work: an owned closure with no result.
pub type WorkUnit = Box<dyn FnOnce() + Send + 'static>;

/// One worker thread and the sending half of its work channel.
struct WorkerChannel {
    work_sender: Sender<WorkUnit>,
    _worker: JoinHandle<()>,
}

/// A named group of worker threads sharing one round-robin dispatcher.
struct WorkerQueue {
    channels: Vec<WorkerChannel>,
    current_channel: usize,
    unfinished: Arc<AtomicUsize>,
}

impl WorkerQueue {
    fn new(name: &str, num_workers: usize) -> Self {
        let unfinished = Arc::new(AtomicUsize::new(0));
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (work_tx, work_rx) = channel::<WorkUnit>();
            let counter = unfinished.clone();

            let worker_loop = move || {
                while let Ok(work) = work_rx.recv() {
                    work();
                    counter.fetch_sub(1, Ordering::AcqRel);
                }
            };

            channels.push(WorkerChannel {
                work_sender: work_tx,
                _worker: thread::Builder::new()
                    .name(format!("{name}-{index}"))
                    .spawn(worker_loop)
                    .expect("failed to spawn worker thread"),
            });
        }

        WorkerQueue {
            channels,
            current_channel: 0,
            unfinished,
        }
    }

    fn submit(&mut self, work: WorkUnit) {
        self.unfinished.fetch_add(1, Ordering::AcqRel);

        let channel_idx = self.current_channel;
        self.current_channel = (self.current_channel + 1) % self.channels.len();

        if self.channels[channel_idx].work_sender.send(work).is_err() {
            // The worker thread is gone; the unit will never run.
            self.unfinished.fetch_sub(1, Ordering::AcqRel);
            warn!("Worker channel {channel_idx} disconnected, dropping work unit");
        }
    }
}

/// Manages named groups of worker threads and dispatches work to them.
///
/// Queues are created on demand the first time a name is used, each with the
/// pool's configured thread count. Submission is fire-and-forget: the caller
/// gets no handle back and observes completion through whatever state the work
/// unit itself publishes.
///
/// # Example
/// ```
/// use voxel_terrain::task_management::WorkerPool;
///
/// let mut pool = WorkerPool::new(2);
/// pool.submit("background", || {
///     // expensive work...
/// });
/// ```
pub struct WorkerPool {
    queues: HashMap<String, WorkerQueue>,
    workers_per_queue: usize,
}

impl WorkerPool {
    /// Creates a pool whose queues will each run `workers_per_queue` threads.
    ///
    /// A value of 0 is clamped to 1.
    pub fn new(workers_per_queue: usize) -> Self {
        WorkerPool {
            queues: HashMap::new(),
            workers_per_queue: workers_per_queue.max(1),
        }
    }

    /// Creates a pool sized to the machine's available parallelism.
    ///
    /// Falls back to a single worker per queue when the parallelism cannot be
    /// determined.
    pub fn with_default_parallelism() -> Self {
        let parallelism = thread::available_parallelism();
        info!("Available parallelism: {parallelism:?}");

        Self::new(parallelism.map(|n| n.get()).unwrap_or(1))
    }

    /// Submits a unit of work to the named queue, creating the queue if needed.
    ///
    /// The work unit must own everything it touches; it is executed exactly
    /// once on one of the queue's worker threads, or dropped (with a warning)
    /// if every worker of the queue has died.
    ///
    /// # Panics
    /// Panics if a new queue's worker threads cannot be spawned.
    pub fn submit<F>(&mut self, queue_name: &str, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let workers = self.workers_per_queue;
        let queue = self.queues.entry(queue_name.to_owned()).or_insert_with(|| {
            debug!("Creating worker queue '{queue_name}' with {workers} workers");
            WorkerQueue::new(queue_name, workers)
        });

        queue.submit(Box::new(work));
    }

    /// Returns the number of submitted-but-unfinished units for a queue.
    ///
    /// Unknown queue names report 0. The count is a snapshot; by the time the
    /// caller inspects it, more units may have finished.
    pub fn unfinished(&self, queue_name: &str) -> usize {
        self.queues
            .get(queue_name)
            .map(|queue| queue.unfinished.load(Ordering::Acquire))
            .unwrap_or(0)
    }
}
