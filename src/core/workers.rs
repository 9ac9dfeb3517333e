//! Global thread pool for background frame loading
//!
//! Uses work-stealing deques:
//! - All tasks pushed to a shared injector
//! - Workers steal from each other when their own queue is empty
//!
//! Loads have no ordering guarantee between each other; the preloader only
//! relies on each job running exactly once.

use crossbeam::deque::{Injector, Stealer, Worker};
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::entities::WorkerPool;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool with work-stealing deques.
///
/// # Example
/// ```ignore
/// let workers = Workers::new(4);
/// workers.execute(move || {
///     frame.settle(Loader::load(&path));
/// });
/// ```
pub struct Workers {
    injector: Arc<Injector<Job>>,         // Global queue for external tasks
    handles: Vec<thread::JoinHandle<()>>, // Thread handles for proper shutdown
    shutdown: Arc<AtomicBool>,            // Shutdown signal
}

impl Workers {
    /// Create worker pool.
    ///
    /// `num_threads == 0` picks `num_cpus::get() * 3 / 4` (at least 1),
    /// leaving headroom for the render loop.
    pub fn new(num_threads: usize) -> Self {
        let num_threads = if num_threads == 0 {
            (num_cpus::get() * 3 / 4).max(1)
        } else {
            num_threads
        };

        let injector = Arc::new(Injector::<Job>::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let queues: Vec<Worker<Job>> = (0..num_threads).map(|_| Worker::new_fifo()).collect();
        let stealers: Arc<[Stealer<Job>]> = queues.iter().map(Worker::stealer).collect();

        let handles: Vec<_> = queues
            .into_iter()
            .enumerate()
            .filter_map(|(id, queue)| {
                let injector = Arc::clone(&injector);
                let stealers = Arc::clone(&stealers);
                let shutdown = Arc::clone(&shutdown);
                thread::Builder::new()
                    .name(format!("scrollseq-loader-{}", id))
                    .spawn(move || worker_loop(id, queue, &injector, &stealers, &shutdown))
                    .map_err(|e| log::error!("Failed to spawn loader thread {}: {}", id, e))
                    .ok()
            })
            .collect();

        trace!("Loader pool ready: {} threads", handles.len());

        Self {
            injector,
            handles,
            shutdown,
        }
    }

    pub fn num_threads(&self) -> usize {
        self.handles.len()
    }

    /// Execute closure on a worker thread.
    ///
    /// If no worker thread could be spawned the job runs inline, so
    /// submitted loads always settle.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.handles.is_empty() {
            f();
            return;
        }
        self.injector.push(Box::new(f));
    }
}

fn worker_loop(
    worker_id: usize,
    worker: Worker<Job>,
    injector: &Injector<Job>,
    stealers: &[Stealer<Job>],
    shutdown: &AtomicBool,
) {
    trace!("Worker {} started", worker_id);
    loop {
        // 1. Own queue
        if let Some(job) = worker.pop() {
            job();
            continue;
        }

        // 2. Global injector (batch into own queue)
        if let Some(job) = injector.steal_batch_and_pop(&worker).success() {
            job();
            continue;
        }

        // 3. Other workers
        if let Some(job) = stealers.iter().find_map(|s| s.steal().success()) {
            job();
            continue;
        }

        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        // Idle: short sleep instead of spinning
        thread::sleep(Duration::from_millis(1));
    }
    trace!("Worker {} stopped", worker_id);
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        self.shutdown.store(true, Ordering::SeqCst);

        // Loads in flight are never aborted; wait a bounded time for them
        let deadline = Instant::now() + Duration::from_millis(500);
        for handle in std::mem::take(&mut self.handles) {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped", num_threads);
    }
}

impl WorkerPool for Workers {
    fn execute(&self, f: Box<dyn FnOnce() + Send + 'static>) {
        Workers::execute(self, f)
    }
}
