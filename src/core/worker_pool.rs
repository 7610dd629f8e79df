//! Fixed-size task-parallel worker pool.
//!
//! Workers block on a shared queue guarded by one mutex; a condvar is
//! signaled on enqueue and a second condvar announces "queue empty and no
//! worker mid-task" for the [`WorkerPool::wait_for_all`] barrier. Shutdown
//! drains remaining queued tasks before workers exit — no silent task
//! loss — but rejects new submissions. Dropping the pool signals shutdown
//! and joins every worker.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use bevy::log::info;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("submit on a shut-down worker pool")]
    PoolClosed,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    tasks: VecDeque<Job>,
    active: usize, // tasks claimed by a worker and not yet finished
    stopping: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    all_done: Condvar,
}

/// Handle to one submitted task's result. A panic inside the task is
/// captured by the worker and re-raised here on `wait`.
pub struct TaskHandle<T> {
    rx: mpsc::Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task has run and yield its result.
    pub fn wait(self) -> T {
        match self.rx.recv() {
            Ok(Ok(value)) => value,
            Ok(Err(payload)) => panic::resume_unwind(payload),
            // Queued tasks are drained before workers exit, so the sender
            // side always delivers exactly once.
            Err(_) => unreachable!("worker pool dropped a task result"),
        }
    }
}

pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `num_threads` workers; 0 means detected hardware parallelism.
    pub fn new(num_threads: usize) -> Self {
        let num_threads = if num_threads == 0 {
            thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            num_threads
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                active: 0,
                stopping: false,
            }),
            work_available: Condvar::new(),
            all_done: Condvar::new(),
        });

        let workers = (0..num_threads)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(&shared))
            })
            .collect();

        info!("worker pool created with {num_threads} threads");

        Self { shared, workers }
    }

    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a task and return a handle to its result. Fails once
    /// shutdown has begun.
    pub fn submit<T, F>(&self, func: F) -> Result<TaskHandle<T>, SubmitError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.stopping {
                return Err(SubmitError::PoolClosed);
            }
            state.tasks.push_back(Box::new(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(func));
                // Receiver may have been dropped; the result is then unwanted.
                let _ = tx.send(result);
            }));
        }
        self.shared.work_available.notify_one();
        Ok(TaskHandle { rx })
    }

    /// Run `func` once per element, one task each, and block until every
    /// task has completed. Results are discarded; this is for
    /// side-effecting updates.
    pub fn parallel_for_each<T, F>(&self, items: &mut [T], func: F)
    where
        T: Send + 'static,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        let func = Arc::new(func);
        let mut handles = Vec::with_capacity(items.len());
        for item in items.iter_mut() {
            let func = Arc::clone(&func);
            let slot = SendPtr(item as *mut T);
            match self.submit(move || {
                // Capture the whole SendPtr, not its raw-pointer field, so
                // its Send impl applies to the closure
                let slot = slot;
                // Safety: each pointer targets a distinct element and the
                // slice borrow outlives the barrier below.
                let item = unsafe { &mut *slot.0 };
                func(item);
            }) {
                Ok(handle) => handles.push(handle),
                Err(SubmitError::PoolClosed) => break,
            }
        }
        for handle in handles {
            handle.wait();
        }
    }

    /// Block until the queue is empty and no worker is mid-task.
    pub fn wait_for_all(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !(state.tasks.is_empty() && state.active == 0) {
            state = self.shared.all_done.wait(state).unwrap();
        }
    }

    /// Queued plus in-flight task count. Approximate; diagnostics only.
    pub fn pending_tasks(&self) -> usize {
        let state = self.shared.state.lock().unwrap();
        state.tasks.len() + state.active
    }

    /// Begin shutdown: reject new submissions and let workers exit once
    /// the queue drains. Does not join.
    pub fn shutdown(&self) {
        self.shared.state.lock().unwrap().stopping = true;
        self.shared.work_available.notify_all();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        info!("worker pool shut down");
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.state.lock().unwrap();
            loop {
                if let Some(job) = state.tasks.pop_front() {
                    state.active += 1;
                    break job;
                }
                // Queue drained; exit only once stopping is flagged.
                if state.stopping {
                    return;
                }
                state = shared.work_available.wait(state).unwrap();
            }
        };

        job();

        let mut state = shared.state.lock().unwrap();
        state.active -= 1;
        if state.tasks.is_empty() && state.active == 0 {
            shared.all_done.notify_all();
        }
    }
}

struct SendPtr<T>(*mut T);

// Safety: the pointer is only dereferenced by one task, and only while the
// originating borrow is held across the completion barrier.
unsafe impl<T: Send> Send for SendPtr<T> {}
