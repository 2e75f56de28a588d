//! # Task Management System
//!
//! This module provides the worker pool the terrain pipeline runs its generation and
//! meshing work on. The coordinator publishes tasks and never waits on them; a small,
//! bounded number of tasks is in flight per worker and the rest waits in a FIFO
//! queue on the coordinator's side.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskReport`: What a worker sends back after each task
//! - `TaskChannel`: Communication channel between the main thread and one worker
//!
//! Each worker is an OS thread with a dedicated channel. Tasks are handed out
//! round-robin to the next worker with a free slot.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager sends the task to an available worker, or queues it
//! 3. The worker processes the task and sends back a `TaskReport`
//! 4. `process_completed_tasks()` collects reports and frees in-flight slots
//! 5. `process_queued_tasks()` hands queued tasks to the freed slots
//!
//! ## Example Usage
//! ```rust
//! use voxel_terrain::engine_state::task_management::{task::Task, TaskManager};
//!
//! struct Hello;
//!
//! impl Task for Hello {
//!     fn name(&self) -> &'static str {
//!         "hello"
//!     }
//!
//!     fn process(&self) {
//!         log::info!("hello from a worker");
//!     }
//! }
//!
//! let mut task_manager = TaskManager::new(2, 1);
//! task_manager.publish_task(Box::new(Hello));
//!
//! // In the main loop:
//! while !task_manager.is_idle() {
//!     task_manager.process_completed_tasks();
//!     task_manager.process_queued_tasks();
//! }
//! ```

pub mod task;

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};
use task::{Task, TaskReport};
use web_time::Instant;

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker; dropped on shutdown
/// - `report_receiver`: Receives task reports from worker
/// - `num_tasks_in_flight`: Tasks sent to the worker and not yet reported
/// - `worker`: Handle to the worker thread, joined on drop
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Option<Sender<Box<dyn Task + Send>>>,
    report_receiver: Receiver<TaskReport>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Implementation Notes
/// - Owned and driven by a single thread (the coordinator)
/// - Drop-safe: shuts the workers down and joins them
/// - Panic-safe: a panicking task is reported, the worker keeps running
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    max_tasks_in_flight: usize,
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    /// * `max_tasks_in_flight` - Tasks a single worker may hold at once (at least 1)
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize, max_tasks_in_flight: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} workers, available parallelism: {:?}",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (report_tx, report_rx) = channel::<TaskReport>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let report = run_task(task);
                    if report_tx.send(report).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: Some(task_tx),
                report_receiver: report_rx,
                num_tasks_in_flight: 0,
                worker: Some(worker),
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            max_tasks_in_flight: max_tasks_in_flight.max(1),
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (worker disconnected), so it can be requeued
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        let Some(sender) = &channel.task_sender else {
            return Err(task);
        };
        match sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds the next channel, round-robin from the last used one, that has a free
    /// in-flight slot.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|i| (self.current_channel + i) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < self.max_tasks_in_flight)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately sent to a worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if !self.queued_tasks.is_empty() {
            // Keep FIFO order behind already queued work.
            self.queued_tasks.push_back(task);
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks, oldest first, to workers with free slots.
    ///
    /// Call once per tick after `process_completed_tasks()`.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            if let Err(task) = self.try_send_task(task, channel_idx) {
                // Channel is disconnected, put task back and stop processing
                self.queued_tasks.push_front(task);
                break;
            }
            self.current_channel = (channel_idx + 1) % self.channels.len();
        }
    }

    /// Collects the reports of every task finished since the last call.
    ///
    /// # Thread Safety
    /// Must be called from the thread that owns the manager.
    pub fn process_completed_tasks(&mut self) -> Vec<TaskReport> {
        let mut reports = Vec::new();
        for channel in &mut self.channels {
            while let Ok(report) = channel.report_receiver.try_recv() {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                debug!("Task {} finished in {:?}", report.name, report.elapsed);
                reports.push(report);
            }
        }
        reports
    }

    pub fn tasks_in_flight(&self) -> usize {
        self.channels.iter().map(|channel| channel.num_tasks_in_flight).sum()
    }

    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Whether no task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for channel in &mut self.channels {
            channel.task_sender.take();
        }
        for channel in &mut self.channels {
            if let Some(worker) = channel.worker.take() {
                if worker.join().is_err() {
                    error!("Worker thread exited with a panic");
                }
            }
        }
    }
}

/// Runs a task on the current worker thread, isolating panics.
fn run_task(task: Box<dyn Task + Send>) -> TaskReport {
    let name = task.name();
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.process()));
    if let Err(payload) = &outcome {
        error!("Task {} panicked: {}", name, panic_message(payload.as_ref()));
    }
    TaskReport {
        name,
        elapsed: start.elapsed(),
        panicked: outcome.is_err(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountTask(Arc<AtomicUsize>);

    impl Task for CountTask {
        fn name(&self) -> &'static str {
            "count"
        }

        fn process(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanicTask;

    impl Task for PanicTask {
        fn name(&self) -> &'static str {
            "panic"
        }

        fn process(&self) {
            panic!("boom");
        }
    }

    fn drive_until_idle(task_manager: &mut TaskManager) -> Vec<TaskReport> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut reports = Vec::new();
        while !task_manager.is_idle() {
            assert!(Instant::now() < deadline, "workers did not finish");
            reports.extend(task_manager.process_completed_tasks());
            task_manager.process_queued_tasks();
            thread::sleep(Duration::from_millis(1));
        }
        reports
    }

    #[test]
    fn overflow_is_queued_then_drained() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task_manager = TaskManager::new(2, 1);

        let sent: Vec<bool> = (0..10)
            .map(|_| task_manager.publish_task(Box::new(CountTask(counter.clone()))))
            .collect();

        assert_eq!(sent.iter().filter(|&&sent| sent).count(), 2);
        assert_eq!(task_manager.queued_task_count(), 8);

        let reports = drive_until_idle(&mut task_manager);
        assert_eq!(reports.len(), 10);
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn panicking_tasks_do_not_kill_workers() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task_manager = TaskManager::new(1, 1);

        task_manager.publish_task(Box::new(PanicTask));
        task_manager.publish_task(Box::new(CountTask(counter.clone())));

        let reports = drive_until_idle(&mut task_manager);
        assert_eq!(reports.iter().filter(|report| report.panicked).count(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_workers_means_everything_queues() {
        let mut task_manager = TaskManager::new(0, 1);
        assert!(!task_manager.publish_task(Box::new(PanicTask)));
        task_manager.process_queued_tasks();
        assert_eq!(task_manager.queued_task_count(), 1);
        assert!(!task_manager.is_idle());
    }
}
