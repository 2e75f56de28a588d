//! # Task System Core Types
//!
//! This module defines the unit of work executed by the worker pool and the report
//! a worker sends back once the work is done.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The worker sends a `TaskReport` back to the main thread
//! 4. `TaskManager::process_completed_tasks()` collects reports and frees the slot
//!
//! Tasks are fire-and-forget: a task hands its output to the next pipeline stage
//! itself (through a terrain mailbox), never through the report.
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - All shared state must be properly synchronized

use std::time::Duration;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own (or hold shared handles to) everything they need, and should be
/// coarse-grained enough to amortize the scheduling overhead.
pub trait Task: Send {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Performs the work. Runs on a worker thread.
    ///
    /// Errors must be handled inside the task. A panic is caught by the worker,
    /// logged and reported, and does not take the worker down.
    fn process(&self);
}

/// What a worker reports back to the main thread after running a task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskReport {
    pub name: &'static str,
    pub elapsed: Duration,
    pub panicked: bool,
}
