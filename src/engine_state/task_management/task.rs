//! # Task System Core Traits
//!
//! The building blocks of the worker pool.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - Tasks publish their output into shared chunk state themselves; the
//!   result only reports what happened

/// A unit of work that runs on a worker thread.
///
/// Tasks own everything they need. A task must never touch graphics-API
/// state.
pub trait Task: Send {
    /// Performs the work and reports back.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The outcome of a `Task`, handled on the main thread.
pub trait TaskResult: Send {
    /// Records the outcome.
    ///
    /// # Arguments
    /// * `statistics` - Pool-wide counters to update
    fn handle_result(self: Box<Self>, statistics: &mut TaskStatistics);
}

/// Running counters of the work the pool has completed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskStatistics {
    /// Tasks accepted by `publish_task`.
    pub tasks_published: u64,
    /// Results handled on the main thread.
    pub tasks_completed: u64,
    /// Chunk generation results.
    pub chunks_generated: u64,
    /// Chunk meshing results.
    pub meshes_built: u64,
    /// Quads emitted across all meshing results.
    pub faces_built: u64,
}
