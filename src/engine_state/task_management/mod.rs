//! # Task Management System
//!
//! A fixed pool of worker threads for chunk generation and meshing.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that runs on a worker thread
//! - `TaskResult`: The result of a completed task, handled on the main thread
//! - `TaskChannel`: Communication channel between the main thread and one worker
//!
//! Each worker is a `std::thread` with a dedicated pair of `mpsc` channels.
//! The main thread never blocks on a worker during normal operation: results
//! are drained with `try_recv` once per frame.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are handled on the main thread in `process_completed_tasks()`
//!
//! ## Failure Handling
//! A worker whose task panics drops its result channel. The manager notices
//! the disconnect, logs it and stops scheduling on that channel. If no live
//! worker remains, queued tasks run inline on the calling thread.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(4);
//! task_manager.publish_task(Box::new(MyTask::new()));
//!
//! // In the main loop:
//! task_manager.process_completed_tasks();
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult, TaskStatistics};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `disconnected`: Set once the worker is gone
/// - `_worker`: Handle to the worker thread
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    disconnected: bool,
    _worker: JoinHandle<()>,
}

impl TaskChannel {
    fn is_available(&self) -> bool {
        !self.disconnected && self.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
/// - `statistics`: Counters updated as results are handled
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    statistics: TaskStatistics,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. Raised to 1 if zero.
    ///
    /// A worker that fails to spawn is logged and skipped.
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Available parallelism: {:?}, spawning {} chunk workers",
            thread::available_parallelism(),
            num_workers
        );

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            let worker = match thread::Builder::new()
                .name(format!("chunk-worker-{worker_index}"))
                .spawn(task_closure)
            {
                Ok(worker) => worker,
                Err(err) => {
                    error!("Failed to spawn chunk worker {worker_index}: {err}");
                    continue;
                }
            };

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                disconnected: false,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            statistics: TaskStatistics::default(),
        }
    }

    /// Number of worker threads still accepting work.
    pub fn live_workers(&self) -> usize {
        self.channels.iter().filter(|channel| !channel.disconnected).count()
    }

    /// Counters of the work handled so far.
    pub fn statistics(&self) -> TaskStatistics {
        self.statistics
    }

    /// Tasks queued or running.
    pub fn pending_tasks(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    /// Returns `true` if nothing is queued or running.
    pub fn is_idle(&self) -> bool {
        self.pending_tasks() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker is gone; the channel is marked disconnected
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                warn!("Chunk worker {channel_idx} is gone, no longer scheduling on it");
                channel.disconnected = true;
                Err(task.0)
            }
        }
    }

    /// Finds an available worker channel, round-robin from the last used one.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel that can accept a new task
    /// - `None` if all channels are busy or disconnected
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|step| (self.current_channel + step) % len)
            .find(|idx| self.channels[*idx].is_available())
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        self.statistics.tasks_published += 1;

        if !self.queued_tasks.is_empty() {
            self.queued_tasks.push_back(task);
            return false;
        }

        let mut task = task;
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                Err(returned) => task = returned,
            }
        }

        self.queued_tasks.push_back(task);
        false
    }

    /// Moves queued tasks onto workers as they become available.
    ///
    /// Tasks are dispatched in FIFO order. With no live worker left, queued
    /// tasks run inline on the calling thread.
    pub fn process_queued_tasks(&mut self) {
        if self.live_workers() == 0 {
            self.run_queued_inline();
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    fn run_queued_inline(&mut self) {
        if self.queued_tasks.is_empty() {
            return;
        }
        warn!(
            "No chunk workers available, running {} queued tasks on the main thread",
            self.queued_tasks.len()
        );
        while let Some(task) = self.queued_tasks.pop_front() {
            let result = task.process();
            self.handle(result);
        }
    }

    fn handle(&mut self, result: Box<dyn TaskResult + Send>) {
        result.handle_result(&mut self.statistics);
        self.statistics.tasks_completed += 1;
    }

    /// Handles every result the workers have produced so far.
    ///
    /// Never blocks.
    pub fn process_completed_tasks(&mut self) {
        let mut results = Vec::new();
        for (idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        results.push(result);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if !channel.disconnected {
                            error!(
                                "Chunk worker {idx} disconnected with {} task(s) in flight",
                                channel.num_tasks_in_flight
                            );
                        }
                        channel.disconnected = true;
                        channel.num_tasks_in_flight = 0;
                        break;
                    }
                }
            }
        }

        for result in results {
            self.handle(result);
        }
    }

    /// Blocks until every queued and running task has been handled.
    ///
    /// Meant for tests, tools and shutdown; the frame loop uses the
    /// non-blocking methods instead.
    pub fn wait_until_idle(&mut self) {
        loop {
            self.process_completed_tasks();
            self.process_queued_tasks();
            if self.is_idle() {
                return;
            }

            let Some(idx) = self
                .channels
                .iter()
                .position(|channel| channel.num_tasks_in_flight > 0)
            else {
                continue;
            };

            let channel = &mut self.channels[idx];
            match channel.result_receiver.recv() {
                Ok(result) => {
                    channel.num_tasks_in_flight -= 1;
                    self.handle(result);
                }
                Err(_) => {
                    error!("Chunk worker {idx} disconnected while waiting for results");
                    channel.disconnected = true;
                    channel.num_tasks_in_flight = 0;
                }
            }
        }
    }
}
