//! End-of-frame task buffer.
//!
//! Anything that would add or remove actors while the world is iterating over
//! them is registered here instead and run after the tick pass. Tasks run in
//! registration order, exactly once. Tasks registered while a drain is in
//! progress wait for the next frame.

use std::collections::VecDeque;
use std::fmt;

/// A deferred world mutation.
pub type FrameEndTask<W> = Box<dyn FnOnce(&mut W)>;

/// Ordered buffer of tasks to run at the end of the current frame.
pub struct FrameEndTasks<W> {
    pending: VecDeque<FrameEndTask<W>>,
}

impl<W> Default for FrameEndTasks<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> fmt::Debug for FrameEndTasks<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameEndTasks")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<W> FrameEndTasks<W> {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Register a task to run at the end of the current frame.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce(&mut W) + 'static,
    {
        self.pending.push_back(Box::new(task));
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no tasks are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending task, leaving the buffer empty.
    pub fn take(&mut self) -> VecDeque<FrameEndTask<W>> {
        std::mem::take(&mut self.pending)
    }

    /// Run every task registered so far against `world`.
    ///
    /// Returns how many tasks ran.
    pub fn run_all(&mut self, world: &mut W) -> usize {
        let tasks = self.take();
        let count = tasks.len();
        for task in tasks {
            task(world);
        }
        count
    }
}
