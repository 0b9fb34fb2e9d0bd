//! The MultiQueue: an ordered list of `(Source, FIFO of Task)` layers.
//!
//! Pure data structure, no I/O, no async. Generic over the payload type so
//! it carries no dependency on [`crate::task::Task`] or the `Handler` trait;
//! [`crate::dispatcher::Dispatcher`] is the layer that instantiates it with
//! `Task<H>`.

use std::collections::VecDeque;

use crate::error::DispatcherError;
use crate::source::Source;

/// A single `(Source, task queue)` pair within a [`MultiQueue`].
#[derive(Debug)]
pub struct QueueLayer<T> {
    pub source: Source,
    tasks: VecDeque<T>,
}

impl<T> QueueLayer<T> {
    fn new(source: Source) -> Self {
        Self {
            source,
            tasks: VecDeque::new(),
        }
    }

    pub fn tasks(&self) -> impl ExactSizeIterator<Item = &T> {
        self.tasks.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

/// An ordered sequence of [`QueueLayer`]s. Head = highest priority.
///
/// Invariant: on construction it contains exactly one layer
/// `(Source::Command, empty)`; this bottom layer is never removed during
/// normal operation.
#[derive(Debug)]
pub struct MultiQueue<T> {
    layers: Vec<QueueLayer<T>>,
}

impl<T> MultiQueue<T> {
    /// Returns a queue containing a single layer `(Command, empty)`.
    pub fn make() -> Self {
        Self {
            layers: vec![QueueLayer::new(Source::Command)],
        }
    }

    /// Prepends a new empty layer tagged `s`. Multiple layers with the same
    /// tag may coexist; operations always target the first (topmost) match.
    pub fn spawn(&mut self, s: Source) {
        self.layers.insert(0, QueueLayer::new(s));
    }

    /// Removes the first (topmost) layer whose tag equals `s`. Its
    /// remaining tasks, if any, are prepended (in original order) to the
    /// immediately-following layer's task list.
    ///
    /// If no layer matches, the queue is left unchanged. If the matched
    /// layer is the last layer (shouldn't happen since the bottom `Command`
    /// layer is never removed in normal operation), its tasks are discarded
    /// and `Err(DispatcherError::RemovedLastLayer)` is returned; the queue
    /// is still left with that single remaining layer, now empty.
    pub fn remove(&mut self, s: Source) -> Result<(), DispatcherError> {
        let Some(index) = self.layers.iter().position(|l| l.source == s) else {
            return Ok(());
        };

        if index + 1 == self.layers.len() {
            let discarded = self.layers[index].tasks.len();
            self.layers[index].tasks.clear();
            return Err(DispatcherError::RemovedLastLayer {
                source: s,
                discarded,
            });
        }

        let removed = self.layers.remove(index);
        let next = &mut self.layers[index];
        for task in removed.tasks.into_iter().rev() {
            next.tasks.push_front(task);
        }
        Ok(())
    }

    /// Appends `ts` (in order) to the end of the first layer tagged `s`. If
    /// no such layer exists, the queue is left unchanged.
    pub fn add_tasks(&mut self, s: Source, ts: impl IntoIterator<Item = T>) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.source == s) {
            layer.tasks.extend(ts);
        }
    }

    /// Counts how many layers bear tag `s`.
    pub fn count_by_source(&self, s: Source) -> usize {
        self.layers.iter().filter(|l| l.source == s).count()
    }

    /// Walks layers head-first.
    ///
    /// In **blocking mode**: if the head layer has a task, pop and return
    /// it. If the head layer is empty, returns `None`: the lane is stuck
    /// waiting for that source even though lower layers may have work.
    ///
    /// In **non-blocking mode**: skips empty layers entirely and returns the
    /// first task found, leaving the empty layers in place.
    ///
    /// Returns `None` only if every layer is empty (or, in blocking mode,
    /// if the head layer alone is empty).
    pub fn get_next_task(&mut self, blocking_mode: bool) -> Option<T> {
        if blocking_mode {
            self.layers.first_mut()?.tasks.pop_front()
        } else {
            self.layers.iter_mut().find_map(|l| l.tasks.pop_front())
        }
    }

    /// Layers from head (highest priority) to tail.
    pub fn layers(&self) -> &[QueueLayer<T>] {
        &self.layers
    }
}
