//! Internal error types raised by the core itself.
//!
//! Handler-produced errors, proof-checker connection errors, and parser
//! errors all belong to the embedder (see [`crate::task::Handler`]) and are
//! never constructed here; the core only routes them to
//! `Handler::on_error`. `DispatcherError` is the one error kind the core
//! itself can raise, from [`crate::multi_queue::MultiQueue::remove`].

use crate::source::Source;

/// Errors raised by the core dispatcher machinery.
#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    /// `remove` targeted the only remaining layer in a `MultiQueue`.
    ///
    /// The bottom `Command` layer is never removed during normal operation,
    /// so this indicates a bug in the caller (a handler that removed a
    /// layer it did not spawn). The layer's queued tasks are discarded.
    #[error("removed the last remaining queue layer (source {source}); {discarded} task(s) discarded")]
    RemovedLastLayer { source: Source, discarded: usize },
}
