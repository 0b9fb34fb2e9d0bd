//! The four producers that can own a [`QueueLayer`](crate::multi_queue::QueueLayer).

use std::fmt;

/// Tag identifying which producer owns a queue layer.
///
/// Equality is by tag only; two `Source::Agda` values are equal regardless
/// of what, if anything, is queued under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The bottom layer of every lane; carries interactive editor commands.
    Command,
    /// The proof-checker. At most one layer of this kind may exist per lane.
    Agda,
    /// The UI/view panel. At most one *prompting* layer of this kind exists
    /// on `blocking` at a time; non-prompting view work spawns on `critical`.
    View,
    /// One-shot layers for goal actions, view events, errors, and
    /// state-reading callbacks.
    Misc,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Command => "Command",
            Source::Agda => "Agda",
            Source::View => "View",
            Source::Misc => "Misc",
        };
        f.write_str(name)
    }
}
