//! Dispatcher tunables.
//!
//! Task state is never persisted across restarts, but this crate still
//! carries a small, ambient config struct the way worktrunk's own
//! `WorktrunkConfig` does: plain fields, a `Default` impl, serde-derived so
//! an embedder can fold it into its own settings file if it wants to.
//! Nothing here is read from disk by this crate.

use serde::{Deserialize, Serialize};

/// Tunables for a [`Dispatcher`](crate::dispatcher::Dispatcher).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Log `Task::Debug` messages at `trace` instead of `debug` level.
    #[serde(default)]
    pub verbose_debug_tasks: bool,
    /// Expected number of layers per lane, used only to size the `Vec`
    /// built for the pre-execution snapshot log line.
    #[serde(default = "DispatcherConfig::default_layer_capacity_hint")]
    pub layer_capacity_hint: usize,
}

impl DispatcherConfig {
    fn default_layer_capacity_hint() -> usize {
        4
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            verbose_debug_tasks: false,
            layer_capacity_hint: Self::default_layer_capacity_hint(),
        }
    }
}
