//! Two-lane priority task dispatcher for an editor-integrated proof-assistant
//! plugin.
//!
//! The core serializes three independent asynchronous actors: editor
//! commands, a proof-checker's streaming request/response protocol, and a
//! view panel that can itself raise requests, onto two priority-layered
//! queues (see [`multi_queue`]) so that at most one proof-checker request
//! and at most one prompting view request are ever in flight, while
//! interrupt-grade commands on the critical lane are never starved by a
//! pending proof-checker round trip.
//!
//! # Global State
//!
//! There is none: every [`Dispatcher`](dispatcher::Dispatcher) instance owns
//! its own lanes and status flags behind `Rc<RefCell<_>>`
//! ([`dispatcher::SharedDispatcher`]), and nothing here reaches for a
//! process-wide static. An embedder hosting more than one dispatcher (one
//! per open proof obligation, say) gets independent instances for free.
//!
//! # Module map
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`source`] | The `Source` tag (`Command`/`Agda`/`View`/`Misc`) |
//! | [`multi_queue`] | `MultiQueue<T>`, the priority-layered FIFO data structure |
//! | [`task`] | `Task<H>`, `Handler`, the embedder-supplied pure-function surface |
//! | [`state`] | `RuntimeState`, the embedder-supplied I/O surface |
//! | [`dispatcher`] | `Dispatcher<H>`, lane status, `dispatch_command`/`kick_start` |
//! | [`bridge`] | The proof-checker request/response pump |
//! | [`config`] | `DispatcherConfig`, the ambient tunables |
//! | [`error`] | `DispatcherError`, the one internal invariant violation |
//!
//! `executor` is private: task execution is an implementation detail of
//! `kick_start`, not something an embedder calls directly.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod multi_queue;
pub mod source;
pub mod state;
pub mod task;

mod bridge;
mod executor;

pub use config::DispatcherConfig;
pub use dispatcher::{dispatch_command, kick_start, Context, Dispatcher, Lane, LaneStatus, SharedDispatcher, Spawner};
pub use error::DispatcherError;
pub use multi_queue::{MultiQueue, QueueLayer};
pub use source::Source;
pub use state::{ResponseStream, RuntimeState, StateFuture, StreamEvent};
pub use task::{Handler, Task, ViewCallback, ViewEvent, StateCallback};
