//! The tagged union of work items the dispatcher executes, and the
//! `Handler` trait surface an embedder implements to turn domain inputs
//! into task lists.

use std::fmt;

use crate::state::{RuntimeState, StateFuture};

/// Pure functions that map a domain input into a list of follow-up tasks.
///
/// Supplied by the embedder: the command parser, response interpreter,
/// error formatter, and goal-manipulation routines. None of these may block
/// or perform I/O; anything that does belongs behind [`RuntimeState`] and a
/// [`Task::WithState`], [`Task::SendRequest`], or [`Task::ViewReq`] task
/// instead.
pub trait Handler: Sized {
    type Command;
    type Request;
    /// Logged as `>>> {response:?}` when a response arrives off the
    /// proof-checker stream, so this needs a `Debug` impl even for embedder
    /// types that otherwise wouldn't bother.
    type Response: fmt::Debug;
    type ConnectionError;
    type ParserError;
    type GoalAction;
    type ViewRequest;
    type ViewResponse;
    type ViewEvent;
    /// Union error type routed to [`Handler::on_error`]. The embedder is
    /// responsible for folding `ConnectionError`/`ParserError` into it via
    /// [`Handler::from_connection_error`]/[`Handler::from_parser_error`].
    type Error;

    /// `CommandHandler(command) -> list<Task>`
    fn on_command(&self, command: Self::Command) -> Vec<Task<Self>>;
    /// `ResponseHandler(response) -> list<Task>`
    fn on_response(&self, response: Self::Response) -> Vec<Task<Self>>;
    /// `ErrorHandler(error) -> list<Task>`
    fn on_error(&self, error: Self::Error) -> Vec<Task<Self>>;
    /// `GoalHandler(goal_action) -> list<Task>`
    fn on_goal(&self, action: Self::GoalAction) -> Vec<Task<Self>>;
    /// Handles a custom [`ViewEvent::Custom`] payload. `Initialized` and
    /// `Destroyed` are handled by the executor directly and never reach this
    /// method.
    fn on_view_event(&self, event: Self::ViewEvent) -> Vec<Task<Self>>;

    /// Classifies a view request as *prompting*: whether it blocks further
    /// work on its lane until the user responds. A prompting request spawns
    /// its `View` layer on the blocking lane; a non-prompting one spawns on
    /// the critical lane instead.
    fn is_prompting(request: &Self::ViewRequest) -> bool;

    fn from_connection_error(error: Self::ConnectionError) -> Self::Error;
    fn from_parser_error(error: Self::ParserError) -> Self::Error;
}

/// Events raised by the view/UI panel. `Initialized`/`Destroyed` are
/// recognized directly by the executor; anything else is embedder-defined.
pub enum ViewEvent<H: Handler> {
    Initialized,
    Destroyed,
    Custom(H::ViewEvent),
}

impl<H: Handler> fmt::Debug for ViewEvent<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewEvent::Initialized => f.write_str("ViewEvent::Initialized"),
            ViewEvent::Destroyed => f.write_str("ViewEvent::Destroyed"),
            ViewEvent::Custom(_) => f.write_str("ViewEvent::Custom(..)"),
        }
    }
}

/// Invoked once with the view's response; its result is enqueued under
/// `Source::View`.
pub type ViewCallback<H> =
    Box<dyn FnOnce(<H as Handler>::ViewResponse) -> Vec<Task<H>>>;

/// Invoked with a shared handle to the runtime state; its result is
/// enqueued under `Source::Misc` once the returned future resolves.
pub type StateCallback<H> =
    Box<dyn FnOnce(&dyn RuntimeState<H>) -> StateFuture<H>>;

/// One unit of dispatcher work. See `crate::executor` for how each variant
/// is executed.
pub enum Task<H: Handler> {
    /// Run the command-to-tasks handler and enqueue its output on the
    /// critical lane under `Command`.
    DispatchCommand(H::Command),
    /// Issue one proof-checker request; blocks the `Agda` lane until the
    /// response stream terminates.
    SendRequest(H::Request),
    /// Issue a view request; the callback is invoked once with the
    /// response.
    ViewReq(H::ViewRequest, ViewCallback<H>),
    /// Run a state-reading/mutating callback, then enqueue its result.
    WithState(StateCallback<H>),
    /// Destroy the session; the executor returns `false` (stop running).
    Terminate,
    Goal(H::GoalAction),
    ViewEvent(ViewEvent<H>),
    Error(H::Error),
    Debug(String),
}

impl<H> fmt::Debug for Task<H>
where
    H: Handler,
    H::Command: fmt::Debug,
    H::Request: fmt::Debug,
    H::ViewRequest: fmt::Debug,
    H::GoalAction: fmt::Debug,
    H::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::DispatchCommand(c) => f.debug_tuple("DispatchCommand").field(c).finish(),
            Task::SendRequest(r) => f.debug_tuple("SendRequest").field(r).finish(),
            Task::ViewReq(r, _) => f.debug_tuple("ViewReq").field(r).field(&"..").finish(),
            Task::WithState(_) => f.write_str("WithState(..)"),
            Task::Terminate => f.write_str("Terminate"),
            Task::Goal(a) => f.debug_tuple("Goal").field(a).finish(),
            Task::ViewEvent(e) => f.debug_tuple("ViewEvent").field(e).finish(),
            Task::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Task::Debug(msg) => f.debug_tuple("Debug").field(msg).finish(),
        }
    }
}
