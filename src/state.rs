//! The external state surface the core reads and writes through, and the
//! stream event shapes the Request Bridge pumps.

use std::future::Future;
use std::pin::Pin;

use futures::stream::LocalBoxStream;

use crate::task::{Handler, Task};

/// Future returned by a [`crate::task::StateCallback`]. Not `Send`: the
/// whole model is single-threaded cooperative, so nothing here needs to
/// cross a thread boundary.
pub type StateFuture<H> = Pin<Box<dyn Future<Output = Vec<Task<H>>>>>;

/// One event out of the proof-checker's response stream.
pub enum StreamEvent<H: Handler> {
    /// `Yield(Ok(response))`
    Response(H::Response),
    /// `Yield(Error(parser_error))`
    ParserError(H::ParserError),
    /// `Stop`: the terminal marker. The bridge releases its subscription
    /// and the caller removes the `Agda` layer.
    Stop,
}

/// `Connection` exposes `emitter.on(handler) -> unsubscribe`; modeled here
/// as a plain async stream of [`StreamEvent`]s, which the embedder is free
/// to implement over a channel, an `emitter.on` callback bridge, or
/// anything else that eventually yields `Stop`.
pub type ResponseStream<H> = LocalBoxStream<'static, StreamEvent<H>>;

/// External state the core reads through, and the single door through which
/// proof-checker and view I/O happens.
///
/// Methods take `&self`, not `&mut self`: the dispatcher hands this out as a
/// shared `Rc<dyn RuntimeState<H>>` to concurrently-running lanes (a
/// critical-lane `ViewReq` and a blocking-lane `SendRequest` may both have an
/// implementation method in flight at once), so any interior mutability the
/// embedder needs is the embedder's own `RefCell`/channel to manage; this
/// trait makes no exclusivity claim over it. The dispatcher's own invariants
/// (at most one in-flight Agda request, at most one prompting View request)
/// are what keep the embedder's implementation from needing to serialize
/// more than that.
///
/// `?Send` throughout, since the embedder drives everything from one
/// logical thread. Object-safe so it can be threaded through
/// [`crate::task::StateCallback`] as `&dyn RuntimeState<H>`.
#[async_trait::async_trait(?Send)]
pub trait RuntimeState<H: Handler> {
    /// `send_request_to_agda(state, req) -> Future<Result<Connection, Error>>`
    async fn send_request_to_agda(
        &self,
        request: H::Request,
    ) -> Result<ResponseStream<H>, H::ConnectionError>;

    /// `send_request_to_view(state, req) -> Future<Response>`
    async fn send_request_to_view(&self, request: H::ViewRequest) -> H::ViewResponse;

    /// `destroy(state) -> Future<unit>`
    async fn destroy(&self);
}
