//! Request Bridge: wraps one proof-checker request into a background pump
//! that injects tasks onto the blocking lane's `Agda` layer as the response
//! stream yields, and clears that layer on termination.

use futures::{FutureExt, StreamExt};
use log::{debug, warn};

use crate::dispatcher::{kick_start, Context, Lane};
use crate::executor::report_remove;
use crate::source::Source;
use crate::state::StreamEvent;
use crate::task::Handler;

/// Launches the bridge for `request` on [`Context::spawner`]. Returns
/// immediately; the `Agda` layer this populates was already spawned by the
/// caller (`crate::executor::execute`'s `SendRequest` arm) before this runs,
/// so the task that issued `SendRequest` resolves `true` right away and the
/// scheduler moves on while this keeps running concurrently.
pub(crate) fn start<H: Handler>(ctx: Context<H>, request: H::Request) {
    ctx.spawner.spawn(pump(ctx.clone(), request).boxed_local());
}

async fn pump<H: Handler>(ctx: Context<H>, request: H::Request) {
    let connection = ctx.state.send_request_to_agda(request).await;

    let mut stream = match connection {
        Ok(stream) => stream,
        Err(conn_err) => {
            let error = H::from_connection_error(conn_err);
            let follow_ups = ctx.handler.on_error(error);
            let mut dispatcher = ctx.dispatcher.borrow_mut();
            dispatcher.add_tasks(Lane::Blocking, Source::Agda, follow_ups);
            report_remove(dispatcher.remove(Lane::Blocking, Source::Agda));
            drop(dispatcher);
            kick_start(ctx).await;
            return;
        }
    };

    // Scoped acquisition: `stream` (the subscription handle) lives only for
    // this loop and is dropped, unsubscribing, the moment it yields `Stop`
    // or this function returns on any path.
    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Response(response) => {
                debug!(">>> {response:?}");
                let follow_ups = ctx.handler.on_response(response);
                ctx.dispatcher
                    .borrow_mut()
                    .add_tasks(Lane::Blocking, Source::Agda, follow_ups);
                kick_start(ctx.clone()).await;
            }
            StreamEvent::ParserError(parser_err) => {
                warn!("DEBUG parser error on Agda stream");
                let error = H::from_parser_error(parser_err);
                let follow_ups = ctx.handler.on_error(error);
                ctx.dispatcher
                    .borrow_mut()
                    .add_tasks(Lane::Blocking, Source::Agda, follow_ups);
                kick_start(ctx.clone()).await;
            }
            StreamEvent::Stop => {
                debug!(">>| ");
                break;
            }
        }
    }

    drop(stream);
    report_remove(ctx.dispatcher.borrow_mut().remove(Lane::Blocking, Source::Agda));
    kick_start(ctx).await;
}
