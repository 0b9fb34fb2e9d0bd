//! Per-variant task execution: what running a popped [`Task`] actually
//! does, and the `keep_running` signal that feeds back into
//! [`crate::dispatcher::run_lane`].

use log::{debug, trace, warn};

use crate::dispatcher::{Context, Lane};
use crate::source::Source;
use crate::task::{Handler, Task, ViewEvent};

/// Runs one task to completion and reports whether the lane it ran on
/// should keep pulling more work (`false` only for `Terminate` and the
/// already-busy `SendRequest`/prompting-`ViewReq` violation paths).
pub(crate) async fn execute<H: Handler>(lane: Lane, ctx: Context<H>, task: Task<H>) -> bool {
    debug!("DEBUG executing on {lane} lane");
    match task {
        Task::DispatchCommand(command) => {
            let follow_ups = ctx.handler.on_command(command);
            ctx.dispatcher
                .borrow_mut()
                .add_tasks(Lane::Critical, Source::Command, follow_ups);
            true
        }

        Task::SendRequest(request) => {
            if ctx.dispatcher.borrow().count_by_source(Lane::Blocking, Source::Agda) > 0 {
                warn!("DEBUG dropping SendRequest: Agda already in flight");
                return false;
            }
            ctx.dispatcher.borrow_mut().spawn(Lane::Blocking, Source::Agda);
            crate::bridge::start(ctx.clone(), request);
            true
        }

        Task::ViewReq(request, callback) if H::is_prompting(&request) => {
            if ctx.dispatcher.borrow().count_by_source(Lane::Blocking, Source::View) > 0 {
                warn!("DEBUG dropping prompting ViewReq: View already in flight");
                return false;
            }
            ctx.dispatcher.borrow_mut().spawn(Lane::Blocking, Source::View);
            let response = ctx.state.send_request_to_view(request).await;
            let follow_ups = callback(response);
            let mut dispatcher = ctx.dispatcher.borrow_mut();
            dispatcher.add_tasks(Lane::Blocking, Source::View, follow_ups);
            report_remove(dispatcher.remove(Lane::Blocking, Source::View));
            true
        }

        Task::ViewReq(request, callback) => {
            ctx.dispatcher.borrow_mut().spawn(Lane::Critical, Source::View);
            let response = ctx.state.send_request_to_view(request).await;
            let follow_ups = callback(response);
            let mut dispatcher = ctx.dispatcher.borrow_mut();
            dispatcher.add_tasks(Lane::Critical, Source::View, follow_ups);
            report_remove(dispatcher.remove(Lane::Critical, Source::View));
            true
        }

        Task::WithState(callback) => {
            ctx.dispatcher.borrow_mut().spawn(Lane::Blocking, Source::Misc);
            let future = callback(ctx.state.as_ref());
            let follow_ups = future.await;
            let mut dispatcher = ctx.dispatcher.borrow_mut();
            dispatcher.add_tasks(Lane::Blocking, Source::Misc, follow_ups);
            report_remove(dispatcher.remove(Lane::Blocking, Source::Misc));
            true
        }

        Task::Terminate => {
            ctx.state.destroy().await;
            false
        }

        Task::Goal(action) => {
            let follow_ups = ctx.handler.on_goal(action);
            one_shot(&ctx, Lane::Blocking, follow_ups);
            true
        }

        Task::ViewEvent(ViewEvent::Initialized) => {
            debug!("view initialized");
            one_shot(&ctx, Lane::Critical, Vec::new());
            true
        }
        Task::ViewEvent(ViewEvent::Destroyed) => {
            one_shot(&ctx, Lane::Critical, vec![Task::Terminate]);
            true
        }
        Task::ViewEvent(ViewEvent::Custom(event)) => {
            let follow_ups = ctx.handler.on_view_event(event);
            one_shot(&ctx, Lane::Critical, follow_ups);
            true
        }

        Task::Error(error) => {
            let follow_ups = ctx.handler.on_error(error);
            one_shot(&ctx, Lane::Critical, follow_ups);
            true
        }

        Task::Debug(message) => {
            if ctx.dispatcher.borrow().verbose_debug_tasks() {
                trace!("DEBUG {message}");
            } else {
                debug!("DEBUG {message}");
            }
            true
        }
    }
}

/// Spawn, add, remove the `Misc` layer on `lane` in one step: the pattern
/// shared by `Goal`, `ViewEvent(Initialized)`, `ViewEvent(Destroyed)`, and
/// `Error`.
fn one_shot<H: Handler>(ctx: &Context<H>, lane: Lane, tasks: Vec<Task<H>>) {
    let mut dispatcher = ctx.dispatcher.borrow_mut();
    dispatcher.spawn(lane, Source::Misc);
    dispatcher.add_tasks(lane, Source::Misc, tasks);
    report_remove(dispatcher.remove(lane, Source::Misc));
}

/// Removing a layer we just spawned ourselves should never fail; if it
/// does, something upstream removed a layer it didn't own, so surface it
/// instead of swallowing it.
pub(crate) fn report_remove(result: Result<(), crate::error::DispatcherError>) {
    if let Err(err) = result {
        warn!("{err}");
    }
}
