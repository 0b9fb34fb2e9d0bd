//! The two-lane Dispatcher: holds `critical`/`blocking` MultiQueues and the
//! `Idle`/`Busy` re-entrancy semaphores that gate them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::config::DispatcherConfig;
use crate::multi_queue::MultiQueue;
use crate::source::Source;
use crate::state::RuntimeState;
use crate::task::{Handler, Task};

/// Re-entrancy semaphore for one lane: `Busy` means a task is mid-execution
/// and the dispatcher must not begin another on that lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneStatus {
    Idle,
    Busy,
}

/// Which of the two independent MultiQueues a task lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Proof-checker requests and the work they induce. Gets a blocking-mode
    /// `get_next_task`: a live-but-empty head layer halts the lane.
    Blocking,
    /// Interactive commands and view events. Gets a non-blocking
    /// `get_next_task`: empty layers are skipped so escape/input-method
    /// traffic is never starved by a pending blocking-lane request.
    Critical,
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Blocking => f.write_str("blocking"),
            Lane::Critical => f.write_str("critical"),
        }
    }
}

/// Something the [`Dispatcher`] can hand an independently-running future to
/// (the Request Bridge's ongoing stream pump) without this crate owning an
/// executor. The embedder implements this over whatever single-threaded
/// runtime it already drives, whether `tokio::task::spawn_local`, a hand-rolled
/// `FuturesUnordered`, anything.
pub trait Spawner {
    fn spawn(&self, future: futures::future::LocalBoxFuture<'static, ()>);
}

/// `Dispatcher` plus everything a running task needs to act: the pure
/// `Handler`, the I/O-performing `RuntimeState`, and a `Spawner` for
/// launching the Request Bridge's background pump. Bundled together because
/// every entry point (`dispatch_command`, `kick_start`, task execution, the
/// bridge) needs all four, and passing four `Rc`s around individually reads
/// worse than passing one.
pub struct Context<H: Handler> {
    pub dispatcher: SharedDispatcher<H>,
    pub handler: Rc<H>,
    pub state: Rc<dyn RuntimeState<H>>,
    pub spawner: Rc<dyn Spawner>,
}

impl<H: Handler> Clone for Context<H> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            handler: self.handler.clone(),
            state: self.state.clone(),
            spawner: self.spawner.clone(),
        }
    }
}

/// Shared handle to a [`Dispatcher`]. Needs to be `Rc<RefCell<_>>` (not
/// plain `&mut`) because the Request Bridge re-enters `kick_start` from a
/// future spawned independently of the call that started `SendRequest`.
pub type SharedDispatcher<H> = Rc<RefCell<Dispatcher<H>>>;

/// Holds two [`MultiQueue`]s and their status flags.
pub struct Dispatcher<H: Handler> {
    critical: MultiQueue<Task<H>>,
    blocking: MultiQueue<Task<H>>,
    status_critical: LaneStatus,
    status_blocking: LaneStatus,
    config: DispatcherConfig,
}

impl<H: Handler> Dispatcher<H> {
    pub fn new(config: DispatcherConfig) -> SharedDispatcher<H> {
        Rc::new(RefCell::new(Self {
            critical: MultiQueue::make(),
            blocking: MultiQueue::make(),
            status_critical: LaneStatus::Idle,
            status_blocking: LaneStatus::Idle,
            config,
        }))
    }

    pub fn status(&self, lane: Lane) -> LaneStatus {
        match lane {
            Lane::Critical => self.status_critical,
            Lane::Blocking => self.status_blocking,
        }
    }

    fn set_status(&mut self, lane: Lane, status: LaneStatus) {
        match lane {
            Lane::Critical => self.status_critical = status,
            Lane::Blocking => self.status_blocking = status,
        }
    }

    pub fn queue(&self, lane: Lane) -> &MultiQueue<Task<H>> {
        match lane {
            Lane::Critical => &self.critical,
            Lane::Blocking => &self.blocking,
        }
    }

    fn queue_mut(&mut self, lane: Lane) -> &mut MultiQueue<Task<H>> {
        match lane {
            Lane::Critical => &mut self.critical,
            Lane::Blocking => &mut self.blocking,
        }
    }

    pub fn count_by_source(&self, lane: Lane, source: Source) -> usize {
        self.queue(lane).count_by_source(source)
    }

    pub fn spawn(&mut self, lane: Lane, source: Source) {
        self.queue_mut(lane).spawn(source);
    }

    pub fn remove(
        &mut self,
        lane: Lane,
        source: Source,
    ) -> Result<(), crate::error::DispatcherError> {
        self.queue_mut(lane).remove(source)
    }

    pub fn add_tasks(&mut self, lane: Lane, source: Source, tasks: Vec<Task<H>>) {
        self.queue_mut(lane).add_tasks(source, tasks);
    }

    pub fn verbose_debug_tasks(&self) -> bool {
        self.config.verbose_debug_tasks
    }

    /// One-line diagnostic snapshot of both lanes, emitted before running a
    /// task.
    fn log_snapshot(&self) {
        let render = |q: &MultiQueue<Task<H>>| -> String {
            let mut parts = Vec::with_capacity(self.config.layer_capacity_hint);
            for layer in q.layers() {
                parts.push(format!("{}:{}", layer.source, layer.len()));
            }
            parts.join(" -> ")
        };
        debug!(
            "DEBUG dispatcher snapshot | critical[{}] blocking[{}]",
            render(&self.critical),
            render(&self.blocking)
        );
    }
}

/// `dispatch_command(state, command)`: append `DispatchCommand(command)` to
/// the critical lane's `Command` layer and call `kick_start`.
pub async fn dispatch_command<H: Handler>(ctx: Context<H>, command: H::Command) {
    ctx.dispatcher
        .borrow_mut()
        .critical
        .add_tasks(Source::Command, [Task::DispatchCommand(command)]);
    kick_start(ctx).await;
}

/// The scheduler entry point. Advances both lanes, re-examining both after
/// every task a lane runs, until a full pass leaves both untouched.
///
/// A task executed on one lane routinely deposits work on the *other* lane
/// (`Goal`, `WithState`, and the one-shot `Misc` helper all land on
/// `Lane::Blocking` regardless of which lane is currently running them). A
/// single blocking-then-critical sweep would strand that deposit if the
/// target lane already finished its own sweep this call, so `kick_start`
/// repeats the blocking/critical pair until neither makes progress,
/// matching "set status to Idle and, if keep_running is true, recursively
/// invoke kick_start" without the unbounded recursion depth a literal
/// per-task recursion would risk on a long response burst. This must be
/// safe to call re-entrantly from within a task's completion continuation;
/// the per-lane `Busy` flag is what makes that safe.
pub async fn kick_start<H: Handler>(ctx: Context<H>) {
    loop {
        let blocking_progressed = run_lane(Lane::Blocking, ctx.clone()).await;
        let critical_progressed = run_lane(Lane::Critical, ctx.clone()).await;
        if !blocking_progressed && !critical_progressed {
            return;
        }
    }
}

/// Drains `lane` to exhaustion (or until stuck / its status is already
/// `Busy`). Returns whether it ran at least one task, so `kick_start` knows
/// whether the other lane needs another look.
async fn run_lane<H: Handler>(lane: Lane, ctx: Context<H>) -> bool {
    let mut progressed = false;
    loop {
        let task = {
            let mut dispatcher = ctx.dispatcher.borrow_mut();
            if dispatcher.status(lane) == LaneStatus::Busy {
                return progressed;
            }
            let blocking_mode = matches!(lane, Lane::Blocking);
            let next = dispatcher.queue_mut(lane).get_next_task(blocking_mode);
            match next {
                Some(task) => {
                    dispatcher.log_snapshot();
                    dispatcher.set_status(lane, LaneStatus::Busy);
                    task
                }
                None => return progressed,
            }
        };

        progressed = true;
        let keep_running = crate::executor::execute(lane, ctx.clone(), task).await;

        ctx.dispatcher.borrow_mut().set_status(lane, LaneStatus::Idle);

        if !keep_running {
            return progressed;
        }
    }
}
