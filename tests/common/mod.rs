//! Harness `Handler`/`RuntimeState`/`Spawner` fakes for exercising the full
//! dispatcher end-to-end, plus a small `LocalPool`-backed spawner so bridge
//! tests can drive the background response pump to completion.

use std::cell::RefCell;
use std::rc::Rc;

use agda_dispatch::{
    Dispatcher, Handler, ResponseStream, RuntimeState, SharedDispatcher, Spawner, StreamEvent,
    Task,
};
use async_trait::async_trait;
use futures::stream;
use futures::task::LocalSpawnExt;
use futures::StreamExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    /// Prompting: blocks further work on its lane until answered.
    Prompt(String),
    Info(String),
}

pub struct TestHandler {
    pub responses_seen: Rc<RefCell<Vec<String>>>,
}

impl TestHandler {
    pub fn new() -> Self {
        Self {
            responses_seen: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl Handler for TestHandler {
    type Command = String;
    type Request = String;
    type Response = String;
    type ConnectionError = String;
    type ParserError = String;
    type GoalAction = String;
    type ViewRequest = ViewRequest;
    type ViewResponse = String;
    type ViewEvent = String;
    type Error = String;

    fn on_command(&self, command: Self::Command) -> Vec<Task<Self>> {
        match command.as_str() {
            "ask-agda" => vec![Task::SendRequest("query".to_string())],
            "ask-view" => vec![Task::ViewReq(
                ViewRequest::Prompt("pick one".to_string()),
                Box::new(|response| vec![Task::Debug(format!("view answered: {response}"))]),
            )],
            "ask-goal" => vec![Task::Goal("move-cursor".to_string())],
            "ask-state" => vec![Task::WithState(Box::new(|_state| {
                Box::pin(async { vec![Task::Debug("state read".to_string())] })
            }))],
            other => vec![Task::Debug(format!("handled: {other}"))],
        }
    }

    fn on_response(&self, response: Self::Response) -> Vec<Task<Self>> {
        self.responses_seen.borrow_mut().push(response.clone());
        vec![Task::Debug(format!("response: {response}"))]
    }

    fn on_error(&self, error: Self::Error) -> Vec<Task<Self>> {
        vec![Task::Debug(format!("error: {error}"))]
    }

    fn on_goal(&self, action: Self::GoalAction) -> Vec<Task<Self>> {
        vec![Task::Debug(format!("goal: {action}"))]
    }

    fn on_view_event(&self, event: Self::ViewEvent) -> Vec<Task<Self>> {
        vec![Task::Debug(format!("view-event: {event}"))]
    }

    fn is_prompting(request: &Self::ViewRequest) -> bool {
        matches!(request, ViewRequest::Prompt(_))
    }

    fn from_connection_error(error: Self::ConnectionError) -> Self::Error {
        format!("connection: {error}")
    }

    fn from_parser_error(error: Self::ParserError) -> Self::Error {
        format!("parser: {error}")
    }
}

/// Scripted proof-checker backend: `send_request_to_agda` looks up a canned
/// response sequence for the request text, or fails the connection if no
/// script is registered.
pub struct TestState {
    pub scripts: RefCell<std::collections::HashMap<String, Vec<StreamEvent<TestHandler>>>>,
    pub view_responses: RefCell<std::collections::HashMap<String, String>>,
    pub destroyed: RefCell<bool>,
}

impl TestState {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            scripts: RefCell::new(std::collections::HashMap::new()),
            view_responses: RefCell::new(std::collections::HashMap::new()),
            destroyed: RefCell::new(false),
        })
    }

    pub fn script(&self, request: &str, events: Vec<StreamEvent<TestHandler>>) {
        self.scripts
            .borrow_mut()
            .insert(request.to_string(), events);
    }
}

#[async_trait(?Send)]
impl RuntimeState<TestHandler> for TestState {
    async fn send_request_to_agda(
        &self,
        request: String,
    ) -> Result<ResponseStream<TestHandler>, String> {
        match self.scripts.borrow_mut().remove(&request) {
            Some(events) => Ok(stream::iter(events).boxed_local()),
            None => Err(format!("no script for {request}")),
        }
    }

    async fn send_request_to_view(&self, request: ViewRequest) -> String {
        let key = match &request {
            ViewRequest::Prompt(s) | ViewRequest::Info(s) => s.clone(),
        };
        self.view_responses
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| "default-answer".to_string())
    }

    async fn destroy(&self) {
        *self.destroyed.borrow_mut() = true;
    }
}

/// Spawns background futures (the Request Bridge's pump) onto a
/// `futures::executor::LocalPool`. `Harness::dispatch` runs the pool after
/// its initial await to drain any bridge work the `SendRequest` fast path
/// kicked off.
pub struct PoolSpawner(pub futures::executor::LocalSpawner);

impl Spawner for PoolSpawner {
    fn spawn(&self, future: futures::future::LocalBoxFuture<'static, ()>) {
        self.0
            .spawn_local(future)
            .expect("local pool accepts spawn");
    }
}

pub struct Harness {
    pub dispatcher: SharedDispatcher<TestHandler>,
    pub handler: Rc<TestHandler>,
    pub state: Rc<TestState>,
    pub pool: RefCell<futures::executor::LocalPool>,
    pub spawner: Rc<PoolSpawner>,
}

impl Harness {
    pub fn new() -> Self {
        // Surfaces the dispatcher's diagnostic log lines under
        // `RUST_LOG=debug cargo test -- --nocapture`; harmless if a prior
        // test already initialized the global logger.
        let _ = env_logger::builder().is_test(true).try_init();
        let pool = futures::executor::LocalPool::new();
        let spawner = Rc::new(PoolSpawner(pool.spawner()));
        Harness {
            dispatcher: Dispatcher::new(agda_dispatch::DispatcherConfig::default()),
            handler: Rc::new(TestHandler::new()),
            state: TestState::new(),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    pub fn ctx(&self) -> agda_dispatch::Context<TestHandler> {
        agda_dispatch::Context {
            dispatcher: self.dispatcher.clone(),
            handler: self.handler.clone(),
            state: self.state.clone() as Rc<dyn RuntimeState<TestHandler>>,
            spawner: self.spawner.clone() as Rc<dyn Spawner>,
        }
    }

    /// Dispatches `command` and runs the local pool to drain any background
    /// bridge work it spawned.
    pub fn dispatch(&self, command: &str) {
        let ctx = self.ctx();
        self.pool
            .borrow_mut()
            .run_until(agda_dispatch::dispatch_command(ctx, command.to_string()));
        self.pool.borrow_mut().run();
    }
}
