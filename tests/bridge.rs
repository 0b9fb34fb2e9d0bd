//! Request Bridge behavior: response/parser-error ordering and subscription
//! cleanup, exercised through the public `dispatch_command` surface (the
//! bridge pump itself is a private implementation detail of `SendRequest`).

mod common;

use agda_dispatch::{Lane, StreamEvent};
use common::Harness;

#[test]
fn responses_are_handled_in_stream_order() {
    let harness = Harness::new();
    harness.state.script(
        "query",
        vec![
            StreamEvent::Response("resp1".to_string()),
            StreamEvent::Response("resp2".to_string()),
            StreamEvent::Stop,
        ],
    );

    harness.dispatch("ask-agda");

    assert_eq!(
        harness.handler.responses_seen.borrow().as_slice(),
        ["resp1".to_string(), "resp2".to_string()]
    );
}

#[test]
fn parser_error_is_routed_through_error_handler_and_stream_continues() {
    let harness = Harness::new();
    harness.state.script(
        "query",
        vec![
            StreamEvent::ParserError("malformed".to_string()),
            StreamEvent::Response("resp1".to_string()),
            StreamEvent::Stop,
        ],
    );

    harness.dispatch("ask-agda");

    // The stream survived the parser error and still delivered resp1.
    assert_eq!(
        harness.handler.responses_seen.borrow().as_slice(),
        ["resp1".to_string()]
    );
    assert_eq!(
        harness
            .dispatcher
            .borrow()
            .count_by_source(Lane::Blocking, agda_dispatch::Source::Agda),
        0
    );
}

#[test]
fn stop_with_no_events_still_clears_the_agda_layer() {
    let harness = Harness::new();
    harness.state.script("query", vec![StreamEvent::Stop]);

    harness.dispatch("ask-agda");

    let dispatcher = harness.dispatcher.borrow();
    assert_eq!(
        dispatcher.count_by_source(Lane::Blocking, agda_dispatch::Source::Agda),
        0
    );
    assert_eq!(dispatcher.queue(Lane::Blocking).layers().len(), 1);
}
