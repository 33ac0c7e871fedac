//! Integration tests for libcodex using mock readers.

mod common;

use futures::StreamExt;
use libcodex::stream::EventStream;
use libcodex::{Error, ThreadEvent, ThreadItem};

use common::{MockReader, ScenarioBuilder};

async fn drain(mut stream: EventStream) -> Vec<libcodex::Result<ThreadEvent>> {
    let mut out = Vec::new();
    while let Some(event) = stream.next().await {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn list_files_scenario() {
    let reader = MockReader::new(vec![
        r#"{"type":"thread.started","thread_id":"t1"}"#.to_string(),
        r#"{"type":"turn.started"}"#.to_string(),
        r#"{"type":"item.completed","item":{"type":"agent_message","text":"a.txt"}}"#.to_string(),
        r#"{"type":"turn.completed","usage":{"input_tokens":1,"cached_input_tokens":0,"output_tokens":1}}"#
            .to_string(),
    ]);

    let mut stream = EventStream::from_reader(reader);
    assert!(stream.thread_id().is_none());

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.event_type(), "thread.started");
    assert_eq!(stream.thread_id().map(|id| id.as_str()), Some("t1"));

    let turn = stream.collect_turn().await.expect("turn should succeed");
    assert_eq!(turn.final_response, "a.txt");
    assert_eq!(turn.items.len(), 1);
    assert_eq!(turn.usage.input_tokens, 1);
    assert_eq!(turn.usage.output_tokens, 1);
}

#[tokio::test]
async fn buffered_turn_collects_all_completed_items() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .reasoning("Looking at the workspace")
        .command("ls", "Cargo.toml\nsrc\n", 0)
        .agent_message("There is one crate.")
        .turn_completed(24763, 24448, 122)
        .build();

    let turn = EventStream::from_reader(reader).collect_turn().await.unwrap();

    let kinds: Vec<_> = turn.items.iter().map(ThreadItem::kind).collect();
    assert_eq!(kinds, ["reasoning", "command_execution", "agent_message"]);
    assert_eq!(turn.final_response, "There is one crate.");
    assert_eq!(turn.usage.uncached_input_tokens(), 315);

    let command = turn
        .items_of_kind("command_execution")
        .next()
        .and_then(ThreadItem::as_command_execution)
        .unwrap();
    assert_eq!(command.exit_code, Some(0));
    assert_eq!(command.aggregated_output, "Cargo.toml\nsrc\n");
}

#[tokio::test]
async fn exactly_one_terminal_event() {
    let mut lines = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .agent_message("done")
        .turn_completed(10, 0, 5)
        .lines();
    // Anything after the terminal event must not reach the consumer.
    lines.push(r#"{"type":"turn.started"}"#.to_string());
    lines.push(r#"{"type":"turn.completed","usage":{"input_tokens":0,"cached_input_tokens":0,"output_tokens":0}}"#.to_string());

    let events = drain(EventStream::from_reader(MockReader::new(lines))).await;
    let events: Vec<ThreadEvent> = events.into_iter().map(|e| e.unwrap()).collect();

    let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminal.len(), 1);
    assert!(events.last().unwrap().is_terminal());
    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn turn_failed_ends_the_stream() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .turn_failed("model overloaded")
        .build();

    let events = drain(EventStream::from_reader(reader)).await;
    assert_eq!(events.len(), 3);
    assert!(matches!(
        events.last(),
        Some(Ok(ThreadEvent::TurnFailed { error })) if error.message == "model overloaded"
    ));
}

#[tokio::test]
async fn turn_failed_is_error_when_buffered() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .turn_failed("model overloaded")
        .build();

    let err = EventStream::from_reader(reader)
        .collect_turn()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TurnFailed { ref message } if message == "model overloaded"));
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn fatal_error_is_thread_error_when_buffered() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .fatal_error("stream disconnected before completion")
        .build();

    let err = EventStream::from_reader(reader)
        .collect_turn()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ThreadError { ref message } if message.contains("disconnected")));
}

#[tokio::test]
async fn unknown_event_type_carries_raw_line() {
    let unknown = r#"{"type":"session.configured","model":"gpt-5"}"#;
    let reader = ScenarioBuilder::new()
        .thread_started()
        .raw(unknown)
        .turn_completed(1, 0, 1)
        .build();

    let events = drain(EventStream::from_reader(reader)).await;
    assert_eq!(events.len(), 2);
    assert!(events[0].is_ok());

    let err = events[1].as_ref().unwrap_err();
    assert!(matches!(err, Error::UnknownEvent { event_type, .. } if event_type == "session.configured"));
    assert_eq!(err.raw_line(), Some(unknown));
}

#[tokio::test]
async fn malformed_line_is_final_error_not_panic() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .raw("{not json")
        .agent_message("never seen")
        .turn_completed(1, 0, 1)
        .build();

    let events = drain(EventStream::from_reader(reader)).await;
    assert_eq!(events.len(), 3);
    let err = events[2].as_ref().unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(err.raw_line(), Some("{not json"));
}

#[tokio::test]
async fn invalid_structure_is_decode_error() {
    // Known type, missing required payload.
    let reader = ScenarioBuilder::new()
        .thread_started()
        .raw(r#"{"type":"turn.failed"}"#)
        .build();

    let err = EventStream::from_reader(reader)
        .collect_turn()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(err.raw_line(), Some(r#"{"type":"turn.failed"}"#));
}

#[tokio::test]
async fn eof_without_terminal_event_is_stream_closed() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .agent_message("partial")
        .build();

    let events = drain(EventStream::from_reader(reader)).await;
    assert_eq!(events.len(), 4);
    assert!(matches!(events.last(), Some(Err(Error::StreamClosed))));
}

#[tokio::test]
async fn empty_output_is_stream_closed() {
    let err = EventStream::from_reader(MockReader::new(Vec::new()))
        .collect_turn()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StreamClosed));
}

#[tokio::test]
async fn reader_error_is_propagated() {
    let lines = ScenarioBuilder::new().thread_started().turn_started().lines();
    let reader = MockReader::with_error(
        lines,
        Error::io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        )),
    );

    let events = drain(EventStream::from_reader(reader)).await;
    assert_eq!(events.len(), 3);
    assert!(matches!(events[2], Err(Error::Io(_))));
}

#[tokio::test]
async fn cancel_stops_the_stream() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .agent_message("one")
        .agent_message("two")
        .turn_completed(1, 0, 1)
        .build();

    let mut stream = EventStream::from_reader(reader);
    let first = stream.next().await.unwrap().unwrap();
    assert!(matches!(first, ThreadEvent::ThreadStarted { .. }));

    stream.cancel();
    assert!(stream.next().await.is_none());
    assert!(stream.next().await.is_none());
    // The id seen before cancelling is still available.
    assert!(stream.thread_id().is_some());
}

#[tokio::test]
async fn item_events_arrive_in_lifecycle_order() {
    let reader = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .command("cargo test", "test result: ok", 0)
        .command("cargo fmt --check", "Diff in src/lib.rs", 1)
        .turn_completed(100, 50, 20)
        .build();

    let events = drain(EventStream::from_reader(reader)).await;
    let mut phases: Vec<(String, &'static str)> = Vec::new();
    for event in &events {
        let event = event.as_ref().unwrap();
        if let Some(item) = event.item() {
            phases.push((item.id().to_string(), event.event_type()));
        }
    }

    for id in ["item_0", "item_1"] {
        let order: Vec<_> = phases
            .iter()
            .filter(|(item_id, _)| item_id == id)
            .map(|(_, phase)| *phase)
            .collect();
        assert_eq!(order, ["item.started", "item.updated", "item.completed"]);
    }

    let failed = events
        .iter()
        .filter_map(|e| match e {
            Ok(ThreadEvent::ItemCompleted { item }) => item.as_command_execution(),
            _ => None,
        })
        .find(|c| c.exit_code == Some(1))
        .unwrap();
    assert_eq!(failed.command, "cargo fmt --check");
}

#[tokio::test]
async fn decodes_every_item_kind() {
    let lines = vec![
        r#"{"type":"thread.started","thread_id":"t1"}"#,
        r#"{"type":"turn.started"}"#,
        r#"{"type":"item.completed","item":{"id":"i0","type":"agent_message","text":"hi"}}"#,
        r#"{"type":"item.completed","item":{"id":"i1","type":"reasoning","text":"hmm"}}"#,
        r#"{"type":"item.completed","item":{"id":"i2","type":"command_execution","command":"ls","aggregated_output":"","exit_code":0,"status":"completed"}}"#,
        r#"{"type":"item.completed","item":{"id":"i3","type":"file_change","changes":[{"path":"src/lib.rs","kind":"update"}],"status":"completed"}}"#,
        r#"{"type":"item.completed","item":{"id":"i4","type":"mcp_tool_call","server":"docs","tool":"search","status":"completed"}}"#,
        r#"{"type":"item.completed","item":{"id":"i5","type":"web_search","query":"tokio select"}}"#,
        r#"{"type":"item.completed","item":{"id":"i6","type":"todo_list","items":[{"text":"write tests","completed":false}]}}"#,
        r#"{"type":"item.completed","item":{"id":"i7","type":"error","message":"patch rejected"}}"#,
        r#"{"type":"turn.completed","usage":{"input_tokens":1,"cached_input_tokens":0,"output_tokens":1}}"#,
    ];
    let reader = MockReader::new(lines.into_iter().map(String::from).collect());

    let turn = EventStream::from_reader(reader).collect_turn().await.unwrap();
    let kinds: Vec<_> = turn.items.iter().map(ThreadItem::kind).collect();
    assert_eq!(
        kinds,
        [
            "agent_message",
            "reasoning",
            "command_execution",
            "file_change",
            "mcp_tool_call",
            "web_search",
            "todo_list",
            "error",
        ]
    );
    // Only agent messages feed the final response.
    assert_eq!(turn.final_response, "hi");
}

#[tokio::test]
async fn buffered_turn_returns_at_terminal_event() {
    // The output never reaches EOF after turn.completed.
    let lines = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .agent_message("a.txt")
        .turn_completed(1, 0, 1)
        .lines();
    let stream = EventStream::from_reader(MockReader::hanging(lines));

    let turn = tokio::time::timeout(std::time::Duration::from_secs(2), stream.collect_turn())
        .await
        .expect("collect_turn should not wait for EOF")
        .unwrap();
    assert_eq!(turn.final_response, "a.txt");
}

#[tokio::test]
async fn failed_turn_returns_at_terminal_event() {
    let lines = ScenarioBuilder::new()
        .thread_started()
        .turn_started()
        .turn_failed("rate limited")
        .lines();
    let stream = EventStream::from_reader(MockReader::hanging(lines));

    let err = tokio::time::timeout(std::time::Duration::from_secs(2), stream.collect_turn())
        .await
        .expect("collect_turn should not wait for EOF")
        .unwrap_err();
    assert!(matches!(err, Error::TurnFailed { .. }));
}
