//! Runner turns: event recording, errors, output keys and concurrency.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use agentdeck::agent::AgentReply;
use agentdeck::agents::qna::QNA_APP_NAME;
use agentdeck::error::AgentError;
use agentdeck::runner::Runner;
use agentdeck::session::{Event, InMemorySessionStore, SessionStore};
use common::{EchoAgent, FailingAgent, FixedAgent, SlowAgent};

fn store() -> Arc<InMemorySessionStore> {
    Arc::new(InMemorySessionStore::new())
}

#[tokio::test]
async fn run_without_session_creates_one_with_two_events() {
    let store = store();
    let runner = Runner::new(store.clone(), Arc::new(EchoAgent::default()));

    let (reply, session) = runner.run("u1", None, "hi").await.unwrap();

    assert_eq!(reply, "echo: hi");
    assert_eq!(store.len(), 1);
    assert_eq!(session.user_id(), "u1");
    assert_eq!(session.app_name(), QNA_APP_NAME);
    assert_eq!(session.events(), &[Event::user("hi"), Event::agent("echo: hi")]);
    assert_eq!(session.last_event().and_then(Event::content), Some(reply.as_str()));
    assert_eq!(store.get_session(session.id()), Some(session));
}

#[tokio::test]
async fn run_with_existing_session_appends_to_it() {
    let store = store();
    let runner =
        Runner::new(store.clone(), Arc::new(EchoAgent::default())).with_app_name("greeting_agent_app");
    let session = store.create_session("u1", "greeting_agent_app", None);

    runner.run("u1", Some(session.id()), "one").await.unwrap();
    let (_, after) = runner.run("u1", Some(session.id()), "two").await.unwrap();

    let contents: Vec<&str> = after.events().iter().filter_map(Event::content).collect();
    assert_eq!(contents, vec!["one", "echo: one", "two", "echo: two"]);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn unknown_session_is_rejected_before_anything_is_recorded() {
    let store = store();
    let existing = store.create_session("u1", QNA_APP_NAME, None);
    let agent = Arc::new(EchoAgent::default());
    let runner = Runner::new(store.clone(), agent.clone());

    let err = runner.run("u1", Some("nope"), "hi").await.unwrap_err();

    assert!(matches!(err, AgentError::SessionNotFound(ref id) if id == "nope"));
    assert_eq!(agent.calls(), 0);
    assert_eq!(store.len(), 1);
    assert!(store.get_session(existing.id()).unwrap().events().is_empty());
}

#[tokio::test]
async fn handler_failure_keeps_user_event_only() {
    let store = store();
    let session = store.create_session("u1", QNA_APP_NAME, None);
    let runner = Runner::new(store.clone(), Arc::new(FailingAgent));

    let err = runner.run("u1", Some(session.id()), "hi").await.unwrap_err();

    assert!(matches!(err, AgentError::Handler { ref agent, .. } if agent == "failing"));
    let stored = store.get_session(session.id()).unwrap();
    assert_eq!(stored.events(), &[Event::user("hi")]);
}

#[tokio::test]
async fn output_key_stores_parsed_json() {
    let store = store();
    let agent = FixedAgent {
        reply: AgentReply::text("```json\n{\"subject\": \"Hello\", \"body\": \"Hi team\"}\n```"),
        output_key: Some("email".into()),
    };
    let runner = Runner::new(store.clone(), Arc::new(agent));

    let (_, session) = runner.run("u1", None, "write an email").await.unwrap();

    assert_eq!(
        session.state_value("email"),
        Some(&json!({"subject": "Hello", "body": "Hi team"}))
    );
}

#[tokio::test]
async fn output_key_stores_plain_text_as_string() {
    let store = store();
    let agent = EchoAgent {
        output_key: Some("last_reply".into()),
        ..Default::default()
    };
    let runner = Runner::new(store, Arc::new(agent));

    let (_, session) = runner.run("u1", None, "hello").await.unwrap();

    assert_eq!(session.state_value("last_reply"), Some(&json!("echo: hello")));
}

#[tokio::test]
async fn tool_events_land_between_user_and_agent() {
    let store = store();
    let agent = FixedAgent {
        reply: AgentReply {
            text: "It is nine.".into(),
            tool_events: vec![
                Event::tool_call("get_current_time", json!({})),
                Event::tool_result("get_current_time", json!("2025-01-01T09:00:00.000000")),
            ],
        },
        output_key: None,
    };
    let runner = Runner::new(store, Arc::new(agent));

    let (_, session) = runner.run("u1", None, "time?").await.unwrap();

    assert_eq!(
        session.events(),
        &[
            Event::user("time?"),
            Event::tool_call("get_current_time", json!({})),
            Event::tool_result("get_current_time", json!("2025-01-01T09:00:00.000000")),
            Event::agent("It is nine."),
        ]
    );
}

#[tokio::test]
async fn streaming_run_reports_deltas_and_records_reply() {
    let store = store();
    let runner = Runner::new(store, Arc::new(EchoAgent::default()));
    let seen = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&seen);
    let on_delta = move |text: &str| sink.lock().unwrap().push_str(text);

    let (reply, session) = runner
        .run_streaming("u1", None, "stream me", &on_delta)
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), reply);
    assert_eq!(session.events().len(), 2);
}

#[tokio::test]
async fn concurrent_turns_on_one_session_do_not_interleave() {
    let store = store();
    let session = store.create_session("u1", QNA_APP_NAME, None);
    let runner = Arc::new(Runner::new(store.clone(), Arc::new(EchoAgent::default())));

    let mut handles = Vec::new();
    for i in 0..10 {
        let runner = Arc::clone(&runner);
        let id = session.id().to_string();
        handles.push(tokio::spawn(async move {
            runner.run("u1", Some(&id), &format!("m{i}")).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let events = store.get_session(session.id()).unwrap().events().to_vec();
    assert_eq!(events.len(), 20);
    for pair in events.chunks(2) {
        let question = pair[0].content().unwrap();
        assert!(pair[0].is_user());
        assert_eq!(pair[1], Event::agent(format!("echo: {question}")));
    }
}

#[tokio::test]
async fn end_session_deletes_it() {
    let store = store();
    let runner = Runner::new(store.clone(), Arc::new(EchoAgent::default()));
    let (_, session) = runner.run("u1", None, "bye").await.unwrap();

    assert!(runner.end_session(session.id()).await);
    assert!(store.get_session(session.id()).is_none());
    assert!(!runner.end_session(session.id()).await);
}

#[tokio::test]
async fn end_session_waits_for_the_turn_in_flight() {
    let store = store();
    store
        .create_session_with_id("local-session", "u1", QNA_APP_NAME, None)
        .unwrap();
    let runner = Arc::new(Runner::new(
        store.clone(),
        Arc::new(SlowAgent {
            delay: Duration::from_millis(200),
        }),
    ));

    let turn = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run("u1", Some("local-session"), "old").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(runner.end_session("local-session").await);
    let (reply, finished) = turn.await.unwrap().unwrap();
    assert_eq!(reply, "reply to old");
    assert_eq!(finished.events().len(), 2);

    let err = store
        .create_session_with_id("local-session", "u2", QNA_APP_NAME, None)
        .unwrap_err();
    assert!(matches!(err, AgentError::SessionExists(_)));
    assert!(store.get_session("local-session").is_none());
}

#[tokio::test]
async fn turn_queued_behind_end_session_is_rejected() {
    let store = store();
    store
        .create_session_with_id("s1", "u1", QNA_APP_NAME, None)
        .unwrap();
    let runner = Arc::new(Runner::new(
        store.clone(),
        Arc::new(SlowAgent {
            delay: Duration::from_millis(150),
        }),
    ));

    let first = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run("u1", Some("s1"), "first").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    let ended = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.end_session("s1").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    let second = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run("u1", Some("s1"), "second").await })
    };

    assert!(first.await.unwrap().is_ok());
    assert!(ended.await.unwrap());
    let err = second.await.unwrap().unwrap_err();
    assert!(matches!(err, AgentError::SessionNotFound(ref id) if id == "s1"));
}
