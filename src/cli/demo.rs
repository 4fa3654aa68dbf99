//! `agentdeck demo`: the favorite-TV-show walkthrough.

use std::sync::Arc;

use serde_json::json;

use crate::agents::qna::QNA_APP_NAME;
use crate::agents::{AgentOptions, QnaAgent};
use crate::config::AgentConfig;
use crate::runner::Runner;
use crate::session::{InMemorySessionStore, SessionStore, State};

pub const DEMO_USER_ID: &str = "brandon123";
pub const DEMO_PROMPT: &str = "What is Brandon's favorite TV show?";

/// Initial state for the demo session.
pub fn demo_state() -> State {
    let mut state = State::new();
    state.insert("username".into(), json!("Brandon"));
    state.insert(
        "preferences".into(),
        json!({"favorite_tv_show": "Game of Thrones"}),
    );
    state
}

/// Handle `agentdeck demo`.
pub async fn handle_demo(config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let options = AgentOptions {
        model: config.model().map(str::to_string),
        ..Default::default()
    };
    let agent = Arc::new(QnaAgent::from_config(&options, &config)?);
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let runner = Runner::new(store.clone(), agent);

    let session = store.create_session(DEMO_USER_ID, QNA_APP_NAME, Some(demo_state()));

    println!("-> User Prompt: {DEMO_PROMPT}\n");
    let (reply, final_session) = runner
        .run(session.user_id(), Some(session.id()), DEMO_PROMPT)
        .await?;

    println!("<- Agent Reply: {reply}\n");
    println!("-> Final Session State:");
    println!("{}", serde_json::to_string_pretty(&final_session)?);
    Ok(())
}
