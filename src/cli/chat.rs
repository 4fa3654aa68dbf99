//! `agentdeck chat`: an interactive loop against one agent.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::{classify_input, format_reply, ChatArgs, Input};
use crate::agents::AgentOptions;
use crate::config::AgentConfig;
use crate::runner::Runner;
use crate::session::{InMemorySessionStore, SessionStore};

/// Handle `agentdeck chat`.
pub async fn handle_chat(
    args: ChatArgs,
    config: AgentConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = args.agent;
    let options = AgentOptions {
        model: args.model.clone().or_else(|| config.model().map(str::to_string)),
        ..Default::default()
    };
    let agent = kind.build(&options, &config)?;

    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    store.create_session_with_id(&args.session, &args.user, kind.app_name(), None)?;
    let runner = Runner::new(store, agent).with_app_name(kind.app_name());

    println!("{}", kind.banner());
    println!("Type 'exit' or 'quit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let message = match classify_input(&line) {
            Input::Skip => continue,
            Input::Exit => {
                println!("Agent: Goodbye!");
                break;
            }
            Input::Message(message) => message,
        };

        let result = if args.stream {
            print!("Agent: ");
            let on_delta = |text: &str| {
                print!("{text}");
                let _ = std::io::stdout().flush();
            };
            let result = runner
                .run_streaming(&args.user, Some(&args.session), message, &on_delta)
                .await;
            println!();
            result.map(|(reply, _)| {
                if kind.produces_email() {
                    println!("{}", format_reply(kind, &reply));
                }
            })
        } else {
            runner
                .run(&args.user, Some(&args.session), message)
                .await
                .map(|(reply, _)| println!("Agent: {}", format_reply(kind, &reply)))
        };

        if let Err(e) = result {
            eprintln!("Error: {e}");
        }
    }

    runner.end_session(&args.session).await;
    Ok(())
}
