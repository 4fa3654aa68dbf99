//! agentdeck: conversational agents over an in-memory session store.
//!
//! A [`Runner`](runner::Runner) records each user message in a
//! [`Session`](session::Session), asks one [`AgentHandler`](agent::AgentHandler)
//! for a reply, and records that too. The [`agents`] catalog ships Gemini-backed
//! agents (email, greeting, search, time) and a Q&A agent that answers from
//! session state.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentdeck::prelude::*;
//!
//! # async fn example() -> agentdeck::error::Result<()> {
//! let config = AgentConfig::from_env();
//! let agent = AgentKind::Greeting.build(&AgentOptions::default(), &config)?;
//! let runner = Runner::new(Arc::new(InMemorySessionStore::new()), agent);
//! let (reply, session) = runner.run("user-1", None, "Hi, I'm Brandon").await?;
//! println!("{reply} ({} events)", session.events().len());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agents;
pub mod config;
pub mod error;
pub mod generation;
pub mod prelude;
pub mod provider;
pub mod runner;
pub mod session;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
