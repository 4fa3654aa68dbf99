//! CLI entry point for agentdeck.

pub mod chat;
pub mod demo;

use clap::{Parser, Subcommand};

use crate::agents::{parse_email_reply, AgentKind};

/// agentdeck CLI
#[derive(Parser, Debug)]
#[command(name = "agentdeck", version, about = "Chat with session-aware Gemini agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat with one agent
    Chat(ChatArgs),
    /// Replay the favorite-TV-show scenario against the Q&A agent
    Demo,
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Agent to talk to (email, email-generation, greeting, search, time, qna)
    #[arg(short, long, default_value = "greeting")]
    pub agent: AgentKind,

    /// Gemini model id, e.g. gemini-2.0-flash
    #[arg(short, long)]
    pub model: Option<String>,

    /// User id the session belongs to
    #[arg(short, long, default_value = "local-user")]
    pub user: String,

    /// Session id for this chat
    #[arg(long, default_value = "local-session")]
    pub session: String,

    /// Print the reply as it streams in
    #[arg(long)]
    pub stream: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// What one line typed at the prompt means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Skip,
    Exit,
    Message(&'a str),
}

pub fn classify_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Skip
    } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        Input::Exit
    } else {
        Input::Message(trimmed)
    }
}

/// Render a reply for the terminal. Email replies are validated and shown
/// as subject and body; anything unparseable is shown raw with the reason.
pub fn format_reply(kind: AgentKind, reply: &str) -> String {
    if !kind.produces_email() {
        return reply.to_string();
    }
    match parse_email_reply(reply) {
        Ok(email) => format!("Subject: {}\n\n{}", email.subject, email.body),
        Err(e) => format!("{reply}\n(could not parse email JSON: {e})"),
    }
}
