//! Interactive chat REPL
//!
//! One conversation per REPL session. Input lines are either `/commands`
//! handled locally or customer messages sent through the support service.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::repl::commands::{is_command, parse, Command};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputEvent, InputHandler};
use crate::service::SupportService;

/// What the loop should do after handling one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// REPL session coordinator
pub struct ReplSession {
    input: InputHandler,
    display: DisplayManager,
    service: SupportService,
    conversation_id: String,
}

impl ReplSession {
    /// Create session with persistent line history at `history_path`
    pub async fn new(
        service: SupportService,
        display: DisplayManager,
        history_path: Option<PathBuf>,
    ) -> Result<Self> {
        let input = match history_path {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };
        let conversation_id = service.open_conversation().await;

        Ok(Self {
            input,
            display,
            service,
            conversation_id,
        })
    }

    /// Read-eval-print until `/exit` or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.input.read_line()? {
                InputEvent::Line(line) if line.is_empty() => continue,
                InputEvent::Line(line) => {
                    if self.handle_line(&line).await == Flow::Exit {
                        break;
                    }
                }
                InputEvent::Interrupted => {
                    println!("\nUse /exit to quit gracefully");
                }
                InputEvent::Eof => break,
            }
        }

        self.service.close(&self.conversation_id).await;
        self.input.save_history()?;
        Ok(())
    }

    /// Handle one non-empty line
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        if is_command(line) {
            return self.execute(parse(line)).await;
        }

        let spinner = self.display.spinner("Thinking...");
        let result = self.service.chat(&self.conversation_id, line).await;
        spinner.finish_and_clear();

        match result {
            Ok(reply) => self.display.show_reply(&reply),
            Err(e) if e.is_retryable_by_user() => {
                self.display
                    .show_error("Sorry, I couldn't answer that right now. Please try again.");
                tracing::warn!(error = %e, "Chat message failed");
            }
            Err(e) => self.display.show_error(&e.to_string()),
        }
        Flow::Continue
    }

    async fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Help => self.display.show_help(),
            Command::Reset => {
                self.service.reset(&self.conversation_id).await;
                println!("{}", "Conversation reset.".yellow());
            }
            Command::Stats => self.display.show_overview(&self.service.overview()),
            Command::Recent { limit } => self.display.show_recent(&self.service.recent(limit)),
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                return Flow::Exit;
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
            }
        }
        Flow::Continue
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn display(&self) -> &DisplayManager {
        &self.display
    }
}
