//! Built-in chat commands
//!
//! Anything starting with `/` is a command; everything else is a message for
//! the support agent.

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Reset,
    Stats,
    Recent { limit: usize },
    Exit,
    Unknown { input: String },
}

/// Default number of entries shown by `/recent`
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Check whether input is a command
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parse a `/command`; non-commands come back as `Unknown`
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    let parts: Vec<&str> = body.split_whitespace().collect();
    let Some(name) = parts.first() else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    match name.to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "reset" => Command::Reset,
        "stats" => Command::Stats,
        "recent" => {
            let limit = parts
                .get(1)
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RECENT_LIMIT);
            Command::Recent { limit }
        }
        "exit" | "quit" | "q" => Command::Exit,
        _ => Command::Unknown {
            input: input.to_string(),
        },
    }
}

/// Help text, one command per line
pub fn help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("/reset", "Forget the conversation so far"),
        ("/stats", "Show sentiment analytics"),
        ("/recent [N]", "Show the N most recent messages (max 50)"),
        ("/help", "Show this help"),
        ("/exit", "Quit"),
    ]
}
