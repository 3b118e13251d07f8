//! Command registry for REPL commands
//!
//! Provides a clean, extensible pattern for handling REPL commands.

pub mod general;
pub mod set;

use crate::config::{Config, ConfigStore};
use crate::engine::SessionHandle;
use repcue_core::Language;

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Input did not match any command
    NotACommand,
    /// Error occurred
    Error(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub session: SessionHandle,
    /// Language used for sets started from now on
    pub language: Language,
    /// Number announced with the next set
    pub next_set_number: u32,
    pub config: Config,
    /// Where `lang` persists its choice, if anywhere
    pub store: Option<Box<dyn ConfigStore>>,
}

impl CommandContext {
    pub fn new(session: SessionHandle, config: Config) -> Self {
        Self {
            session,
            language: config.language(),
            next_set_number: 1,
            config,
            store: None,
        }
    }

    /// Persist setting changes through `store`
    pub fn with_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Set control
    registry.register("start", set::cmd_start);
    registry.register("pause", set::cmd_pause);
    registry.register("resume", set::cmd_resume);
    registry.register("skip", set::cmd_skip);
    registry.register("stop", set::cmd_stop);
    registry.register("status", set::cmd_status);
    registry.register("preview", set::cmd_preview);

    // General commands
    registry.register("lang", general::cmd_lang);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}
