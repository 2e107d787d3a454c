//! Error types for Coverity command construction and execution

use thiserror::Error;

/// Errors raised while building or launching a `cov-*` command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A free-form additional-command field could not be tokenized
    #[error("Parse error occurred during tokenizing the {command} additional command")]
    Tokenize { command: &'static str },

    /// The builder was asked to prepare a command its options do not enable
    #[error("Command {tool} is not configured to run")]
    NotConfigured { tool: &'static str },

    /// An invocation with no program
    #[error("Command {0} has an empty argument vector")]
    EmptyCommand(String),

    /// The process could not be started
    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exceeded its timeout
    #[error("Command {tool} timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },

    /// The process was terminated by a signal before exiting
    #[error("Command {tool} was interrupted")]
    Interrupted { tool: String },

    /// IO error while waiting on the process
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
