//! Shell-style splitting of free-form "additional command" fields.
//!
//! Splitting follows POSIX shell word rules as implemented by `shlex`:
//!
//! - unquoted whitespace (space, tab, newline) separates tokens
//! - single quotes group text literally, with no escapes inside
//! - double quotes group text; inside them a backslash escapes only
//!   `$`, `` ` ``, `"`, `\` and newline, and is kept before anything else
//! - an unquoted backslash escapes the next character
//! - `#` at the start of a word comments out the rest of the line
//!
//! An unterminated quote or a trailing backslash is a parse failure.

/// Split `input` into argv tokens, or `None` if it cannot be tokenized.
pub fn tokenize(input: &str) -> Option<Vec<String>> {
    shlex::split(input)
}
