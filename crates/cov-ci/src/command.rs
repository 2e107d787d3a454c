//! Shared machinery for `cov-*` command builders.
//!
//! A builder turns an option block plus the installed toolchain version into
//! a [`CommandInvocation`]: the ordered argument vector, the environment the
//! process should see, and an optional working directory. Optional flags are
//! described declaratively with [`FlagRule`] tables so the emission order and
//! the version gates can be read off one list.

use crate::error::{CommandError, Result};
use crate::runner::{CommandOutcome, CommandRunner};
use async_trait::async_trait;
use cov_core::{tokenize, ConnectServer, CoverityVersion, VersionNumber};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variables handed to launched processes.
pub type EnvVars = BTreeMap<String, String>;

/// Build-wide inputs shared by every command.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Intermediate directory passed as `--dir`.
    pub intermediate_dir: String,

    /// Installed toolchain version, used for flag gating.
    pub version: CoverityVersion,

    /// Coverity installation root; executables resolve to `<home>/bin/<tool>`.
    pub coverity_home: Option<PathBuf>,

    /// Connect server for history download.
    pub server: Option<ConnectServer>,
}

impl BuildContext {
    pub fn new(intermediate_dir: impl Into<String>, version: CoverityVersion) -> Self {
        Self {
            intermediate_dir: intermediate_dir.into(),
            version,
            coverity_home: None,
            server: None,
        }
    }

    pub fn with_coverity_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.coverity_home = Some(home.into());
        self
    }

    pub fn with_server(mut self, server: ConnectServer) -> Self {
        self.server = Some(server);
        self
    }

    /// Program path for `tool`, inside the installation when one is configured.
    pub fn program(&self, tool: &str) -> String {
        match &self.coverity_home {
            Some(home) => home.join("bin").join(tool).to_string_lossy().into_owned(),
            None => tool.to_string(),
        }
    }

    /// The argument vector prefix every command starts with: program, `--dir`, idir.
    pub fn base_args(&self, tool: &str) -> Vec<String> {
        vec![
            self.program(tool),
            "--dir".to_string(),
            self.intermediate_dir.clone(),
        ]
    }
}

/// A fully assembled process invocation.
///
/// `env` and `secret_env` belong to this process alone. Secrets are never
/// serialized, and `Debug` prints only their names.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CommandInvocation {
    /// Tool name used in log lines (`cov-import-scm`).
    pub tool: String,

    /// Argument vector; the first element is the program.
    pub args: Vec<String>,

    /// Environment for the process, layered over the inherited one.
    pub env: EnvVars,

    /// Credentials handed to the process through its environment.
    #[serde(skip)]
    pub secret_env: EnvVars,

    pub working_dir: Option<PathBuf>,
}

impl CommandInvocation {
    pub fn new(tool: &str, args: Vec<String>) -> Self {
        Self {
            tool: tool.to_string(),
            args,
            env: EnvVars::new(),
            secret_env: EnvVars::new(),
            working_dir: None,
        }
    }

    /// Put `base` underneath this invocation's own variables; own entries win.
    pub fn layered_over(mut self, base: &EnvVars) -> Self {
        let own = std::mem::replace(&mut self.env, base.clone());
        self.env.extend(own);
        self
    }

    /// The log line emitted right before launch.
    pub fn argument_line(&self) -> String {
        format!(
            "[Coverity] {} command line arguments: [{}]",
            self.tool,
            self.args.join(", ")
        )
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("tool", &self.tool)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("secret_env", &self.secret_env.keys().collect::<Vec<_>>())
            .field("working_dir", &self.working_dir)
            .finish()
    }
}

/// One optional `flag value` pair in a builder's emission table.
pub struct FlagRule<B> {
    pub flag: &'static str,

    /// Oldest toolchain release that understands the flag.
    pub min_version: Option<VersionNumber>,

    /// Value to emit; `None` skips the flag.
    pub value: fn(&B) -> Option<&str>,
}

impl<B> FlagRule<B> {
    pub const fn always(flag: &'static str, value: fn(&B) -> Option<&str>) -> Self {
        Self {
            flag,
            min_version: None,
            value,
        }
    }

    pub const fn since(
        flag: &'static str,
        min_version: VersionNumber,
        value: fn(&B) -> Option<&str>,
    ) -> Self {
        Self {
            flag,
            min_version: Some(min_version),
            value,
        }
    }

    pub fn is_supported(&self, version: &CoverityVersion) -> bool {
        self.min_version.map_or(true, |min| version.supports(min))
    }
}

/// Append every rule with a value, in table order, skipping flags the
/// installed version does not support.
pub fn apply_rules<B>(
    rules: &[FlagRule<B>],
    block: &B,
    version: &CoverityVersion,
    args: &mut Vec<String>,
) {
    for rule in rules {
        let Some(value) = (rule.value)(block) else {
            continue;
        };
        if !rule.is_supported(version) {
            debug!(flag = rule.flag, version = %version, "Flag not supported by installed version, omitting");
            continue;
        }
        args.push(rule.flag.to_string());
        args.push(value.to_string());
    }
}

/// Tokenize a free-form field and append the tokens.
///
/// `command` names the field's owner in the error message.
pub fn append_additional(
    input: Option<&str>,
    command: &'static str,
    args: &mut Vec<String>,
) -> Result<()> {
    let Some(input) = input else {
        return Ok(());
    };
    let tokens = tokenize(input).ok_or(CommandError::Tokenize { command })?;
    args.extend(tokens);
    Ok(())
}

/// A builder for one Coverity tool.
#[async_trait]
pub trait CoverityCommand: Send + Sync {
    /// Tool name, e.g. `cov-import-scm`.
    fn tool(&self) -> &'static str;

    /// Whether the configuration asks for this command at all.
    fn can_execute(&self, ctx: &BuildContext) -> bool;

    /// Assemble the invocation. Its `env` holds only this command's own
    /// variables.
    ///
    /// Fails with [`CommandError::NotConfigured`] when
    /// [`can_execute`](Self::can_execute) is false.
    fn prepare(&self, ctx: &BuildContext) -> Result<CommandInvocation>;

    /// Prepare, log and launch the command.
    ///
    /// Returns `Ok(None)` without launching anything when the command cannot
    /// execute. The process sees `env` plus the command's own variables, which
    /// are also written back into `env`; secrets are not. Preparation errors
    /// abort before launch and leave `env` untouched.
    async fn run(
        &self,
        ctx: &BuildContext,
        env: &mut EnvVars,
        runner: &dyn CommandRunner,
    ) -> Result<Option<CommandOutcome>> {
        if !self.can_execute(ctx) {
            debug!(tool = self.tool(), "Command not configured, skipping");
            return Ok(None);
        }

        let invocation = self.prepare(ctx)?.layered_over(env);
        env.clone_from(&invocation.env);
        info!("{}", invocation.argument_line());
        runner.execute(&invocation).await.map(Some)
    }
}
