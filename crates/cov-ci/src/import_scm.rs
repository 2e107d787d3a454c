//! `cov-import-scm`: import source control history into the intermediate directory.

use crate::command::{
    append_additional, apply_rules, BuildContext, CommandInvocation, CoverityCommand, EnvVars,
    FlagRule,
};
use crate::error::{CommandError, Result};
use cov_core::ScmOptionBlock;

pub const COV_IMPORT_SCM: &str = "cov-import-scm";

/// Perforce reads its server address from this variable, not from argv.
pub const P4PORT_ENV: &str = "P4PORT";

fn accurev_project_root(block: &ScmOptionBlock) -> Option<&str> {
    if block.is_system("accurev") {
        block.acc_rev_repo()
    } else {
        None
    }
}

/// Optional flags, in emission order.
static SCM_FLAGS: &[FlagRule<ScmOptionBlock>] = &[
    FlagRule::always("--tool", ScmOptionBlock::custom_test_tool),
    FlagRule::always("--tool-arg", ScmOptionBlock::scm_tool_arguments),
    FlagRule::always("--command-arg", ScmOptionBlock::scm_command_args),
    FlagRule::always("--log", ScmOptionBlock::log_file_loc),
    FlagRule::always("--filename-regex", ScmOptionBlock::file_regex),
    FlagRule::always("--project-root", accurev_project_root),
];

pub struct CovImportScmCommand<'a> {
    options: Option<&'a ScmOptionBlock>,
}

impl<'a> CovImportScmCommand<'a> {
    pub fn new(options: Option<&'a ScmOptionBlock>) -> Self {
        Self { options }
    }

    fn enabled_options(&self) -> Option<&'a ScmOptionBlock> {
        self.options.filter(|block| block.is_enabled())
    }
}

impl CoverityCommand for CovImportScmCommand<'_> {
    fn tool(&self) -> &'static str {
        COV_IMPORT_SCM
    }

    fn can_execute(&self, _ctx: &BuildContext) -> bool {
        self.enabled_options().is_some()
    }

    fn prepare(&self, ctx: &BuildContext) -> Result<CommandInvocation> {
        let Some(block) = self.enabled_options() else {
            return Err(CommandError::NotConfigured {
                tool: COV_IMPORT_SCM,
            });
        };

        let mut args = ctx.base_args(COV_IMPORT_SCM);
        if let Some(system) = block.scm_system() {
            args.push("--scm".to_string());
            args.push(system.trim().to_string());
        }

        apply_rules(SCM_FLAGS, block, &ctx.version, &mut args);
        append_additional(block.scm_additional_cmd(), "cov import scm", &mut args)?;

        let mut env = EnvVars::new();
        if block.is_system("perforce") {
            if let Some(port) = block.p4_port() {
                env.insert(P4PORT_ENV.to_string(), port.to_string());
            }
        }

        Ok(CommandInvocation {
            env,
            ..CommandInvocation::new(COV_IMPORT_SCM, args)
        })
    }
}
