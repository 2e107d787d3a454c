//! `cov-manage-history download`: merge defect history from Connect before a
//! Test Advisor analysis.

use crate::command::{BuildContext, CommandInvocation, CoverityCommand};
use crate::error::{CommandError, Result};
use cov_core::{TaOptionBlock, VersionNumber};

pub const COV_MANAGE_HISTORY: &str = "cov-manage-history";

/// Connect password; kept out of argv.
pub const PASSPHRASE_ENV: &str = "COVERITY_PASSPHRASE";

/// History download needs Jasper or later.
pub const HISTORY_MIN_VERSION: VersionNumber = VersionNumber::JASPER;

pub struct CovManageHistoryCommand<'a> {
    test_advisor: Option<&'a TaOptionBlock>,
}

impl<'a> CovManageHistoryCommand<'a> {
    pub fn new(test_advisor: Option<&'a TaOptionBlock>) -> Self {
        Self { test_advisor }
    }
}

impl CoverityCommand for CovManageHistoryCommand<'_> {
    fn tool(&self) -> &'static str {
        COV_MANAGE_HISTORY
    }

    fn can_execute(&self, ctx: &BuildContext) -> bool {
        self.test_advisor
            .is_some_and(TaOptionBlock::cov_history_enabled)
            && ctx.server.is_some()
            && ctx.version.supports(HISTORY_MIN_VERSION)
    }

    fn prepare(&self, ctx: &BuildContext) -> Result<CommandInvocation> {
        let server = match &ctx.server {
            Some(server) if self.can_execute(ctx) => server,
            _ => {
                return Err(CommandError::NotConfigured {
                    tool: COV_MANAGE_HISTORY,
                })
            }
        };

        let mut args = ctx.base_args(COV_MANAGE_HISTORY);
        args.extend([
            "download".to_string(),
            "--host".to_string(),
            server.host.clone(),
            "--port".to_string(),
            server.port.to_string(),
            "--stream".to_string(),
            server.stream.clone(),
            "--user".to_string(),
            server.user.clone(),
        ]);
        if server.ssl {
            args.push("--ssl".to_string());
        }
        args.push("--merge".to_string());

        let mut invocation = CommandInvocation::new(COV_MANAGE_HISTORY, args);
        if let Some(password) = &server.password {
            invocation
                .secret_env
                .insert(PASSPHRASE_ENV.to_string(), password.clone());
        }
        Ok(invocation)
    }
}
