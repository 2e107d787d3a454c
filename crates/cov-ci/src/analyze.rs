//! `cov-analyze`: run the analysis, optionally with Test Advisor policy evaluation.

use crate::command::{
    append_additional, apply_rules, BuildContext, CommandInvocation, CoverityCommand, FlagRule,
};
use crate::error::Result;
use cov_core::{AnalysisOptionBlock, TaOptionBlock, VersionNumber};

pub const COV_ANALYZE: &str = "cov-analyze";

/// Test Advisor flags, in emission order. Policy files and path stripping
/// need Indio or later.
static TEST_ADVISOR_FLAGS: &[FlagRule<TaOptionBlock>] = &[
    FlagRule::since("--test-advisor-policy", VersionNumber::INDIO, TaOptionBlock::policy_file),
    FlagRule::since("--strip-path", VersionNumber::INDIO, TaOptionBlock::strip_path),
];

pub struct CovAnalyzeCommand<'a> {
    test_advisor: Option<&'a TaOptionBlock>,
    analysis: Option<&'a AnalysisOptionBlock>,
}

impl<'a> CovAnalyzeCommand<'a> {
    pub fn new(
        test_advisor: Option<&'a TaOptionBlock>,
        analysis: Option<&'a AnalysisOptionBlock>,
    ) -> Self {
        Self {
            test_advisor,
            analysis,
        }
    }
}

impl CoverityCommand for CovAnalyzeCommand<'_> {
    fn tool(&self) -> &'static str {
        COV_ANALYZE
    }

    fn can_execute(&self, _ctx: &BuildContext) -> bool {
        true
    }

    fn prepare(&self, ctx: &BuildContext) -> Result<CommandInvocation> {
        let mut args = ctx.base_args(COV_ANALYZE);

        if let Some(block) = self.test_advisor {
            args.push("--test-advisor".to_string());
            apply_rules(TEST_ADVISOR_FLAGS, block, &ctx.version, &mut args);
        }

        append_additional(
            self.analysis.and_then(AnalysisOptionBlock::additional_args),
            "cov analyze",
            &mut args,
        )?;

        Ok(CommandInvocation::new(COV_ANALYZE, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use cov_core::CoverityVersion;

    fn prepare(
        version: CoverityVersion,
        ta: Option<&TaOptionBlock>,
        analysis: Option<&AnalysisOptionBlock>,
    ) -> Result<CommandInvocation> {
        let ctx = BuildContext::new("idir", version);
        CovAnalyzeCommand::new(ta, analysis).prepare(&ctx)
    }

    #[test]
    fn test_plain_analysis() {
        let invocation = prepare(CoverityVersion::JASPER, None, None).unwrap();
        assert_eq!(invocation.args, vec!["cov-analyze", "--dir", "idir"]);
    }

    #[test]
    fn test_test_advisor_flags() {
        let ta = TaOptionBlock::new()
            .with_policy_file("policy.json")
            .with_strip_path("/src");
        let analysis = AnalysisOptionBlock::with_additional_args("--all --jobs 4");

        let invocation = prepare(CoverityVersion::JASPER, Some(&ta), Some(&analysis)).unwrap();
        assert_eq!(
            invocation.args,
            vec![
                "cov-analyze", "--dir", "idir", "--test-advisor", "--test-advisor-policy",
                "policy.json", "--strip-path", "/src", "--all", "--jobs", "4",
            ]
        );
    }

    #[test]
    fn test_gated_flags_omitted_before_indio() {
        let ta = TaOptionBlock::new()
            .with_policy_file("policy.json")
            .with_strip_path("/src");

        let invocation = prepare(CoverityVersion::new(7, 6, 1, 0), Some(&ta), None).unwrap();
        assert_eq!(
            invocation.args,
            vec!["cov-analyze", "--dir", "idir", "--test-advisor"]
        );
    }

    #[test]
    fn test_bad_additional_args() {
        let analysis = AnalysisOptionBlock::with_additional_args("--strip-path 'oops");
        let err = prepare(CoverityVersion::JASPER, None, Some(&analysis)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error occurred during tokenizing the cov analyze additional command"
        );
        assert!(matches!(err, CommandError::Tokenize { .. }));
    }
}
