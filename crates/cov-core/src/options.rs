//! Option blocks: per-build snapshots of user configuration.
//!
//! Every string option is optional and a blank value is treated exactly like
//! a missing one, so accessors return `Option<&str>` that is `Some` only for
//! non-blank text.

use serde::{Deserialize, Serialize};

/// The SCM system value that disables `cov-import-scm`.
pub const SCM_NONE: &str = "none";

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Options for importing SCM history (`cov-import-scm`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScmOptionBlock {
    scm_system: Option<String>,
    custom_test_tool: Option<String>,
    scm_tool_arguments: Option<String>,
    scm_command_args: Option<String>,
    log_file_loc: Option<String>,
    file_regex: Option<String>,
    acc_rev_repo: Option<String>,
    p4_port: Option<String>,
    scm_additional_cmd: Option<String>,
}

impl ScmOptionBlock {
    pub fn new(scm_system: impl Into<String>) -> Self {
        Self {
            scm_system: Some(scm_system.into()),
            ..Self::default()
        }
    }

    pub fn with_custom_test_tool(mut self, tool: impl Into<String>) -> Self {
        self.custom_test_tool = Some(tool.into());
        self
    }

    pub fn with_scm_tool_arguments(mut self, args: impl Into<String>) -> Self {
        self.scm_tool_arguments = Some(args.into());
        self
    }

    pub fn with_scm_command_args(mut self, args: impl Into<String>) -> Self {
        self.scm_command_args = Some(args.into());
        self
    }

    pub fn with_log_file_loc(mut self, path: impl Into<String>) -> Self {
        self.log_file_loc = Some(path.into());
        self
    }

    pub fn with_file_regex(mut self, regex: impl Into<String>) -> Self {
        self.file_regex = Some(regex.into());
        self
    }

    pub fn with_acc_rev_repo(mut self, root: impl Into<String>) -> Self {
        self.acc_rev_repo = Some(root.into());
        self
    }

    pub fn with_p4_port(mut self, port: impl Into<String>) -> Self {
        self.p4_port = Some(port.into());
        self
    }

    pub fn with_scm_additional_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.scm_additional_cmd = Some(cmd.into());
        self
    }

    pub fn scm_system(&self) -> Option<&str> {
        non_blank(&self.scm_system)
    }

    /// False when the SCM system is missing, blank or `none`.
    pub fn is_enabled(&self) -> bool {
        self.scm_system()
            .is_some_and(|system| !system.trim().eq_ignore_ascii_case(SCM_NONE))
    }

    /// True when the configured SCM system is `system` (case-insensitive).
    pub fn is_system(&self, system: &str) -> bool {
        self.scm_system()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(system))
    }

    pub fn custom_test_tool(&self) -> Option<&str> {
        non_blank(&self.custom_test_tool)
    }

    pub fn scm_tool_arguments(&self) -> Option<&str> {
        non_blank(&self.scm_tool_arguments)
    }

    pub fn scm_command_args(&self) -> Option<&str> {
        non_blank(&self.scm_command_args)
    }

    pub fn log_file_loc(&self) -> Option<&str> {
        non_blank(&self.log_file_loc)
    }

    pub fn file_regex(&self) -> Option<&str> {
        non_blank(&self.file_regex)
    }

    pub fn acc_rev_repo(&self) -> Option<&str> {
        non_blank(&self.acc_rev_repo)
    }

    pub fn p4_port(&self) -> Option<&str> {
        non_blank(&self.p4_port)
    }

    pub fn scm_additional_cmd(&self) -> Option<&str> {
        non_blank(&self.scm_additional_cmd)
    }
}

/// Test Advisor options, shared by test capture, analysis and history download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaOptionBlock {
    custom_test_command: Option<String>,
    c_option_block: bool,
    cs_option_block: bool,
    java_option_block: bool,
    cs_framework: Option<String>,
    cs_coverage_tool: Option<String>,
    cxx_coverage_tool: Option<String>,
    java_coverage_tool: Option<String>,
    junit_framework: bool,
    junit4_framework: bool,
    policy_file: Option<String>,
    ta_strip_path: Option<String>,
    bulls_eye_dir: Option<String>,
    custom_work_dir: Option<String>,
    cov_history_checkbox: bool,
}

impl TaOptionBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_test_command(mut self, command: impl Into<String>) -> Self {
        self.custom_test_command = Some(command.into());
        self
    }

    /// Enable C/C++ coverage collection with the given tool (`gcov`, `bullseye`, ...).
    pub fn with_cxx_coverage(mut self, tool: impl Into<String>) -> Self {
        self.c_option_block = true;
        self.cxx_coverage_tool = Some(tool.into());
        self
    }

    pub fn with_bulls_eye_dir(mut self, dir: impl Into<String>) -> Self {
        self.bulls_eye_dir = Some(dir.into());
        self
    }

    /// Enable C# coverage collection with the given tool and test framework.
    pub fn with_cs_coverage(mut self, tool: impl Into<String>, framework: impl Into<String>) -> Self {
        self.cs_option_block = true;
        self.cs_coverage_tool = Some(tool.into());
        self.cs_framework = Some(framework.into());
        self
    }

    /// Enable Java coverage collection with the given tool.
    pub fn with_java_coverage(mut self, tool: impl Into<String>) -> Self {
        self.java_option_block = true;
        self.java_coverage_tool = Some(tool.into());
        self
    }

    pub fn with_junit_framework(mut self, enabled: bool) -> Self {
        self.junit_framework = enabled;
        self
    }

    pub fn with_junit4_framework(mut self, enabled: bool) -> Self {
        self.junit4_framework = enabled;
        self
    }

    pub fn with_policy_file(mut self, path: impl Into<String>) -> Self {
        self.policy_file = Some(path.into());
        self
    }

    pub fn with_strip_path(mut self, path: impl Into<String>) -> Self {
        self.ta_strip_path = Some(path.into());
        self
    }

    pub fn with_custom_work_dir(mut self, dir: impl Into<String>) -> Self {
        self.custom_work_dir = Some(dir.into());
        self
    }

    pub fn with_cov_history(mut self, enabled: bool) -> Self {
        self.cov_history_checkbox = enabled;
        self
    }

    pub fn custom_test_command(&self) -> Option<&str> {
        non_blank(&self.custom_test_command)
    }

    pub fn c_enabled(&self) -> bool {
        self.c_option_block
    }

    pub fn cs_enabled(&self) -> bool {
        self.cs_option_block
    }

    pub fn java_enabled(&self) -> bool {
        self.java_option_block
    }

    pub fn cxx_coverage_tool(&self) -> Option<&str> {
        non_blank(&self.cxx_coverage_tool)
    }

    pub fn bulls_eye_dir(&self) -> Option<&str> {
        non_blank(&self.bulls_eye_dir)
    }

    pub fn cs_coverage_tool(&self) -> Option<&str> {
        non_blank(&self.cs_coverage_tool)
    }

    pub fn cs_framework(&self) -> Option<&str> {
        non_blank(&self.cs_framework)
    }

    pub fn java_coverage_tool(&self) -> Option<&str> {
        non_blank(&self.java_coverage_tool)
    }

    /// The Java test framework, `junit4` winning over `junit` when both are set.
    pub fn java_test_framework(&self) -> Option<&'static str> {
        if self.junit4_framework {
            Some("junit4")
        } else if self.junit_framework {
            Some("junit")
        } else {
            None
        }
    }

    pub fn policy_file(&self) -> Option<&str> {
        non_blank(&self.policy_file)
    }

    pub fn strip_path(&self) -> Option<&str> {
        non_blank(&self.ta_strip_path)
    }

    pub fn custom_work_dir(&self) -> Option<&str> {
        non_blank(&self.custom_work_dir)
    }

    pub fn cov_history_enabled(&self) -> bool {
        self.cov_history_checkbox
    }
}

/// Extra options for `cov-analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptionBlock {
    additional_args: Option<String>,
}

impl AnalysisOptionBlock {
    pub fn with_additional_args(args: impl Into<String>) -> Self {
        Self {
            additional_args: Some(args.into()),
        }
    }

    pub fn additional_args(&self) -> Option<&str> {
        non_blank(&self.additional_args)
    }
}

/// All option blocks configured for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSet {
    pub scm: Option<ScmOptionBlock>,
    pub test_advisor: Option<TaOptionBlock>,
    pub analysis: Option<AnalysisOptionBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scm_block_enabled() {
        assert!(ScmOptionBlock::new("git").is_enabled());
        assert!(!ScmOptionBlock::new("none").is_enabled());
        assert!(!ScmOptionBlock::new("None").is_enabled());
        assert!(!ScmOptionBlock::new("  ").is_enabled());
        assert!(!ScmOptionBlock::default().is_enabled());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let block = ScmOptionBlock::new("git")
            .with_custom_test_tool("")
            .with_log_file_loc("   ")
            .with_file_regex("*.java");
        assert_eq!(block.custom_test_tool(), None);
        assert_eq!(block.log_file_loc(), None);
        assert_eq!(block.file_regex(), Some("*.java"));
    }

    #[test]
    fn test_is_system_ignores_case() {
        let block = ScmOptionBlock::new("Perforce");
        assert!(block.is_system("perforce"));
        assert!(!block.is_system("git"));
    }

    #[test]
    fn test_java_framework_preference() {
        let block = TaOptionBlock::new().with_junit_framework(true);
        assert_eq!(block.java_test_framework(), Some("junit"));

        let block = block.with_junit4_framework(true);
        assert_eq!(block.java_test_framework(), Some("junit4"));

        assert_eq!(TaOptionBlock::new().java_test_framework(), None);
    }

    #[test]
    fn test_option_set_deserializes_partial_blocks() {
        let set: OptionSet = serde_json::from_str(
            r#"{"scm": {"scm_system": "git", "file_regex": "*.rs"}, "test_advisor": {"cov_history_checkbox": true}}"#,
        )
        .unwrap();

        let scm = set.scm.unwrap();
        assert!(scm.is_system("git"));
        assert_eq!(scm.file_regex(), Some("*.rs"));
        assert!(set.test_advisor.unwrap().cov_history_enabled());
        assert!(set.analysis.is_none());
    }
}
