//! Coverity CI - argument builders and execution for the Coverity toolchain
//!
//! Provides:
//! - One builder per `cov-*` tool, turning option blocks into argument vectors
//!   and environment side effects, with version-gated optional flags
//! - A runner seam with a process-backed implementation and a recording double
//! - A pipeline that plans every command up front, then runs them in order

pub mod analyze;
pub mod command;
pub mod digest;
pub mod error;
pub mod import_scm;
pub mod manage_history;
pub mod pipeline;
pub mod runner;

// Re-export key types
pub use analyze::CovAnalyzeCommand;
pub use capture_test::CovCaptureTestCommand;
pub use command::{BuildContext, CommandInvocation, CoverityCommand, EnvVars, FlagRule};
pub use digest::invocation_digest;
pub use error::{CommandError, Result};
pub use import_scm::CovImportScmCommand;
pub use manage_history::CovManageHistoryCommand;
pub use pipeline::{CoverityPipeline, PipelineResult};
pub use runner::{CommandOutcome, CommandRunner, ProcessRunner, RecordingRunner};
