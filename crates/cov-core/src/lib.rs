//! Coverity CI core
//!
//! Shared building blocks for driving the Coverity command-line toolchain:
//! - Toolchain version parsing and capability comparison
//! - Option blocks describing what each `cov-*` invocation should do
//! - Shell-style tokenizing of free-form argument fields
//! - Installation probing, pipeline configuration and tracing setup

pub mod config;
pub mod error;
pub mod options;
pub mod probe;
pub mod telemetry;
pub mod tokenize;
pub mod version;

pub use config::{ConnectServer, PipelineConfig};
pub use error::{CoreError, Result};
pub use options::{AnalysisOptionBlock, OptionSet, ScmOptionBlock, TaOptionBlock, SCM_NONE};
pub use probe::{read_install_version, resolve_version};
pub use telemetry::init_tracing;
pub use tokenize::tokenize;
pub use version::{CoverityVersion, VersionNumber};
