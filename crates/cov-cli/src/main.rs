//! Coverity CI - drive the Coverity command-line toolchain from a build
//!
//! ## Commands
//!
//! - `version`: parse a toolchain version and show how it resolves
//! - `args`: print the argument vectors a pipeline would launch
//! - `run`: launch the configured pipeline

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cov_ci::{
    invocation_digest, BuildContext, CommandInvocation, CoverityPipeline, EnvVars, PipelineResult,
    ProcessRunner,
};
use cov_core::{resolve_version, CoverityVersion, PipelineConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "covci")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run Coverity static analysis steps from CI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and results
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a toolchain version string
    Version {
        /// Version string or release code name
        version: String,

        /// Check whether `version` is at least as capable as this one
        #[arg(long)]
        against: Option<String>,
    },

    /// Print the argument vectors without launching anything
    Args {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Launch the configured Coverity commands
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Per-command timeout in seconds (0 = none); overrides the config file
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Args)]
struct PipelineArgs {
    /// Pipeline configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Coverity Analysis installation root
    #[arg(long, env = "COVERITY_HOME")]
    home: Option<PathBuf>,

    /// Intermediate directory
    #[arg(long, env = "COV_IDIR")]
    dir: Option<String>,

    /// Toolchain version to assume instead of reading <home>/VERSION
    #[arg(long = "coverity-version", env = "COVERITY_VERSION")]
    coverity_version: Option<String>,

    /// Connect password for history download
    #[arg(long, env = "COVERITY_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,
}

#[derive(Serialize)]
struct VersionReport {
    input: String,
    parsed: CoverityVersion,
    code_name: bool,
    known: bool,
    effective: CoverityVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    against: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compatible: Option<bool>,
}

fn version_report(input: &str, against: Option<&str>) -> VersionReport {
    let parsed = CoverityVersion::parse(input);
    let compatible = against.map(|other| parsed.compare_to_analysis(&CoverityVersion::parse(other)));
    VersionReport {
        input: input.to_string(),
        code_name: parsed.is_code_name(),
        known: parsed.is_known(),
        effective: parsed.effective_version(),
        parsed,
        against: against.map(str::to_string),
        compatible,
    }
}

/// Merge the config file with command-line and environment overrides.
fn load_config(args: &PipelineArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(home) = &args.home {
        config.coverity_home = Some(home.clone());
    }
    if let Some(dir) = &args.dir {
        config.intermediate_dir = dir.clone();
    }
    if let Some(version) = &args.coverity_version {
        config.version = Some(version.clone());
    }
    if let (Some(server), Some(passphrase)) = (config.server.as_mut(), &args.passphrase) {
        if server.password.is_none() {
            server.password = Some(passphrase.clone());
        }
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build_context(config: &PipelineConfig) -> Result<BuildContext> {
    let version = resolve_version(config.version.as_deref(), config.coverity_home.as_deref())
        .context("Failed to determine the Coverity version")?;

    let mut ctx = BuildContext::new(config.intermediate_dir.clone(), version);
    if let Some(home) = &config.coverity_home {
        ctx = ctx.with_coverity_home(home.clone());
    }
    if let Some(server) = &config.server {
        ctx = ctx.with_server(server.clone());
    }
    Ok(ctx)
}

fn cmd_version(version: &str, against: Option<&str>, json: bool) -> Result<()> {
    let report = version_report(version, against);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Version:   {}", report.parsed);
    if report.code_name {
        let status = if report.known { "known" } else { "unknown" };
        println!("Code name: yes ({})", status);
    }
    println!("Effective: {}", report.effective);
    if let (Some(other), Some(compatible)) = (&report.against, report.compatible) {
        println!(
            "At least {}: {}",
            other,
            if compatible { "yes" } else { "no" }
        );
    }
    Ok(())
}

/// Planned invocations as JSON; secret variables are left out.
fn plan_json(plan: &[CommandInvocation]) -> Result<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

fn cmd_args(pipeline: &PipelineArgs, json: bool) -> Result<()> {
    let config = load_config(pipeline)?;
    let ctx = build_context(&config)?;

    let plan = CoverityPipeline::plan(&ctx, &config.options, &EnvVars::new())?;

    if json {
        println!("{}", plan_json(&plan)?);
        return Ok(());
    }

    println!("Coverity version: {}", ctx.version);
    for invocation in &plan {
        println!("{}", invocation.argument_line());
        for key in invocation.env.keys() {
            println!("    env {}", key);
        }
        for key in invocation.secret_env.keys() {
            println!("    env {} (secret)", key);
        }
    }
    println!("Digest: {}", invocation_digest(&plan));
    Ok(())
}

fn print_result(result: &PipelineResult) {
    println!("Run ID: {}", result.run_id);
    println!("Status: {}", if result.success { "✓ PASSED" } else { "✗ FAILED" });
    println!("Duration: {}ms", result.duration_ms);
    println!();

    for step in &result.steps {
        let status = if step.passed() { "✓" } else { "✗" };
        println!(
            "  {} {} ({}ms, exit code: {})",
            status, step.tool, step.duration_ms, step.exit_code
        );
        if !step.passed() && !step.stderr.trim().is_empty() {
            println!("{}", step.stderr.trim_end());
        }
    }

    println!();
    println!(
        "Summary: {}/{} commands passed",
        result.passed_count(),
        result.steps.len()
    );
}

async fn cmd_run(pipeline: &PipelineArgs, timeout: Option<u64>, json: bool) -> Result<()> {
    let mut config = load_config(pipeline)?;
    if let Some(timeout) = timeout {
        config.timeout_secs = timeout;
    }
    let ctx = build_context(&config)?;
    info!(version = %ctx.version, dir = %ctx.intermediate_dir, "Resolved Coverity toolchain");

    let runner = ProcessRunner::new(config.timeout_secs);
    let result = CoverityPipeline::run(&runner, &ctx, &config.options, &EnvVars::new())
        .await
        .context("Coverity pipeline failed to run")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if result.success {
        Ok(())
    } else {
        anyhow::bail!("Coverity pipeline failed")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    cov_core::init_tracing(cli.json, level);

    match &cli.command {
        Commands::Version { version, against } => {
            cmd_version(version, against.as_deref(), cli.json)
        }
        Commands::Args { pipeline } => cmd_args(pipeline, cli.json),
        Commands::Run { pipeline, timeout } => cmd_run(pipeline, *timeout, cli.json).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    fn pipeline_args(config: Option<PathBuf>) -> PipelineArgs {
        PipelineArgs {
            config,
            home: None,
            dir: None,
            coverity_version: None,
            passphrase: None,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_report() {
        let report = version_report("lodi", Some("8.0.0"));
        assert!(report.code_name);
        assert!(report.known);
        assert_eq!(report.effective, CoverityVersion::new(8, 6, 0, 0));
        assert_eq!(report.compatible, Some(true));

        let report = version_report("mystery", Some("7.7.0"));
        assert!(!report.known);
        assert_eq!(report.compatible, Some(false));
    }

    #[test]
    fn test_overrides_apply_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("covci.toml");
        std::fs::write(
            &path,
            r#"
            intermediate_dir = "from-file"
            version = "8.7.0"

            [server]
            host = "connect.local"
            stream = "main"
            user = "ci"
            "#,
        )
        .unwrap();

        let mut args = pipeline_args(Some(path));
        args.dir = Some("from-cli".to_string());
        args.coverity_version = Some("2017.07".to_string());
        args.passphrase = Some("pw".to_string());

        let config = load_config(&args).unwrap();
        assert_eq!(config.intermediate_dir, "from-cli");
        assert_eq!(config.version.as_deref(), Some("2017.07"));
        assert_eq!(config.server.unwrap().password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_build_context_requires_version_source() {
        let config = load_config(&pipeline_args(None)).unwrap();
        assert!(build_context(&config).is_err());

        let mut args = pipeline_args(None);
        args.coverity_version = Some("8.7.1".to_string());
        let ctx = build_context(&load_config(&args).unwrap()).unwrap();
        assert_eq!(ctx.version, CoverityVersion::new(8, 7, 1, 0));
        assert_eq!(ctx.intermediate_dir, "idir");
    }

    #[test]
    fn test_plan_json_omits_passphrase() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("covci.toml");
        std::fs::write(
            &path,
            r#"
            version = "2017.07"

            [server]
            host = "connect.local"
            stream = "main"
            user = "ci"
            password = "hunter2"

            [test_advisor]
            custom_test_command = "make check"
            cov_history_checkbox = true
            "#,
        )
        .unwrap();

        let config = load_config(&pipeline_args(Some(path))).unwrap();
        let ctx = build_context(&config).unwrap();
        let plan = CoverityPipeline::plan(&ctx, &config.options, &EnvVars::new()).unwrap();

        let history = &plan[0];
        assert_eq!(history.tool, "cov-manage-history");
        assert!(history.secret_env.contains_key("COVERITY_PASSPHRASE"));

        let json = plan_json(&plan).unwrap();
        assert!(json.contains("cov-manage-history"));
        assert!(!json.contains("hunter2"));
    }
}
