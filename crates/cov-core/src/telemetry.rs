//! Tracing initialisation for the Coverity CI binaries.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! because the global subscriber can only be installed once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events are shown at the requested level by default.
const OWN_TARGETS: &[&str] = &["cov_core", "cov_ci", "covci"];

/// Default filter directive when `RUST_LOG` is not set: our crates at
/// `level`, everything else at `warn`.
pub fn default_directive(level: Level) -> String {
    let mut directive = String::from("warn");
    for target in OWN_TARGETS {
        directive.push(',');
        directive.push_str(target);
        directive.push('=');
        directive.push_str(level.as_str());
    }
    directive
}

/// Install the global subscriber.
///
/// * `json` emits newline-delimited JSON records for log shippers.
/// * `level` applies to this workspace's crates unless `RUST_LOG` is set.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
