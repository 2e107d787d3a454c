//! Deterministic fingerprints of planned invocations.

use crate::command::CommandInvocation;
use sha2::{Digest, Sha256};

/// SHA-256 over the ordered argument vectors, environments and working dirs.
///
/// Secret variables contribute their names only.
///
/// Identical plans always hash identically; reordering arguments or commands
/// changes the digest.
pub fn invocation_digest(invocations: &[CommandInvocation]) -> String {
    let mut hasher = Sha256::new();
    for invocation in invocations {
        for arg in &invocation.args {
            hasher.update(arg.as_bytes());
            hasher.update(b"\0");
        }
        hasher.update(b"\x1e");
        for (key, value) in &invocation.env {
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
        for key in invocation.secret_env.keys() {
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
        }
        hasher.update(b"\x1e");
        if let Some(dir) = &invocation.working_dir {
            hasher.update(dir.to_string_lossy().as_bytes());
        }
        hasher.update(b"\x1d");
    }
    hex::encode(hasher.finalize())
}
