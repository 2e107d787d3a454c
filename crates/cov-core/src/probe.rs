//! Locating the installed toolchain version.
//!
//! A Coverity installation ships a `VERSION` file of `key=value` lines at its
//! root; the `externalVersion` key holds the release string.

use crate::error::CoreError;
use crate::version::CoverityVersion;
use crate::Result;
use std::path::Path;
use tracing::debug;

pub const VERSION_FILE: &str = "VERSION";
const EXTERNAL_VERSION_KEY: &str = "externalVersion";

/// Read the installed version from `<home>/VERSION`.
pub fn read_install_version(home: &Path) -> Result<CoverityVersion> {
    let path = home.join(VERSION_FILE);
    let content = std::fs::read_to_string(&path).map_err(|source| CoreError::Read {
        path: path.clone(),
        source,
    })?;

    let value = content
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == EXTERNAL_VERSION_KEY)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CoreError::VersionNotFound(path.clone()))?;

    let version = CoverityVersion::parse(value);
    debug!(path = %path.display(), version = %version, "Read installed Coverity version");
    Ok(version)
}

/// Resolve the toolchain version, preferring an explicit override.
pub fn resolve_version(
    version_override: Option<&str>,
    home: Option<&Path>,
) -> Result<CoverityVersion> {
    match (version_override.filter(|v| !v.trim().is_empty()), home) {
        (Some(text), _) => Ok(CoverityVersion::parse(text)),
        (None, Some(home)) => read_install_version(home),
        (None, None) => Err(CoreError::NoInstallation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionNumber;
    use tempfile::tempdir;

    #[test]
    fn test_read_install_version() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(VERSION_FILE),
            "internalVersion=b0f1c2\nexternalVersion=2017.07\nbuildDate=2017-07-01\n",
        )
        .unwrap();

        let version = read_install_version(dir.path()).unwrap();
        assert_eq!(version.raw(), VersionNumber::new(2017, 7, 0, 0));
    }

    #[test]
    fn test_read_code_name_version() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "externalVersion = lodi\n").unwrap();

        let version = read_install_version(dir.path()).unwrap();
        assert_eq!(version.code_name(), Some("lodi"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "internalVersion=abc\n").unwrap();

        let err = read_install_version(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::VersionNotFound(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = read_install_version(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Read { .. }));
    }

    #[test]
    fn test_override_wins() {
        let dir = tempdir().unwrap();
        let version = resolve_version(Some("8.7.1"), Some(dir.path())).unwrap();
        assert_eq!(version, CoverityVersion::new(8, 7, 1, 0));

        let err = resolve_version(Some("  "), None).unwrap_err();
        assert!(matches!(err, CoreError::NoInstallation));
    }
}
