//! Coverity toolchain versions.
//!
//! The installed toolchain reports either a dotted version (`8.7.1`,
//! `2017.07`, `7.7.0.15`) or, for a few historical releases, a code name.
//! [`CoverityVersion`] models both shapes and answers the one question the
//! command builders care about: is the installed toolchain at least as new
//! as the release that introduced a given flag.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A numeric `major.minor.patch.hotfix` quadruple.
///
/// Field order is the comparison priority, so the derived ordering is the
/// lexicographic order used everywhere else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub hotfix: u32,
}

impl VersionNumber {
    /// Coverity 7.7.0 (Indio).
    pub const INDIO: VersionNumber = VersionNumber::new(7, 7, 0, 0);

    /// Coverity 8.0.0 (Jasper).
    pub const JASPER: VersionNumber = VersionNumber::new(8, 0, 0, 0);

    /// Coverity 2017.07, the first calendar-versioned release.
    pub const V2017_07: VersionNumber = VersionNumber::new(2017, 7, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32, hotfix: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            hotfix,
        }
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hotfix == 0 {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        } else {
            write!(
                f,
                "{}.{}.{}.{}",
                self.major, self.minor, self.patch, self.hotfix
            )
        }
    }
}

/// Releases that shipped under a code name, with the numeric release each
/// one is equivalent to.
const CODE_NAMES: &[(&str, VersionNumber)] = &[("lodi", VersionNumber::new(8, 6, 0, 0))];

fn lookup_code_name(name: &str) -> Option<VersionNumber> {
    CODE_NAMES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, number)| *number)
}

/// Version of an installed Coverity toolchain.
///
/// Equality, hashing and ordering look only at the raw quadruple returned by
/// [`CoverityVersion::raw`]; a code name's raw quadruple is all zeros. Use
/// [`CoverityVersion::compare_to_analysis`] for capability checks, which
/// resolves code names first.
#[derive(Debug, Clone)]
pub enum CoverityVersion {
    Numeric(VersionNumber),
    /// Lower-cased release code name.
    CodeName(String),
}

impl CoverityVersion {
    pub const INDIO: CoverityVersion = CoverityVersion::Numeric(VersionNumber::INDIO);
    pub const JASPER: CoverityVersion = CoverityVersion::Numeric(VersionNumber::JASPER);
    pub const V2017_07: CoverityVersion = CoverityVersion::Numeric(VersionNumber::V2017_07);

    pub const fn new(major: u32, minor: u32, patch: u32, hotfix: u32) -> Self {
        CoverityVersion::Numeric(VersionNumber::new(major, minor, patch, hotfix))
    }

    /// Parse a toolchain version string. Never fails.
    ///
    /// Two to four dot-separated groups of ASCII digits parse as a numeric
    /// version with missing groups set to zero. Every other input (a single
    /// group, five or more groups, empty groups, signs, values that overflow
    /// `u32`, letters) becomes a code name.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match parse_number(text) {
            Some(number) => CoverityVersion::Numeric(number),
            None => CoverityVersion::CodeName(text.to_ascii_lowercase()),
        }
    }

    /// The stored quadruple; all zeros for a code name.
    pub fn raw(&self) -> VersionNumber {
        match self {
            CoverityVersion::Numeric(number) => *number,
            CoverityVersion::CodeName(_) => VersionNumber::default(),
        }
    }

    pub fn is_code_name(&self) -> bool {
        matches!(self, CoverityVersion::CodeName(_))
    }

    pub fn code_name(&self) -> Option<&str> {
        match self {
            CoverityVersion::CodeName(name) => Some(name),
            CoverityVersion::Numeric(_) => None,
        }
    }

    /// False only for a code name missing from the code name table.
    pub fn is_known(&self) -> bool {
        match self {
            CoverityVersion::Numeric(_) => true,
            CoverityVersion::CodeName(name) => lookup_code_name(name).is_some(),
        }
    }

    /// Resolve a known code name to its numeric release.
    ///
    /// Numeric versions and unknown code names are returned unchanged.
    pub fn effective_version(&self) -> CoverityVersion {
        match self {
            CoverityVersion::CodeName(name) => match lookup_code_name(name) {
                Some(number) => CoverityVersion::Numeric(number),
                None => self.clone(),
            },
            CoverityVersion::Numeric(_) => self.clone(),
        }
    }

    /// Whether this toolchain is at least as capable as `other`.
    ///
    /// Both sides are resolved through [`effective_version`](Self::effective_version)
    /// before comparing. Two identical code names are always compatible. Any
    /// other comparison involving an unknown code name is false, including two
    /// different unknown names.
    pub fn compare_to_analysis(&self, other: &CoverityVersion) -> bool {
        if let (CoverityVersion::CodeName(ours), CoverityVersion::CodeName(theirs)) = (self, other)
        {
            if ours == theirs {
                return true;
            }
        }

        if !self.is_known() || !other.is_known() {
            return false;
        }

        self.effective_version().raw() >= other.effective_version().raw()
    }

    /// Shorthand for gating on a numeric minimum release.
    pub fn supports(&self, minimum: VersionNumber) -> bool {
        self.compare_to_analysis(&CoverityVersion::Numeric(minimum))
    }
}

fn parse_number(text: &str) -> Option<VersionNumber> {
    let groups: Vec<&str> = text.split('.').collect();
    if !(2..=4).contains(&groups.len()) {
        return None;
    }

    let mut parts = [0u32; 4];
    for (slot, group) in parts.iter_mut().zip(&groups) {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = group.parse().ok()?;
    }

    Some(VersionNumber::new(parts[0], parts[1], parts[2], parts[3]))
}

impl PartialEq for CoverityVersion {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for CoverityVersion {}

impl Hash for CoverityVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw().hash(state);
    }
}

impl PartialOrd for CoverityVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CoverityVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw().cmp(&other.raw())
    }
}

impl fmt::Display for CoverityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverityVersion::Numeric(number) => fmt::Display::fmt(number, f),
            CoverityVersion::CodeName(name) => f.write_str(name),
        }
    }
}

impl FromStr for CoverityVersion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CoverityVersion::parse(s))
    }
}

impl From<VersionNumber> for CoverityVersion {
    fn from(number: VersionNumber) -> Self {
        CoverityVersion::Numeric(number)
    }
}

impl Serialize for CoverityVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CoverityVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(CoverityVersion::parse(&text))
    }
}
