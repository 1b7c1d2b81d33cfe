//! Expected image profiles
//!
//! A profile pins down one known-good image: its size and its digests. Each
//! title revision that a patch exists for carries two of them, the base dump
//! the patch expects and the target image it produces. Profiles are loaded
//! from a YAML table so new titles need no code changes:
//!
//! ```yaml
//! titles:
//!   - title: example
//!     revision: "1.0"
//!     base:
//!       size: 67108864
//!       md5: 0123456789abcdef0123456789abcdef
//!       sha1: 0123456789abcdef0123456789abcdef01234567
//!       crc32: 89abcdef
//!     target:
//!       size: 67108864
//!       md5: fedcba9876543210fedcba9876543210
//!       sha1: fedcba9876543210fedcba9876543210fedcba98
//!       sha256: (optional, informational)
//!       crc32: 01234567
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::digest::{DigestKind, DigestSet};
use crate::io::read_file;
use crate::{Error, Result};

/// Size and digests of a known-good image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedProfile {
    /// Image size in bytes
    pub size: u64,
    /// MD5 digest (hex)
    pub md5: String,
    /// SHA-1 digest (hex)
    pub sha1: String,
    /// SHA-256 digest (hex), reported but never asserted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// CRC-32 (hex)
    pub crc32: String,
}

impl ExpectedProfile {
    /// Build a profile describing exactly `data`
    pub fn from_image(data: &[u8]) -> Self {
        Self::from_digests(data.len() as u64, &DigestSet::compute(data))
    }

    /// Build a profile from an image size and its digests
    pub fn from_digests(size: u64, digests: &DigestSet) -> Self {
        Self {
            size,
            md5: digests.md5.clone(),
            sha1: digests.sha1.clone(),
            sha256: Some(digests.sha256.clone()),
            crc32: digests.crc32.clone(),
        }
    }

    /// Expected value for a digest kind
    pub fn get(&self, kind: DigestKind) -> Option<&str> {
        match kind {
            DigestKind::Md5 => Some(&self.md5),
            DigestKind::Sha1 => Some(&self.sha1),
            DigestKind::Sha256 => self.sha256.as_deref(),
            DigestKind::Crc32 => Some(&self.crc32),
        }
    }

    /// Asserted digests that disagree with `actual`
    ///
    /// Hex case is ignored, so hand-built profiles need not be lowercase.
    pub fn mismatches(&self, actual: &DigestSet) -> Vec<DigestKind> {
        DigestKind::ASSERTED
            .into_iter()
            .filter(|&kind| {
                !self
                    .get(kind)
                    .is_some_and(|expected| expected.trim().eq_ignore_ascii_case(actual.get(kind)))
            })
            .collect()
    }

    /// Whether `actual` passes every asserted digest
    pub fn matches(&self, actual: &DigestSet) -> bool {
        self.mismatches(actual).is_empty()
    }

    /// Compare the informational SHA-256 and log anything unusual
    pub fn check_sha256(&self, label: &str, actual: &DigestSet) {
        let Some(expected) = self.sha256.as_deref() else {
            return;
        };

        if !is_hex_of_len(expected, DigestKind::Sha256.hex_len()) {
            log::warn!(
                "{label} profile SHA-256 is not a 64-character hex digest ({} chars); not compared",
                expected.len()
            );
        } else if !expected.eq_ignore_ascii_case(&actual.sha256) {
            log::warn!(
                "{label} SHA-256 differs from profile (expected {expected}, computed {}); SHA-256 is informational only",
                actual.sha256
            );
        }
    }

    /// Lowercase all digests and check their shape
    fn normalize(&mut self, label: &str) -> Result<()> {
        for (kind, value) in [
            (DigestKind::Md5, &mut self.md5),
            (DigestKind::Sha1, &mut self.sha1),
            (DigestKind::Crc32, &mut self.crc32),
        ] {
            *value = value.trim().to_ascii_lowercase();
            if !is_hex_of_len(value, kind.hex_len()) {
                return Err(Error::profile(format!(
                    "{label}: {} must be {} hex characters, got {value:?}",
                    kind.name(),
                    kind.hex_len()
                )));
            }
        }

        if let Some(sha256) = self.sha256.as_mut() {
            *sha256 = sha256.trim().to_ascii_lowercase();
        }

        Ok(())
    }
}

fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Which side of a patch a profile describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileRole {
    /// Unpatched input image
    Base,
    /// Patched output image
    Target,
}

impl fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileRole::Base => write!(f, "base"),
            ProfileRole::Target => write!(f, "target"),
        }
    }
}

/// Base and target profiles for one title revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleProfile {
    /// Title name used for lookup
    pub title: String,
    /// Revision label (e.g. "1.0")
    #[serde(default)]
    pub revision: String,
    /// Image the patch applies to
    pub base: ExpectedProfile,
    /// Image the patch produces
    pub target: ExpectedProfile,
}

impl TitleProfile {
    /// Profile for the given role
    pub fn profile(&self, role: ProfileRole) -> &ExpectedProfile {
        match role {
            ProfileRole::Base => &self.base,
            ProfileRole::Target => &self.target,
        }
    }
}

impl fmt::Display for TitleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.revision.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} (rev {})", self.title, self.revision)
        }
    }
}

/// Immutable table of title profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTable {
    titles: Vec<TitleProfile>,
}

impl ProfileTable {
    /// Build a table from already validated entries
    pub fn new(titles: Vec<TitleProfile>) -> Result<Self> {
        let mut table = Self { titles };
        table.validate()?;
        Ok(table)
    }

    /// Parse a table from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut table: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::profile(format!("invalid profile table: {e}")))?;
        table.validate()?;
        log::debug!("Loaded {} title profile(s)", table.titles.len());
        Ok(table)
    }

    /// Load a table from a YAML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = String::from_utf8(read_file(path)?)
            .map_err(|_| Error::profile(format!("{} is not valid UTF-8", path.display())))?;
        Self::from_yaml_str(&text)
    }

    /// Serialize the table as YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| Error::profile(format!("cannot serialize profile table: {e}")))
    }

    fn validate(&mut self) -> Result<()> {
        for entry in &mut self.titles {
            if entry.title.trim().is_empty() {
                return Err(Error::profile("title entry without a name"));
            }
            let label = entry.to_string();
            entry.base.normalize(&format!("{label} base"))?;
            entry.target.normalize(&format!("{label} target"))?;
        }
        Ok(())
    }

    /// Number of title entries
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Iterate over the entries
    pub fn iter(&self) -> impl Iterator<Item = &TitleProfile> {
        self.titles.iter()
    }

    /// Pick an entry by title and optional revision
    ///
    /// With no title given, a table holding a single entry selects it.
    pub fn select(&self, title: Option<&str>, revision: Option<&str>) -> Result<&TitleProfile> {
        let Some(title) = title else {
            return match self.titles.as_slice() {
                [only] => Ok(only),
                [] => Err(Error::profile("profile table is empty")),
                _ => Err(Error::profile(format!(
                    "profile table holds {} titles; choose one of: {}",
                    self.titles.len(),
                    self.titles
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))),
            };
        };

        let mut candidates = self
            .titles
            .iter()
            .filter(|t| t.title.eq_ignore_ascii_case(title))
            .filter(|t| revision.is_none_or(|rev| t.revision == rev));

        match (candidates.next(), candidates.next()) {
            (Some(entry), None) => Ok(entry),
            (Some(_), Some(_)) => Err(Error::profile(format!(
                "title {title:?} has several revisions; specify one"
            ))),
            (None, _) => Err(Error::profile(format!(
                "no profile for title {title:?}{}",
                revision.map(|r| format!(" revision {r:?}")).unwrap_or_default()
            ))),
        }
    }

    /// Find the profile an image matches, by size and asserted digests
    pub fn identify(&self, size: u64, digests: &DigestSet) -> Option<(&TitleProfile, ProfileRole)> {
        self.titles.iter().find_map(|entry| {
            [ProfileRole::Base, ProfileRole::Target]
                .into_iter()
                .find(|&role| {
                    let profile = entry.profile(role);
                    profile.size == size && profile.matches(digests)
                })
                .map(|role| (entry, role))
        })
    }
}
