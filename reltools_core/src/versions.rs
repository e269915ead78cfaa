//! Release version arithmetic and `libraryversions.toml` constant naming.

use regex::Regex;
use reltools_common::{RelToolsError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)(?:-(alpha|beta|rc)([0-9]+))?$").unwrap()
});

/// Groups versioned outside the regular release train
const PINNED_GROUPS: &[&str] = &["androidx.car", "androidx.compose.compiler"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Alpha,
    Beta,
    Rc,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Alpha => "alpha",
            Stage::Beta => "beta",
            Stage::Rc => "rc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreRelease {
    pub stage: Stage,
    pub number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre: Option<PreRelease>,
}

impl Version {
    pub fn stable(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    pub fn is_stable(&self) -> bool {
        self.pre.is_none()
    }

    // A stable release sorts after every pre-release of the same version
    fn sort_key(&self) -> (u32, u32, u32, u8, u32) {
        match self.pre {
            Some(pre) => (self.major, self.minor, self.patch, pre.stage as u8, pre.number),
            None => (self.major, self.minor, self.patch, u8::MAX, 0),
        }
    }

    fn first_alpha_of_next_minor(&self) -> Result<Self> {
        Ok(Self {
            major: self.major,
            minor: bump(self.minor, self)?,
            patch: 0,
            pre: Some(PreRelease {
                stage: Stage::Alpha,
                number: 1,
            }),
        })
    }

    fn next_pre_release(&self, pre: PreRelease) -> Result<Self> {
        Ok(Self {
            pre: Some(PreRelease {
                number: bump(pre.number, self)?,
                ..pre
            }),
            ..*self
        })
    }

    /// Next version on the release train.
    ///
    /// Alphas and betas bump their number; release candidates and stable
    /// versions move on to the first alpha of the next minor version.
    pub fn increment(&self) -> Result<Self> {
        match self.pre {
            Some(pre) if pre.stage != Stage::Rc => self.next_pre_release(pre),
            _ => self.first_alpha_of_next_minor(),
        }
    }

    /// Next version without leaving the current minor version
    pub fn increment_within_minor(&self) -> Result<Self> {
        match self.pre {
            Some(pre) => self.next_pre_release(pre),
            None => Ok(Self {
                patch: bump(self.patch, self)?,
                ..*self
            }),
        }
    }
}

fn bump(component: u32, version: &Version) -> Result<u32> {
    component
        .checked_add(1)
        .ok_or_else(|| RelToolsError::Version(format!("cannot increment {version}: component overflows")))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = RelToolsError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = VERSION
            .captures(s.trim())
            .ok_or_else(|| RelToolsError::Version(format!("invalid version: {s}")))?;

        let number = |i: usize| -> Result<u32> {
            caps[i]
                .parse()
                .map_err(|_| RelToolsError::Version(format!("version component out of range: {s}")))
        };

        let pre = match caps.get(4) {
            Some(stage) => Some(PreRelease {
                stage: match stage.as_str() {
                    "alpha" => Stage::Alpha,
                    "beta" => Stage::Beta,
                    _ => Stage::Rc,
                },
                number: number(5)?,
            }),
            None => None,
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = self.pre {
            write!(f, "-{}{:02}", pre.stage.name(), pre.number)?;
        }
        Ok(())
    }
}

pub fn increment(version: &str) -> Result<String> {
    Ok(version.parse::<Version>()?.increment()?.to_string())
}

pub fn increment_within_minor(version: &str) -> Result<String> {
    Ok(version.parse::<Version>()?.increment_within_minor()?.to_string())
}

/// The greater of two versions, as written
pub fn higher<'v>(a: &'v str, b: &'v str) -> Result<&'v str> {
    let (va, vb) = (a.parse::<Version>()?, b.parse::<Version>()?);
    Ok(if vb > va { b } else { a })
}

pub fn should_update_group_version(old: &str, new: &str, group_id: &str) -> Result<bool> {
    if PINNED_GROUPS.contains(&group_id) {
        return Ok(false);
    }
    Ok(new.parse::<Version>()? > old.parse::<Version>()?)
}

pub fn should_update_artifact_version(old: &str, new: &str, _artifact_id: &str) -> Result<bool> {
    Ok(new.parse::<Version>()? > old.parse::<Version>()?)
}

/// Names of the group and artifact version constants in `libraryversions.toml`
pub fn library_constants(group_id: &str, artifact_id: &str) -> (String, String) {
    if group_id == "androidx.compose.runtime" && artifact_id == "runtime-tracing" {
        let name = "COMPOSE_RUNTIME_TRACING".to_string();
        return (name.clone(), name);
    }

    let mut group = group_id
        .strip_prefix("androidx.")
        .unwrap_or(group_id)
        .replace(['.', '-'], "_")
        .to_uppercase();
    // compose groups share one version, except material3
    if group.starts_with("COMPOSE") && group != "COMPOSE_MATERIAL3" {
        group = "COMPOSE".to_string();
    }

    (group, artifact_id.replace('-', "_").to_uppercase())
}

/// The only element of `items`
pub fn single<T: fmt::Debug>(mut items: Vec<T>) -> Result<T> {
    match items.len() {
        1 => Ok(items.remove(0)),
        _ => Err(RelToolsError::Version(format!(
            "Expected a list of size 1. Found: {:?}",
            items
        ))),
    }
}
