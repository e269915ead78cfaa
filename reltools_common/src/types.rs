use crate::RelToolsError;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A named bundle of baseline rules that are enabled together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaselineProfile {
    /// Migration of libraries to the AGP KMP plugin
    AgpKmp,
}

impl BaselineProfile {
    pub const ALL: [BaselineProfile; 1] = [BaselineProfile::AgpKmp];

    pub fn name(&self) -> &'static str {
        match self {
            BaselineProfile::AgpKmp => "agpKmp",
        }
    }

    /// Parse every token, reporting all unrecognised ones at once.
    pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Self>, RelToolsError> {
        let mut profiles = Vec::new();
        let mut invalid = Vec::new();

        for token in tokens {
            match token.as_ref().parse::<BaselineProfile>() {
                Ok(profile) => {
                    if !profiles.contains(&profile) {
                        profiles.push(profile);
                    }
                }
                Err(_) => invalid.push(token.as_ref().to_string()),
            }
        }

        if !invalid.is_empty() {
            return Err(RelToolsError::Config(format!(
                "unrecognized baseline profile(s): {}",
                invalid.join(", ")
            )));
        }

        Ok(profiles)
    }

    /// Comma separated list of accepted names, for usage messages
    pub fn recognized_names() -> String {
        Self::ALL
            .iter()
            .map(|profile| profile.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for BaselineProfile {
    type Err = RelToolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agpKmp" => Ok(BaselineProfile::AgpKmp),
            other => Err(RelToolsError::Config(format!(
                "unknown baseline profile: {other}"
            ))),
        }
    }
}

impl fmt::Display for BaselineProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How archives are expanded during the unzip passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Shell out to the external `unzip` tool
    #[default]
    Unzip,
    /// Extract in-process with the zip crate
    Builtin,
}

impl FromStr for ExtractorKind {
    type Err = RelToolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unzip" => Ok(ExtractorKind::Unzip),
            "builtin" => Ok(ExtractorKind::Builtin),
            other => Err(RelToolsError::Config(format!(
                "unknown extractor: {other} (expected unzip or builtin)"
            ))),
        }
    }
}

fn default_old_root() -> PathBuf {
    PathBuf::from("../../out-old/dist/")
}

fn default_new_root() -> PathBuf {
    PathBuf::from("../../out-new/dist/")
}

fn default_diff_program() -> String {
    "diff".to_string()
}

fn default_unzip_program() -> String {
    "unzip".to_string()
}

fn default_unzip_workers() -> usize {
    10
}

fn default_diffuse_path() -> PathBuf {
    PathBuf::from("../../prebuilts/build-tools/diffuse/diffuse-0.3.0/bin/diffuser")
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root of the distribution built before the change
    #[serde(default = "default_old_root")]
    pub old_root: PathBuf,

    /// Root of the distribution built after the change
    #[serde(default = "default_new_root")]
    pub new_root: PathBuf,

    #[serde(default = "default_diff_program")]
    pub diff_program: String,

    #[serde(default = "default_unzip_program")]
    pub unzip_program: String,

    /// Concurrent extractions per unzip pass
    #[serde(default = "default_unzip_workers")]
    pub unzip_workers: usize,

    #[serde(default)]
    pub extractor: ExtractorKind,

    /// Location of the diffuse launcher used for classes.jar comparison
    #[serde(default = "default_diffuse_path")]
    pub diffuse_path: PathBuf,

    /// Compare classes.jar files with diffuse after unzipping
    #[serde(default)]
    pub bytecode_diff: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            old_root: default_old_root(),
            new_root: default_new_root(),
            diff_program: default_diff_program(),
            unzip_program: default_unzip_program(),
            unzip_workers: default_unzip_workers(),
            extractor: ExtractorKind::default(),
            diffuse_path: default_diffuse_path(),
            bytecode_diff: false,
        }
    }
}
