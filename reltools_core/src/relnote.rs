use regex::Regex;
use std::sync::LazyLock;

static RELNOTE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*relnote:[ \t]*\S").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelnoteStatus {
    /// No changed file is under a checked path
    NotRequired,
    Present,
    Missing,
}

/// Commit hook check: changes under the given paths must carry a `Relnote:` line
#[derive(Debug, Clone)]
pub struct RelnoteCheck {
    path_prefixes: Vec<String>,
}

impl RelnoteCheck {
    pub fn new<S: Into<String>>(path_prefixes: impl IntoIterator<Item = S>) -> Self {
        Self {
            path_prefixes: path_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn applies_to<S: AsRef<str>>(&self, changed_files: &[S]) -> bool {
        changed_files.iter().any(|file| {
            self.path_prefixes
                .iter()
                .any(|prefix| file.as_ref().starts_with(prefix.as_str()))
        })
    }

    pub fn has_relnote(message: &str) -> bool {
        RELNOTE_TAG.is_match(message)
    }

    pub fn check<S: AsRef<str>>(&self, message: &str, changed_files: &[S]) -> RelnoteStatus {
        if !self.applies_to(changed_files) {
            RelnoteStatus::NotRequired
        } else if Self::has_relnote(message) {
            RelnoteStatus::Present
        } else {
            RelnoteStatus::Missing
        }
    }
}
