use crate::process::ProcessRunner;
use reltools_common::Result;
use std::path::{Path, PathBuf};

/// A single filter understood by `diff -r`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffFilter {
    /// `-x PAT`: skip files and directories whose base name matches the glob
    Exclude(String),
    /// `-I RE`: ignore hunks whose lines all match the regular expression
    IgnoreMatching(String),
}

impl DiffFilter {
    pub fn exclude(pattern: impl Into<String>) -> Self {
        DiffFilter::Exclude(pattern.into())
    }

    pub fn ignore_matching(pattern: impl Into<String>) -> Self {
        DiffFilter::IgnoreMatching(pattern.into())
    }

    fn push_args(&self, args: &mut Vec<String>) {
        match self {
            DiffFilter::Exclude(pattern) => {
                args.push("-x".to_string());
                args.push(pattern.clone());
            }
            DiffFilter::IgnoreMatching(pattern) => {
                args.push("-I".to_string());
                args.push(pattern.clone());
            }
        }
    }
}

/// Build exclusion filters from a list of globs
pub fn excludes<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Vec<DiffFilter> {
    patterns.into_iter().map(DiffFilter::exclude).collect()
}

/// Recursive diff of the old and new distribution trees
pub struct TreeDiffer<'a> {
    runner: &'a dyn ProcessRunner,
    program: String,
    old_root: PathBuf,
    new_root: PathBuf,
}

impl<'a> TreeDiffer<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        program: impl Into<String>,
        old_root: impl Into<PathBuf>,
        new_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            old_root: old_root.into(),
            new_root: new_root.into(),
        }
    }

    pub fn old_root(&self) -> &Path {
        &self.old_root
    }

    pub fn new_root(&self) -> &Path {
        &self.new_root
    }

    /// Arguments for `diff -r old new [-q] filters...`
    pub fn args(&self, brief: bool, filters: &[DiffFilter]) -> Vec<String> {
        let mut args = vec![
            "-r".to_string(),
            self.old_root.to_string_lossy().into_owned(),
            self.new_root.to_string_lossy().into_owned(),
        ];
        if brief {
            args.push("-q".to_string());
        }
        for filter in filters {
            filter.push_args(&mut args);
        }
        args
    }

    /// Full recursive diff, one output line per element
    pub fn diff(&self, filters: &[DiffFilter]) -> Result<Vec<String>> {
        self.runner.output_lines(&self.program, &self.args(false, filters))
    }

    /// `diff -q`: only report which files differ
    pub fn diff_brief(&self, filters: &[DiffFilter]) -> Result<Vec<String>> {
        self.runner.output_lines(&self.program, &self.args(true, filters))
    }
}
