use crate::archive_queue::ArchiveQueue;
use crate::tree_diff::{excludes, DiffFilter, TreeDiffer};
use crate::unzip_pool::UnzipWorkerPool;
use reltools_common::Result;
use tracing::info;

/// noto-emoji-compat bundles an externally built jar with timestamps, and
/// classes.jar is left to the bytecode comparator.
pub const BANNED_JARS: &[&str] = &["noto-emoji-compat-java.jar", "classes.jar"];

/// Not archives, but the extension globs used by the passes do not exclude them
pub const NOT_ARCHIVES: &[&str] = &[
    r"**\.java",
    r"**\.json",
    r"**\.kt",
    r"**\.knm",
    r"**\.xml",
    r"**\.sha1",
    r"**\.sha256",
    r"**\.sha512",
    r"**\.md5",
    r"**\.module",
    r"**\.pom",
    r"**\.html",
];

/// Files without an extension that would otherwise slip through every pass
pub const NO_EXTENSION: &[&str] = &["manifest", "module"];

/// Globs excluded from every unzip pass
pub fn do_not_unzip() -> Vec<DiffFilter> {
    excludes(
        BANNED_JARS
            .iter()
            .chain(NOT_ARCHIVES)
            .chain(NO_EXTENSION)
            .copied(),
    )
}

/// One round of diff-then-unzip targeting a single layer of nested archives.
///
/// `diff` only supports excluding names, so each pass lists what it is *not*
/// looking for.
#[derive(Debug, Clone)]
pub struct UnzipPass {
    pub label: &'static str,
    pub excludes: Vec<&'static str>,
}

/// Zips first (they may hold anything), then aar/apk, then the jars and klibs
/// those can contain.
pub fn standard_passes() -> Vec<UnzipPass> {
    vec![
        UnzipPass {
            label: "zip",
            excludes: vec![r"**\.[^z][a-z]*"],
        },
        UnzipPass {
            label: "aar/apk",
            excludes: vec![r"**\.zip", r"**\.jar", r"**\.klib"],
        },
        UnzipPass {
            label: "jar/klib",
            excludes: vec![r"**\.zip", r"**\.aar", r"**\.apk"],
        },
    ]
}

/// Pull both paths out of `Files OLD and NEW differ` lines.
///
/// Added or removed files are skipped, their diff is obvious without unzipping.
pub fn changed_file_pairs(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.starts_with("Files"))
        .flat_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            [tokens.get(1), tokens.get(3)]
                .into_iter()
                .flatten()
                .map(|token| token.to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

pub struct RecursiveUnzipper<'a> {
    differ: &'a TreeDiffer<'a>,
    pool: &'a UnzipWorkerPool<'a>,
}

impl<'a> RecursiveUnzipper<'a> {
    pub fn new(differ: &'a TreeDiffer<'a>, pool: &'a UnzipWorkerPool<'a>) -> Self {
        Self { differ, pool }
    }

    /// Run every pass in order; returns how many archives each pass queued.
    pub fn run(&self, passes: &[UnzipPass]) -> Result<Vec<usize>> {
        passes.iter().map(|pass| self.run_pass(pass)).collect()
    }

    pub fn run_pass(&self, pass: &UnzipPass) -> Result<usize> {
        info!("Unzipping {} files", pass.label);

        let mut filters = excludes(pass.excludes.iter().copied());
        filters.extend(do_not_unzip());

        let changed = changed_file_pairs(&self.differ.diff_brief(&filters)?);
        let queue: ArchiveQueue = changed.into_iter().collect();
        let queued = queue.len();

        self.pool.drain(&queue)?;
        info!("Unzipped {} {} archives", queued, pass.label);
        Ok(queued)
    }
}
