//! End-to-end refactor validation: unzip, compare, and report what changed
//! between two distribution trees once baselined noise is removed.

use crate::baseline::{BaselineFilter, BaselineRuleSet};
use crate::bytecode::{BytecodeComparator, BytecodeOutcome};
use crate::extract::{Extractor, UnzipCommand, ZipExtractor};
use crate::process::ProcessRunner;
use crate::report::ReportAssembler;
use crate::tree_diff::{excludes, DiffFilter, TreeDiffer};
use crate::unzip_pool::UnzipWorkerPool;
use crate::unzipper::{standard_passes, RecursiveUnzipper};
use reltools_common::{AppConfig, BaselineProfile, ExtractorKind, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Checksums, sizes and names change with every build
const HASH_EXCLUDES: &[&str] = &["*.md5*", "*.sha**"];
const HASH_IGNORES: &[&str] = &[
    r#"        "md5".*"#,
    r#"        "sha.*"#,
    r#"        "size".*"#,
    r#"      "name".*"#,
];

/// Timestamps, docs inputs and other files whose changes show up elsewhere
const EXCLUDED_FILES: &[&str] = &[
    "*maven-metadata.xml**",
    r"**\.knm",
    "dackkaArgs-docs-tip-of-tree.json",
    "**kotlin-project-structure-metadata.json",
];

/// Their contents were unzipped and are compared there
const UNZIPPED_ARCHIVES: &[&str] = &["*.zip", "*.jar", "*.aar", "*.apk", "*.klib"];

/// Filters for the final full diff of the unzipped trees
pub fn final_diff_filters(rules: &BaselineRuleSet) -> Vec<DiffFilter> {
    let mut filters = excludes(HASH_EXCLUDES.iter().copied());
    filters.extend(HASH_IGNORES.iter().map(|re| DiffFilter::ignore_matching(*re)));
    filters.extend(excludes(EXCLUDED_FILES.iter().copied()));
    filters.extend(rules.extra_excludes());
    filters.extend(excludes(UNZIPPED_ARCHIVES.iter().copied()));
    filters.extend(rules.ignore_filters());
    filters
}

pub struct RefactorValidator {
    config: AppConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl RefactorValidator {
    pub fn new(config: AppConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn extractor(&self) -> Box<dyn Extractor> {
        match self.config.extractor {
            ExtractorKind::Unzip => Box::new(UnzipCommand::new(
                self.runner.clone(),
                self.config.unzip_program.clone(),
            )),
            ExtractorKind::Builtin => Box::new(ZipExtractor::new()),
        }
    }

    /// Unzip both trees, diff them and return the report with every
    /// baselined change for `profiles` removed.
    pub fn run(&self, profiles: &[BaselineProfile]) -> Result<String> {
        let rules = BaselineRuleSet::for_profiles(profiles);
        let differ = TreeDiffer::new(
            self.runner.as_ref(),
            self.config.diff_program.clone(),
            self.config.old_root.clone(),
            self.config.new_root.clone(),
        );

        let extractor = self.extractor();
        let pool = UnzipWorkerPool::with_workers(extractor.as_ref(), self.config.unzip_workers);
        let counts = RecursiveUnzipper::new(&differ, &pool).run(&standard_passes())?;
        info!("Unzipped {} archives", counts.iter().sum::<usize>());

        if self.config.bytecode_diff {
            let comparator = BytecodeComparator::new(
                self.runner.as_ref(),
                self.config.diffuse_path.to_string_lossy(),
            );
            match comparator.compare_trees(differ.old_root(), differ.new_root())? {
                BytecodeOutcome::Compared(n) => info!("Compared bytecode of {} jars", n),
                BytecodeOutcome::Unavailable => warn!("Bytecode comparison unavailable"),
            }
        }

        info!("Diffing unzipped trees");
        let raw = differ.diff(&final_diff_filters(&rules))?.join("\n");

        let filter = BaselineFilter::new(rules);
        Ok(ReportAssembler::new(&filter).assemble(&raw))
    }
}
