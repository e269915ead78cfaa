use crate::process::ProcessRunner;
use reltools_common::{RelToolsError, Result};
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

/// Expands one archive into a destination directory, overwriting existing files
pub trait Extractor: Send + Sync {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Shells out to `unzip -qq -o ARCHIVE -d DEST`.
///
/// The exit status is deliberately not turned into an error: a failed
/// extraction just leaves the destination missing or partial.
pub struct UnzipCommand {
    runner: Arc<dyn ProcessRunner>,
    program: String,
}

impl UnzipCommand {
    pub fn new(runner: Arc<dyn ProcessRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    pub fn args(archive: &Path, dest: &Path) -> Vec<String> {
        vec![
            "-qq".to_string(),
            "-o".to_string(),
            archive.to_string_lossy().into_owned(),
            "-d".to_string(),
            dest.to_string_lossy().into_owned(),
        ]
    }
}

impl Extractor for UnzipCommand {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let succeeded = self.runner.status(&self.program, &Self::args(archive, dest))?;
        if !succeeded {
            tracing::debug!("{} exited unsuccessfully for {}", self.program, archive.display());
        }
        Ok(())
    }
}

/// In-process extraction with the zip crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ZipExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(file).map_err(|e| {
            RelToolsError::Process(format!("{} is not a zip archive: {}", archive.display(), e))
        })?;

        fs::create_dir_all(dest)?;
        zip.extract(dest).map_err(|e| {
            RelToolsError::Process(format!("failed to extract {}: {}", archive.display(), e))
        })
    }
}
