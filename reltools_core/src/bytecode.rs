use crate::process::ProcessRunner;
use jwalk::WalkDir;
use reltools_common::{RelToolsError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

const CLASSES_JAR: &str = "classes.jar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytecodeOutcome {
    /// Number of jar pairs handed to the tool
    Compared(usize),
    /// The tool could not be started; nothing more will be attempted this run
    Unavailable,
}

/// Runs `diffuse diff --jar` over every `classes.jar` in the old tree.
///
/// `classes.jar` is excluded from the unzip passes, so this is the only place
/// its contents get compared.
pub struct BytecodeComparator<'a> {
    runner: &'a dyn ProcessRunner,
    tool: String,
    available: AtomicBool,
}

impl<'a> BytecodeComparator<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, tool: impl Into<String>) -> Self {
        Self {
            runner,
            tool: tool.into(),
            available: AtomicBool::new(true),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// All `classes.jar` files under `root`, sorted
    pub fn find_class_jars(root: &Path) -> Result<Vec<PathBuf>> {
        let mut jars = Vec::new();
        for entry in WalkDir::new(root).skip_hidden(false) {
            let entry = entry.map_err(|e| {
                RelToolsError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Walk error: {}", e),
                ))
            })?;
            if entry.file_type().is_file() && entry.file_name() == CLASSES_JAR {
                jars.push(entry.path());
            }
        }
        jars.sort();
        Ok(jars)
    }

    /// Counterpart of `old_jar` in the new tree
    pub fn counterpart(old_jar: &Path, old_root: &Path, new_root: &Path) -> Option<PathBuf> {
        old_jar
            .strip_prefix(old_root)
            .ok()
            .map(|relative| new_root.join(relative))
    }

    pub fn compare_trees(&self, old_root: &Path, new_root: &Path) -> Result<BytecodeOutcome> {
        if !self.is_available() {
            return Ok(BytecodeOutcome::Unavailable);
        }

        let mut compared = 0;
        for old_jar in Self::find_class_jars(old_root)? {
            let Some(new_jar) = Self::counterpart(&old_jar, old_root, new_root) else {
                continue;
            };
            if !new_jar.is_file() {
                debug!("No counterpart for {}", old_jar.display());
                continue;
            }

            let args = vec![
                "diff".to_string(),
                "--jar".to_string(),
                old_jar.to_string_lossy().into_owned(),
                new_jar.to_string_lossy().into_owned(),
            ];
            match self.runner.output_lines(&self.tool, &args) {
                Ok(lines) => {
                    for line in lines {
                        info!("{}", line);
                    }
                    compared += 1;
                }
                Err(RelToolsError::ToolNotFound(tool)) => {
                    warn!("{} not found, skipping bytecode comparison", tool);
                    self.available.store(false, Ordering::Relaxed);
                    return Ok(BytecodeOutcome::Unavailable);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(BytecodeOutcome::Compared(compared))
    }
}
