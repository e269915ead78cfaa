use crate::archive_queue::ArchiveQueue;
use crate::extract::Extractor;
use reltools_common::{RelToolsError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_UNZIP_WORKERS: usize = 10;

/// Where an archive gets expanded: a sibling directory named `<archive>.unzipped/`
pub fn unzipped_dir(archive: &str) -> PathBuf {
    PathBuf::from(format!("{archive}.unzipped/"))
}

/// A small fixed pool of extraction workers.
///
/// Issuing every extraction at once makes them start failing, while running
/// them one by one is too slow, so a handful of workers drain a shared queue.
pub struct UnzipWorkerPool<'a> {
    extractor: &'a dyn Extractor,
    worker_count: usize,
}

impl<'a> UnzipWorkerPool<'a> {
    pub fn new(extractor: &'a dyn Extractor) -> Self {
        Self::with_workers(extractor, DEFAULT_UNZIP_WORKERS)
    }

    pub fn with_workers(extractor: &'a dyn Extractor, worker_count: usize) -> Self {
        Self {
            extractor,
            worker_count: worker_count.max(1),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Extract everything in `queue`, blocking until every worker has exited.
    ///
    /// Returns the number of workers that were started.
    pub fn drain(&self, queue: &ArchiveQueue) -> Result<usize> {
        let workers = self.worker_count.min(queue.len());
        if workers == 0 {
            return Ok(0);
        }

        debug!("Starting {} unzip workers for {} archives", workers, queue.len());
        crossbeam::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|_| self.work(queue));
            }
        })
        .map_err(|_| RelToolsError::Process("unzip worker panicked".to_string()))?;

        Ok(workers)
    }

    fn work(&self, queue: &ArchiveQueue) {
        while let Some(archive) = queue.pop() {
            let dest = unzipped_dir(&archive);
            match fs::remove_dir_all(&dest) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Could not clear {}: {}", dest.display(), e),
            }

            debug!("unzipping {}", archive);
            if let Err(e) = self.extractor.extract(Path::new(&archive), &dest) {
                debug!("Extraction of {} failed: {}", archive, e);
            }
        }
    }
}
