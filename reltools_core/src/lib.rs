pub mod process;
pub mod tree_diff;
pub mod archive_queue;
pub mod extract;
pub mod unzip_pool;
pub mod unzipper;
pub mod segmenter;
pub mod baseline;
pub mod report;
pub mod bytecode;
pub mod validate;
pub mod versions;
pub mod relnote;

#[cfg(test)]
mod tests_end_to_end;

pub use process::{ProcessRunner, SystemRunner};
pub use tree_diff::{DiffFilter, TreeDiffer};
pub use archive_queue::ArchiveQueue;
pub use extract::{Extractor, UnzipCommand, ZipExtractor};
pub use unzip_pool::{UnzipWorkerPool, DEFAULT_UNZIP_WORKERS};
pub use unzipper::{standard_passes, RecursiveUnzipper, UnzipPass};
pub use segmenter::{DiffSegment, FileDiff};
pub use baseline::{BaselineFilter, BaselineRule, BaselineRuleSet};
pub use report::{ReportAssembler, ReportEntry};
pub use bytecode::{BytecodeComparator, BytecodeOutcome};
pub use validate::RefactorValidator;
pub use versions::Version;
pub use relnote::{RelnoteCheck, RelnoteStatus};
