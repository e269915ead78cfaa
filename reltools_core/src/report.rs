use crate::baseline::BaselineFilter;
use crate::segmenter::{split_entries, split_segments, FileDiff, RawEntry, FILE_SEPARATOR};
use tracing::debug;

/// One item of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    /// A text file with at least one surviving segment
    File(FileDiff),
    /// A line `diff` printed on its own, such as `Binary files X and Y differ`
    Notice(String),
}

/// Turns raw recursive diff output into the final refactor report
pub struct ReportAssembler<'a> {
    filter: &'a BaselineFilter,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(filter: &'a BaselineFilter) -> Self {
        Self { filter }
    }

    /// Surviving files and every notice, in diff output order
    pub fn process(&self, raw: &str) -> Vec<ReportEntry> {
        let mut entries = Vec::new();

        for entry in split_entries(raw) {
            let raw_file = match entry {
                RawEntry::File(raw_file) => raw_file,
                RawEntry::Notice(line) => {
                    entries.push(ReportEntry::Notice(line));
                    continue;
                }
            };

            let body = self.filter.scrub_multiline(&raw_file.body);
            let segments: Vec<_> = split_segments(&body)
                .iter()
                .filter_map(|segment| self.filter.filter_segment(segment, &raw_file.extension))
                .collect();

            if segments.is_empty() {
                debug!("{} is fully baselined", raw_file.new_path);
                continue;
            }
            entries.push(ReportEntry::File(FileDiff {
                new_path: raw_file.new_path,
                segments,
            }));
        }

        entries
    }

    pub fn render(entries: &[ReportEntry]) -> String {
        entries
            .iter()
            .map(|entry| match entry {
                ReportEntry::File(file) => {
                    let mut lines = vec![format!("{} {}", FILE_SEPARATOR, file.new_path)];
                    lines.extend(file.segments.iter().map(|segment| segment.text()));
                    lines.join("\n")
                }
                ReportEntry::Notice(line) => line.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn assemble(&self, raw: &str) -> String {
        Self::render(&self.process(raw))
    }
}
