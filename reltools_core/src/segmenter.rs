use regex::Regex;
use std::sync::LazyLock;

/// Prefix of the line `diff -r` prints before each differing file
pub const FILE_SEPARATOR: &str = "diff -r";

// Location-in-file header: 83c70, 99,112d87, 5a6,7
static LOCATION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[0-9acd,]*$").unwrap());

pub fn is_location_header(line: &str) -> bool {
    LOCATION_HEADER.is_match(line)
}

/// The raw diff of one file, before it is split into segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileDiff {
    pub new_path: String,
    pub extension: String,
    pub body: String,
}

/// One location header plus the lines that follow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSegment {
    pub lines: Vec<String>,
}

impl DiffSegment {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn header(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Surviving segments of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub new_path: String,
    pub segments: Vec<DiffSegment>,
}

/// Extension used to select extension-specific rules: text after the last dot,
/// or the whole path when there is none.
pub fn file_extension(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Lines `diff -r` prints on their own, with no `diff -r` header or hunks:
/// binary files that differ and files present in only one tree.
pub fn is_notice(line: &str) -> bool {
    (line.starts_with("Binary files ") && line.ends_with(" differ")) || line.starts_with("Only in ")
}

/// One item of recursive diff output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    File(RawFileDiff),
    Notice(String),
}

/// Split recursive diff output into per-file chunks and standalone notices,
/// in output order.
///
/// A notice ends the chunk before it, so it never lands in another file's
/// segments. Other text before the first `diff -r` line is dropped.
pub fn split_entries(raw: &str) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in raw.lines() {
        if line.starts_with(FILE_SEPARATOR) {
            if let Some((new_path, body)) = current.take() {
                entries.push(RawEntry::File(raw_file_diff(new_path, &body)));
            }
            let new_path = line.rsplit(' ').next().unwrap_or_default().to_string();
            current = Some((new_path, Vec::new()));
        } else if is_notice(line) {
            if let Some((new_path, body)) = current.take() {
                entries.push(RawEntry::File(raw_file_diff(new_path, &body)));
            }
            entries.push(RawEntry::Notice(line.to_string()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((new_path, body)) = current {
        entries.push(RawEntry::File(raw_file_diff(new_path, &body)));
    }

    entries
}

/// The per-file chunks of recursive diff output, notices left out
pub fn split_files(raw: &str) -> Vec<RawFileDiff> {
    split_entries(raw)
        .into_iter()
        .filter_map(|entry| match entry {
            RawEntry::File(file) => Some(file),
            RawEntry::Notice(_) => None,
        })
        .collect()
}

fn raw_file_diff(new_path: String, body: &[&str]) -> RawFileDiff {
    let extension = file_extension(&new_path).to_string();
    RawFileDiff {
        new_path,
        extension,
        body: body.join("\n"),
    }
}

/// Split one file's diff body at location headers.
///
/// Lines before the first header are dropped.
pub fn split_segments(body: &str) -> Vec<DiffSegment> {
    let mut segments = Vec::new();
    let mut current: Option<Vec<String>> = None;

    for line in body.lines() {
        if is_location_header(line) {
            if let Some(lines) = current.take() {
                segments.push(DiffSegment::new(lines));
            }
            current = Some(vec![line.to_string()]);
        } else if let Some(lines) = current.as_mut() {
            lines.push(line.to_string());
        }
    }

    if let Some(lines) = current {
        segments.push(DiffSegment::new(lines));
    }

    segments
}
