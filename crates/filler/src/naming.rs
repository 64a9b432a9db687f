//! Deliverable file names

use crate::record::Record;
use std::collections::HashSet;

/// Stem used when a record has no display name
pub const FALLBACK_STEM: &str = "submission";

/// Name of the archive produced for bulk fills
pub const ARCHIVE_FILE_NAME: &str = "submissions.zip";

/// Make a display name safe for a file name.
///
/// Every run of characters outside `[A-Za-z0-9_-]` becomes a single `_`.
/// Empty names fall back to [`FALLBACK_STEM`].
pub fn sanitize_file_stem(name: &str) -> String {
    if name.is_empty() {
        return FALLBACK_STEM.to_string();
    }

    let mut stem = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            stem.push(c);
            in_run = false;
        } else if !in_run {
            stem.push('_');
            in_run = true;
        }
    }
    stem
}

/// `<stem>.pdf` for a record
pub fn single_file_name(record: &Record) -> String {
    pdf_file_name(record.display_name().as_deref())
}

/// `<stem>.pdf` for an optional display name
pub fn pdf_file_name(display_name: Option<&str>) -> String {
    format!("{}.pdf", sanitize_file_stem(display_name.unwrap_or("")))
}

/// Hands out distinct `.pdf` names within one archive
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name for a display name; repeats become `<stem>_2.pdf`, `<stem>_3.pdf`, ...
    pub fn claim(&mut self, display_name: Option<&str>) -> String {
        let stem = sanitize_file_stem(display_name.unwrap_or(""));

        let mut candidate = format!("{stem}.pdf");
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{stem}_{n}.pdf");
            n += 1;
        }

        self.taken.insert(candidate.clone());
        candidate
    }
}
