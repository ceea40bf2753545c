use tracing::debug;

use super::items::{normalize_entry, PageItem, VocabularyRecord};

/// Running state of the single pass over the word list.
#[derive(Debug, Default)]
struct Scan {
    section: String,
    records: Vec<VocabularyRecord>,
}

impl Scan {
    fn step(mut self, (idx, item): (usize, &PageItem)) -> Self {
        match item {
            PageItem::Marker { heading: Some(h) } => self.section = h.trim().to_string(),
            PageItem::Marker { heading: None } => {}
            PageItem::Entry(fields) => match normalize_entry(fields) {
                Some(n) => self.records.push(n.into_record(&self.section)),
                None => debug!(item = idx, "skipping entry with missing source or target"),
            },
        }
        self
    }
}

/// Flat list of records, in page order, each tagged with the heading in force.
pub fn extract_records(items: &[PageItem]) -> Vec<VocabularyRecord> {
    items
        .iter()
        .enumerate()
        .fold(Scan::default(), Scan::step)
        .records
}

// ── Tests ──
