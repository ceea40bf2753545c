use std::collections::HashMap;

use tracing::debug;

use super::items::{normalize_entry, PageItem, VocabularyRecord};

/// Records sharing one heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup {
    pub name: String,
    /// Position of the marker item that opened this section; `None` for the
    /// leading group of entries that appear before any heading.
    pub marker_index: Option<usize>,
    pub records: Vec<VocabularyRecord>,
}

/// Sections in order of first appearance, with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    groups: Vec<SectionGroup>,
    by_name: HashMap<String, usize>,
}

impl SectionIndex {
    pub fn groups(&self) -> &[SectionGroup] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&SectionGroup> {
        self.by_name.get(name).map(|&i| &self.groups[i])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All records, section by section in discovery order.
    pub fn flatten(&self) -> Vec<VocabularyRecord> {
        self.groups
            .iter()
            .flat_map(|g| g.records.iter().cloned())
            .collect()
    }

    fn open(&mut self, name: &str, marker_index: Option<usize>) -> usize {
        if let Some(&i) = self.by_name.get(name) {
            return i;
        }
        self.groups.push(SectionGroup {
            name: name.to_string(),
            marker_index,
            records: Vec::new(),
        });
        let i = self.groups.len() - 1;
        self.by_name.insert(name.to_string(), i);
        i
    }
}

#[derive(Debug, Default)]
struct Grouping {
    current: String,
    index: SectionIndex,
}

impl Grouping {
    fn step(mut self, (idx, item): (usize, &PageItem)) -> Self {
        match item {
            PageItem::Marker { heading: Some(h) } => {
                self.current = h.trim().to_string();
                self.index.open(&self.current, Some(idx));
            }
            PageItem::Marker { heading: None } => {}
            PageItem::Entry(fields) => match normalize_entry(fields) {
                Some(n) => {
                    // Entries before the first heading land in an implicit "" group.
                    let slot = self.index.open(&self.current, None);
                    self.index.groups[slot]
                        .records
                        .push(n.into_record(&self.current));
                }
                None => debug!(item = idx, "skipping entry with missing source or target"),
            },
        }
        self
    }
}

/// Bucket records by the heading they appear under.
pub fn group_by_section(items: &[PageItem]) -> SectionIndex {
    items
        .iter()
        .enumerate()
        .fold(Grouping::default(), Grouping::step)
        .index
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::extract_records;

    fn sample() -> Vec<PageItem> {
        vec![
            PageItem::marker("Greetings"),
            PageItem::entry("hallo [casual]", "hola", Some("· interjection")),
            PageItem::entry("tschüss", "adiós", Some("· interjection")),
            PageItem::marker("Food"),
            PageItem::entry("Brot", "pan", Some("· noun")),
            PageItem::marker("Empty"),
            PageItem::marker("Drinks"),
            PageItem::entry("Wasser, Mineralwasser", "agua", Some("· noun")),
        ]
    }

    #[test]
    fn discovery_order_and_marker_positions() {
        let index = group_by_section(&sample());
        let names: Vec<_> = index.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Greetings", "Food", "Empty", "Drinks"]);

        let markers: Vec<_> = index.groups().iter().map(|g| g.marker_index).collect();
        assert_eq!(markers, vec![Some(0), Some(3), Some(5), Some(6)]);

        assert!(index.get("Empty").unwrap().records.is_empty());
        assert_eq!(index.get("Greetings").unwrap().records.len(), 2);
        assert_eq!(index.get("Drinks").unwrap().records[0].source_words, "Wasser|Mineralwasser");
    }

    #[test]
    fn concatenation_equals_flat_extraction() {
        let items = sample();
        assert_eq!(group_by_section(&items).flatten(), extract_records(&items));
    }

    #[test]
    fn entries_before_first_heading_get_unnamed_group() {
        let items = vec![
            PageItem::entry("ja", "sí", None),
            PageItem::marker("Basics"),
            PageItem::entry("nein", "no", None),
        ];
        let index = group_by_section(&items);

        assert_eq!(index.len(), 2);
        let leading = &index.groups()[0];
        assert_eq!(leading.name, "");
        assert_eq!(leading.marker_index, None);
        assert_eq!(leading.records[0].target_word, "sí");
        assert_eq!(index.flatten(), extract_records(&items));
    }

    #[test]
    fn repeated_heading_appends_to_existing_group() {
        let items = vec![
            PageItem::marker("Verbs"),
            PageItem::entry("gehen", "ir", None),
            PageItem::marker("Verbs"),
            PageItem::entry("kommen", "venir", None),
        ];
        let index = group_by_section(&items);
        assert_eq!(index.len(), 1);
        let verbs = index.get("Verbs").unwrap();
        assert_eq!(verbs.marker_index, Some(0));
        assert_eq!(verbs.records.len(), 2);
        assert_eq!(index.flatten(), extract_records(&items));
    }

    #[test]
    fn heading_without_entries_only() {
        let index = group_by_section(&[PageItem::Marker { heading: None }]);
        assert!(index.is_empty());
    }
}
