pub mod extract;
pub mod items;
pub mod sections;

use items::{PageItem, VocabularyRecord};
use sections::SectionIndex;

/// Extraction result for one page: the flat record list plus the per-section view.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub records: Vec<VocabularyRecord>,
    pub sections: SectionIndex,
}

/// Two views over the same item sequence: flat records and section buckets.
pub fn process_items(items: &[PageItem]) -> ParsedPage {
    ParsedPage {
        records: extract::extract_records(items),
        sections: sections::group_by_section(items),
    }
}
