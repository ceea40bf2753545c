//! CSV rendering of vocabulary records.
//!
//! Fields are joined with commas as-is. Nothing is quoted or escaped, so a
//! comma inside a section name, target word or type shifts the columns of
//! that row. Source alternatives are already pipe-separated by the parser.

use crate::locator::Languages;
use crate::parser::items::VocabularyRecord;

const BOM: char = '\u{FEFF}';
const DELIMITER: &str = ",";

/// Optional columns to include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    pub include_section: bool,
    pub include_type: bool,
    pub include_id: bool,
}

impl CsvOptions {
    #[cfg(test)]
    pub fn all() -> Self {
        Self {
            include_section: true,
            include_type: true,
            include_id: true,
        }
    }
}

pub fn header(options: &CsvOptions, languages: &Languages) -> String {
    let mut cols = Vec::with_capacity(5);
    if options.include_id {
        cols.push("ID");
    }
    if options.include_section {
        cols.push("Section");
    }
    cols.push(languages.target_label());
    cols.push(languages.source_label());
    if options.include_type {
        cols.push("Type");
    }
    cols.join(DELIMITER)
}

/// BOM, header line, then one line per record; IDs count from 1.
pub fn to_csv(records: &[VocabularyRecord], options: &CsvOptions, languages: &Languages) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(&header(options, languages));
    out.push('\n');

    for (i, record) in records.iter().enumerate() {
        let id = (i + 1).to_string();
        let mut row: Vec<&str> = Vec::with_capacity(5);
        if options.include_id {
            row.push(&id);
        }
        if options.include_section {
            row.push(&record.section);
        }
        row.push(&record.target_word);
        row.push(&record.source_words);
        if options.include_type {
            row.push(&record.word_type);
        }
        out.push_str(&row.join(DELIMITER));
        out.push('\n');
    }

    out
}

// ── Tests ──
