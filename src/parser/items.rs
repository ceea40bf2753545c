use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());

const ALTERNATIVES_SEPARATOR: &str = ", ";
const ALTERNATIVES_JOINER: &str = "|";
const TYPE_MARKER: &str = "· ";

/// One row of the word list, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageItem {
    /// Section heading row. `heading` is `None` when the row has no heading element.
    Marker { heading: Option<String> },
    Entry(EntryFields),
}

/// Raw labels read from a vocabulary row; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub source_label: Option<String>,
    pub target_label: Option<String>,
    pub type_label: Option<String>,
}

#[cfg(test)]
impl PageItem {
    pub fn marker(heading: &str) -> Self {
        PageItem::Marker {
            heading: Some(heading.to_string()),
        }
    }

    pub fn entry(source: &str, target: &str, word_type: Option<&str>) -> Self {
        PageItem::Entry(EntryFields {
            source_label: Some(source.to_string()),
            target_label: Some(target.to_string()),
            type_label: word_type.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyRecord {
    pub section: String,
    pub target_word: String,
    /// Alternatives separated by `|`.
    pub source_words: String,
    pub word_type: String,
}

/// Cleaned word pair, not yet tied to a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub target_word: String,
    pub source_words: String,
    pub word_type: String,
}

impl Normalized {
    pub fn into_record(self, section: &str) -> VocabularyRecord {
        VocabularyRecord {
            section: section.to_string(),
            target_word: self.target_word,
            source_words: self.source_words,
            word_type: self.word_type,
        }
    }
}

/// Returns `None` unless both source and target survive cleaning non-empty.
pub fn normalize_entry(fields: &EntryFields) -> Option<Normalized> {
    let source_words = clean_source(fields.source_label.as_deref()?);
    let target_word = fields.target_label.as_deref()?.trim().to_string();
    if source_words.is_empty() || target_word.is_empty() {
        return None;
    }

    let word_type = fields
        .type_label
        .as_deref()
        .map(clean_type)
        .unwrap_or_default();

    Some(Normalized {
        target_word,
        source_words,
        word_type,
    })
}

/// Drop the first `[...]` annotation and turn `a, b, c` into `a|b|c`.
pub fn clean_source(raw: &str) -> String {
    ANNOTATION_RE
        .replace(raw, "")
        .trim()
        .replace(ALTERNATIVES_SEPARATOR, ALTERNATIVES_JOINER)
}

pub fn clean_type(raw: &str) -> String {
    let raw = raw.trim_start();
    raw.strip_prefix(TYPE_MARKER).unwrap_or(raw).trim().to_string()
}

// ── Tests ──
