//! Reading the word list out of a saved HTML page.
//!
//! The parser only needs an ordered list of [`PageItem`]s; [`ItemSource`] is
//! that seam. [`HtmlPage`] provides it over a `scraper` document.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Result, VocabError};
use crate::parser::items::{EntryFields, PageItem};
use crate::settings::SelectorSettings;

pub trait ItemSource {
    /// Items in document order, each classified as marker or entry.
    fn list_items(&self) -> Vec<PageItem>;
}

#[cfg(test)]
impl ItemSource for Vec<PageItem> {
    fn list_items(&self) -> Vec<PageItem> {
        self.clone()
    }
}

/// Compiled form of [`SelectorSettings`].
#[derive(Debug, Clone)]
pub struct PageSelectors {
    items: Selector,
    marker_class: String,
    heading: Selector,
    source: Selector,
    source_attr: String,
    target: Selector,
    word_type: Selector,
}

impl PageSelectors {
    pub fn compile(settings: &SelectorSettings) -> Result<Self> {
        Ok(Self {
            items: parse_selector("items", &settings.items)?,
            marker_class: settings.marker_class.clone(),
            heading: parse_selector("heading", &settings.heading)?,
            source: parse_selector("source", &settings.source)?,
            source_attr: settings.source_attr.clone(),
            target: parse_selector("target", &settings.target)?,
            word_type: parse_selector("word_type", &settings.word_type)?,
        })
    }
}

fn parse_selector(field: &'static str, selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| VocabError::Selector {
        field,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

pub struct HtmlPage<'a> {
    document: Html,
    selectors: &'a PageSelectors,
}

impl<'a> HtmlPage<'a> {
    pub fn parse(html: &str, selectors: &'a PageSelectors) -> Self {
        Self {
            document: Html::parse_document(html),
            selectors,
        }
    }

    /// Canonical URL of the page, if it declares one.
    pub fn canonical_url(&self) -> Option<String> {
        let canonical = Selector::parse(r#"link[rel="canonical"]"#).ok()?;
        let og_url = Selector::parse(r#"meta[property="og:url"]"#).ok()?;

        self.document
            .select(&canonical)
            .find_map(|el| el.value().attr("href"))
            .or_else(|| {
                self.document
                    .select(&og_url)
                    .find_map(|el| el.value().attr("content"))
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn classify(&self, item: ElementRef) -> PageItem {
        let s = self.selectors;
        if item.value().classes().any(|c| c == s.marker_class) {
            return PageItem::Marker {
                heading: item.select(&s.heading).next().map(element_text),
            };
        }

        let source_label = item
            .select(&s.source)
            .next()
            .and_then(|el| el.value().attr(&s.source_attr))
            .map(str::to_string);

        PageItem::Entry(EntryFields {
            source_label,
            target_label: item.select(&s.target).next().map(element_text),
            type_label: item.select(&s.word_type).next().map(element_text),
        })
    }
}

impl ItemSource for HtmlPage<'_> {
    fn list_items(&self) -> Vec<PageItem> {
        let items: Vec<PageItem> = self
            .document
            .select(&self.selectors.items)
            .map(|el| self.classify(el))
            .collect();
        debug!(count = items.len(), "listed page items");
        items
    }
}

/// Visible text with whitespace runs collapsed, close to what a browser renders.
fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──
