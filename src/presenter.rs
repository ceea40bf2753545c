use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::csv::{to_csv, CsvOptions};
use crate::error::{Result, VocabError};
use crate::locator::Languages;
use crate::parser::items::VocabularyRecord;
use crate::parser::sections::{SectionGroup, SectionIndex};

const ALL_SCOPE: &str = "all";
const UNNAMED_SECTION: &str = "unsectioned";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Section(String),
}

impl Scope {
    pub fn label(&self) -> &str {
        match self {
            Scope::All => ALL_SCOPE,
            Scope::Section(name) => section_label(name),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display name for a section; the implicit leading section has no heading.
pub fn section_label(name: &str) -> &str {
    if name.is_empty() {
        UNNAMED_SECTION
    } else {
        name
    }
}

/// A requested name selects a section by its heading or by its display label.
pub fn section_matches(name: &str, requested: &str) -> bool {
    name == requested || section_label(name) == requested
}

/// Exact heading first, then display label.
pub fn find_section<'a>(sections: &'a SectionIndex, requested: &str) -> Option<&'a SectionGroup> {
    sections.get(requested).or_else(|| {
        sections
            .groups()
            .iter()
            .find(|g| section_matches(&g.name, requested))
    })
}

/// One downloadable scope and the options it lets the user toggle.
#[derive(Debug, Clone)]
pub struct DownloadControl {
    pub scope: Scope,
    pub records: Vec<VocabularyRecord>,
    pub offers_id: bool,
}

/// Rendered CSV plus the file name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content: String,
}

/// The "all" control first, then one per section in discovery order.
pub fn controls(sections: &SectionIndex, records: &[VocabularyRecord]) -> Vec<DownloadControl> {
    let all = DownloadControl {
        scope: Scope::All,
        records: records.to_vec(),
        offers_id: true,
    };

    std::iter::once(all)
        .chain(sections.groups().iter().map(|g| DownloadControl {
            scope: Scope::Section(g.name.clone()),
            records: g.records.clone(),
            offers_id: false,
        }))
        .collect()
}

impl DownloadControl {
    /// Options actually applied: anything this control does not offer is off.
    pub fn effective_options(&self, requested: CsvOptions) -> CsvOptions {
        CsvOptions {
            include_id: requested.include_id && self.offers_id,
            ..requested
        }
    }

    pub fn download(&self, requested: CsvOptions, languages: &Languages) -> Download {
        let options = self.effective_options(requested);
        Download {
            file_name: file_name(languages, &self.scope, &options),
            content: to_csv(&self.records, &options, languages),
        }
    }
}

/// `vocabulary_{src}_{tgt}_{scope}_{section}_{type}_{id}.csv`
pub fn file_name(languages: &Languages, scope: &Scope, options: &CsvOptions) -> String {
    let name = format!(
        "vocabulary_{}_{}_{}_{}_{}_{}.csv",
        languages.source_label(),
        languages.target_label(),
        scope.label(),
        if options.include_section { "withSection" } else { "noSection" },
        if options.include_type { "withType" } else { "noType" },
        if options.include_id { "withID" } else { "noID" },
    );
    sanitize_file_name(&name)
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Give every download in a run its own file name. Later duplicates get a
/// numeric suffix (`..._2.csv`) so nothing is overwritten.
pub fn dedupe_file_names(downloads: &mut [Download]) {
    let mut taken: HashSet<String> = HashSet::new();
    for download in downloads.iter_mut() {
        if taken.insert(download.file_name.clone()) {
            continue;
        }

        let stem = download
            .file_name
            .strip_suffix(".csv")
            .unwrap_or(&download.file_name)
            .to_string();
        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{}_{}.csv", stem, n);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };

        warn!(
            original = %download.file_name,
            renamed = %renamed,
            "file name already used in this run; renaming"
        );
        taken.insert(renamed.clone());
        download.file_name = renamed;
    }
}

impl Download {
    /// Write into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|source| VocabError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.content.as_bytes()).map_err(|source| VocabError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = self.content.len(), "saved");
        Ok(path)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::items::PageItem;
    use crate::parser::process_items;

    fn de_es() -> Languages {
        Languages {
            source: Some("de".into()),
            target: Some("es".into()),
        }
    }

    fn sample_controls() -> Vec<DownloadControl> {
        let items = vec![
            PageItem::entry("ja", "sí", None),
            PageItem::marker("Greetings"),
            PageItem::entry("hallo [casual]", "hola", Some("· interjection")),
            PageItem::marker("Food"),
            PageItem::entry("Brot", "pan", Some("· noun")),
        ];
        let page = process_items(&items);
        controls(&page.sections, &page.records)
    }

    #[test]
    fn control_layout() {
        let c = sample_controls();
        let scopes: Vec<_> = c.iter().map(|c| c.scope.label().to_string()).collect();
        assert_eq!(scopes, vec!["all", "unsectioned", "Greetings", "Food"]);
        assert!(c[0].offers_id);
        assert!(c[1..].iter().all(|c| !c.offers_id));
        assert_eq!(c[0].records.len(), 3);
        assert_eq!(c[3].records.len(), 1);
    }

    #[test]
    fn all_download_name_and_body() {
        let c = sample_controls();
        let d = c[0].download(CsvOptions::all(), &de_es());
        assert_eq!(d.file_name, "vocabulary_de_es_all_withSection_withType_withID.csv");
        assert_eq!(
            d.content,
            "\u{FEFF}ID,Section,es,de,Type\n1,,sí,ja,\n2,Greetings,hola,hallo,interjection\n3,Food,pan,Brot,noun\n"
        );
    }

    #[test]
    fn section_download_never_has_id() {
        let c = sample_controls();
        let d = c[2].download(CsvOptions::all(), &de_es());
        assert_eq!(d.file_name, "vocabulary_de_es_Greetings_withSection_withType_noID.csv");
        assert_eq!(
            d.content,
            "\u{FEFF}Section,es,de,Type\nGreetings,hola,hallo,interjection\n"
        );
    }

    #[test]
    fn unknown_languages_in_name() {
        let name = file_name(&Languages::default(), &Scope::All, &CsvOptions::default());
        assert_eq!(name, "vocabulary_null_null_all_noSection_noType_noID.csv");
    }

    #[test]
    fn hostile_section_names_sanitized() {
        let scope = Scope::Section("Day/Night: a|b?".into());
        let name = file_name(&de_es(), &scope, &CsvOptions::default());
        assert_eq!(name, "vocabulary_de_es_Day_Night_ a_b__noSection_noType_noID.csv");
    }

    #[test]
    fn leading_group_found_by_label() {
        let items = vec![
            PageItem::entry("ja", "sí", None),
            PageItem::marker("Food"),
            PageItem::entry("Brot", "pan", None),
        ];
        let page = process_items(&items);
        let leading = find_section(&page.sections, "unsectioned").unwrap();
        assert_eq!(leading.name, "");
        assert_eq!(leading.records[0].target_word, "sí");
        assert_eq!(find_section(&page.sections, "").unwrap().name, "");
        assert_eq!(find_section(&page.sections, "Food").unwrap().records.len(), 1);
        assert!(find_section(&page.sections, "Drinks").is_none());
    }

    #[test]
    fn section_named_all_does_not_clobber_whole_page() {
        let items = vec![
            PageItem::marker("all"),
            PageItem::entry("alle", "todos", None),
            PageItem::marker("Food"),
            PageItem::entry("Brot", "pan", None),
        ];
        let page = process_items(&items);
        let mut downloads: Vec<Download> = controls(&page.sections, &page.records)
            .iter()
            .map(|c| c.download(CsvOptions::default(), &de_es()))
            .collect();
        dedupe_file_names(&mut downloads);

        let names: Vec<_> = downloads.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "vocabulary_de_es_all_noSection_noType_noID.csv",
                "vocabulary_de_es_all_noSection_noType_noID_2.csv",
                "vocabulary_de_es_Food_noSection_noType_noID.csv",
            ]
        );
        // Whole-page file keeps its name and its full content.
        assert_eq!(downloads[0].content.lines().count(), 3);
    }

    #[test]
    fn sanitized_collisions_get_distinct_suffixes() {
        let download = |name: &str| Download {
            file_name: name.into(),
            content: String::new(),
        };
        let mut downloads = vec![
            download("vocabulary_de_es_a_b_noSection_noType_noID.csv"),
            download("vocabulary_de_es_a_b_noSection_noType_noID.csv"),
            download("vocabulary_de_es_a_b_noSection_noType_noID_2.csv"),
        ];
        dedupe_file_names(&mut downloads);
        let names: Vec<_> = downloads.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "vocabulary_de_es_a_b_noSection_noType_noID.csv",
                "vocabulary_de_es_a_b_noSection_noType_noID_2.csv",
                "vocabulary_de_es_a_b_noSection_noType_noID_2_2.csv",
            ]
        );
    }

    #[test]
    fn save_writes_bom_prefixed_file() {
        let dir = std::env::temp_dir().join(format!("vocab_csv_save_{}", std::process::id()));
        let d = Download {
            file_name: "vocabulary_de_es_all_noSection_noType_noID.csv".into(),
            content: "\u{FEFF}es,de\n".into(),
        };
        let path = d.save(&dir).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
