use std::fmt;

const LANGUAGE_SEGMENT_MARKER: &str = "vocabulary";

/// Source/target language pair taken from a page path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Languages {
    pub source: Option<String>,
    pub target: Option<String>,
}

impl Languages {
    pub fn is_unknown(&self) -> bool {
        self.source.is_none() && self.target.is_none()
    }

    /// Label used in headers and file names; a missing language renders as `null`.
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or("null")
    }

    pub fn target_label(&self) -> &str {
        self.target.as_deref().unwrap_or("null")
    }
}

impl fmt::Display for Languages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_label(), self.target_label())
    }
}

/// Find the `vocabulary` segment and return the two segments after it.
pub fn locate(path: &str) -> Languages {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').collect();

    let Some(idx) = segments.iter().position(|s| *s == LANGUAGE_SEGMENT_MARKER) else {
        return Languages::default();
    };

    let segment_at = |i: usize| {
        segments
            .get(i)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    Languages {
        source: segment_at(idx + 1),
        target: segment_at(idx + 2),
    }
}

/// Try each candidate path in order; the first one naming any language wins.
pub fn locate_first<'a, I>(candidates: I) -> Languages
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(locate)
        .find(|langs| !langs.is_unknown())
        .unwrap_or_default()
}

// ── Tests ──
