use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// How many characters of trimmed passage text form the dedup fingerprint.
pub const FINGERPRINT_CHARS: usize = 150;

/// Display text for references that came back with an empty passage.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "No excerpt available";

/// Metadata keys that form the location badge, in display order.
const LOCATION_KEYS: [&str; 6] = ["rule", "section", "article", "part", "subsection", "page"];

/// Locator substrings that mark a passage as coming from the CBA itself.
const CBA_KEYWORDS: [&str; 3] = ["cba", "collective-bargaining", "collective bargaining"];

/// Locator substrings that mark a passage as coming from the operations manual.
const MANUAL_KEYWORDS: [&str; 3] = ["operations-manual", "operations manual", "ops-manual"];

/// A raw passage returned by the remote retrieve-and-generate call.
///
/// Immutable once produced; scoped to a single query/response cycle. The
/// metadata map carries whatever structured attributes the knowledge base
/// attached to the source chunk (rule, section, page, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedReference {
    /// Passage text as retrieved. May be empty for some location types.
    pub text: String,
    /// Source URI (S3, web, Confluence, ...). May be empty.
    pub locator: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Retrieval relevance score, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl RetrievedReference {
    pub fn new(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locator: locator.into(),
            metadata: BTreeMap::new(),
            score: None,
        }
    }
}

/// Which corpus document a citation came from, judged by its locator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The collective bargaining agreement itself.
    CbaDocument,
    /// The operations manual that supplements the CBA.
    OperationsManual,
    /// Anything else; carries a display name derived from the locator.
    Other(String),
}

impl SourceKind {
    /// Classify a locator by substring match, falling back to a
    /// human-readable name derived from its filename.
    pub fn from_locator(locator: &str) -> Self {
        let lowered = locator.to_lowercase();
        if CBA_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Self::CbaDocument
        } else if MANUAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Self::OperationsManual
        } else {
            Self::Other(display_name(locator))
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::CbaDocument => "CBA",
            Self::OperationsManual => "Operations Manual",
            Self::Other(name) => name,
        }
    }
}

/// A retrieved reference prepared for display: deduplicated, with a location
/// badge built from its metadata and a source category from its locator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedCitation {
    pub reference: RetrievedReference,
    /// "Rule 10, Section II" style badge; `None` when no location metadata
    /// is present.
    pub location_label: Option<String>,
    pub source: SourceKind,
}

/// Deduplicate and annotate the references from one query.
///
/// The same source chunk often comes back several times when the service
/// splits a document; two references are duplicates when the first
/// [`FINGERPRINT_CHARS`] characters of their trimmed text match. References
/// with empty text dedup instead on their locator with any `#fragment`
/// suffix stripped. First-seen order is preserved and later duplicates are
/// dropped, never merged.
///
/// Pure and infallible: a reference with no text and no locator still yields
/// a generic citation.
pub fn normalize(references: Vec<RetrievedReference>) -> Vec<AnnotatedCitation> {
    let mut seen_fingerprints: HashSet<String> = HashSet::new();
    let mut seen_locators: HashSet<String> = HashSet::new();
    let mut citations = Vec::new();

    for mut reference in references {
        let trimmed = reference.text.trim().to_string();

        if trimmed.is_empty() {
            reference.text = EMPTY_TEXT_PLACEHOLDER.to_string();
            let key = strip_fragment(&reference.locator).to_string();
            if !seen_locators.insert(key) {
                continue;
            }
        } else {
            let fingerprint: String = trimmed.chars().take(FINGERPRINT_CHARS).collect();
            reference.text = trimmed;
            if !seen_fingerprints.insert(fingerprint) {
                continue;
            }
            seen_locators.insert(strip_fragment(&reference.locator).to_string());
        }

        let location_label = location_label(&reference.metadata);
        let source = SourceKind::from_locator(&reference.locator);
        citations.push(AnnotatedCitation {
            reference,
            location_label,
            source,
        });
    }

    citations
}

/// Build the "Rule 10, Section II" badge from chunk metadata.
///
/// Keys are scanned in the fixed [`LOCATION_KEYS`] order; absent keys are
/// skipped and an empty scan yields no badge at all.
pub fn location_label(metadata: &BTreeMap<String, String>) -> Option<String> {
    let parts: Vec<String> = LOCATION_KEYS
        .iter()
        .filter_map(|key| {
            metadata
                .get(*key)
                .map(|value| format!("{} {}", title_case(key), value))
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Drop a trailing `#fragment` so chunked locators compare equal.
fn strip_fragment(locator: &str) -> &str {
    match locator.find('#') {
        Some(index) => &locator[..index],
        None => locator,
    }
}

/// Derive a readable name from a locator's filename: strip the extension,
/// replace separators with spaces, title-case each word.
fn display_name(locator: &str) -> String {
    let filename = locator.rsplit('/').next().unwrap_or(locator);
    let stem = match filename.rfind('.') {
        Some(index) if index > 0 => &filename[..index],
        _ => filename,
    };
    let name: String = stem
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        "Unknown Source".to_string()
    } else {
        name
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
