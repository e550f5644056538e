//! Document type and platform classification.
//!
//! Both scans work on lowercased visible text. An explicit hint from the
//! caller always beats inferred detection; when neither is available the
//! caller gets a named warning and a default.

use std::cmp::Reverse;

use pageforge_shared::{ConfigStore, ConversionWarning, DocumentType};
use tracing::debug;

use crate::text::Heading;

/// Why platform detection produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    /// No configured platform name or key occurs in the document.
    #[error("platform undetected")]
    PlatformUndetected,
}

/// A detected platform and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMatch {
    /// Key into the configuration store.
    pub key: String,
    /// Byte offset of the first occurrence in the lowercased text.
    pub offset: usize,
    /// The name or key that matched.
    pub needle: String,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Hint,
    Detected,
    Default,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Detected => "detected",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied overrides.
#[derive(Debug, Clone, Default)]
pub struct Hints {
    pub document_type: Option<DocumentType>,
    pub platform: Option<String>,
}

/// Final classification of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub document_type: DocumentType,
    pub type_source: Source,
    /// Platform key, if one was hinted or detected.
    pub platform: Option<String>,
    pub platform_source: Source,
    pub warnings: Vec<ConversionWarning>,
}

/// Classify the document type from keywords in the text and headings.
pub fn detect_document_type(text: &str, headings: &[Heading]) -> Option<DocumentType> {
    let text = text.to_lowercase();
    let heading_text = headings
        .iter()
        .map(|h| h.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    if text.contains("casino") && text.contains("review") {
        Some(DocumentType::CasinoReview)
    } else if text.contains("sportsbook")
        || (text.contains("betting") && heading_text.contains("review"))
    {
        Some(DocumentType::SportsbookReview)
    } else if (heading_text.contains("best") || heading_text.contains("comparison"))
        && (text.contains("crypto") || text.contains("comparison"))
    {
        Some(DocumentType::CryptoComparison)
    } else {
        None
    }
}

/// Find the configured platform mentioned earliest in the text.
///
/// Each platform is matched by display name and by key, on word boundaries.
/// Ties at the same offset go to the longer needle, then to the smaller key,
/// so the result only depends on the text and the store.
pub fn detect_platform(text: &str, store: &ConfigStore) -> Result<PlatformMatch, DetectError> {
    let text = text.to_lowercase();

    let best = store
        .platforms
        .iter()
        .flat_map(|(key, meta)| {
            [meta.name.to_lowercase(), key.to_lowercase()]
                .into_iter()
                .filter(|needle| !needle.trim().is_empty())
                .filter_map(|needle| {
                    find_word(&text, &needle).map(|offset| PlatformMatch {
                        key: key.clone(),
                        offset,
                        needle,
                    })
                })
        })
        .min_by_key(|m| (m.offset, Reverse(m.needle.len()), m.key.clone()));

    match best {
        Some(m) => {
            debug!(platform = %m.key, offset = m.offset, needle = %m.needle, "platform detected");
            Ok(m)
        }
        None => Err(DetectError::PlatformUndetected),
    }
}

/// Resolve type and platform from hints first, then detection, then defaults.
pub fn resolve(
    hints: &Hints,
    text: &str,
    headings: &[Heading],
    store: &ConfigStore,
) -> Detection {
    let mut warnings = Vec::new();

    let (document_type, type_source) = match hints.document_type {
        Some(t) => (t, Source::Hint),
        None => match detect_document_type(text, headings) {
            Some(t) => (t, Source::Detected),
            None => {
                let fallback = DocumentType::default();
                warnings.push(ConversionWarning::TypeUndetected { fallback });
                (fallback, Source::Default)
            }
        },
    };

    let hint = hints
        .platform
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let (platform, platform_source) = match hint {
        Some(hint) => {
            let key = resolve_platform_hint(hint, store);
            if key.is_none() {
                warnings.push(ConversionWarning::UnknownPlatformHint {
                    platform: hint.to_string(),
                });
            }
            (Some(key.unwrap_or_else(|| hint.to_string())), Source::Hint)
        }
        None => match detect_platform(text, store) {
            Ok(m) => (Some(m.key), Source::Detected),
            Err(DetectError::PlatformUndetected) => {
                warnings.push(ConversionWarning::PlatformUndetected);
                (None, Source::Default)
            }
        },
    };

    Detection {
        document_type,
        type_source,
        platform,
        platform_source,
        warnings,
    }
}

/// Map a hint to a configured key: exact key, then case-insensitive key or name.
fn resolve_platform_hint(hint: &str, store: &ConfigStore) -> Option<String> {
    if store.platforms.contains_key(hint) {
        return Some(hint.to_string());
    }
    store
        .platforms
        .iter()
        .find(|(key, meta)| key.eq_ignore_ascii_case(hint) || meta.name.eq_ignore_ascii_case(hint))
        .map(|(key, _)| key.clone())
}

/// First offset of `needle` in `haystack` not embedded in a longer word.
pub(crate) fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
