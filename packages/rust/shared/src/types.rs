//! Core domain types shared by the extractor, renderer and pipeline.

use serde::{Deserialize, Serialize};

use crate::error::PageForgeError;

// ---------------------------------------------------------------------------
// DocumentType
// ---------------------------------------------------------------------------

/// Page category a document is converted into. Each has its own page template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    #[default]
    CasinoReview,
    SportsbookReview,
    CryptoComparison,
}

impl DocumentType {
    /// All supported types, in selector order.
    pub const ALL: [DocumentType; 3] = [
        Self::CasinoReview,
        Self::SportsbookReview,
        Self::CryptoComparison,
    ];

    /// Selector string used on the CLI, in form fields and as the template stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CasinoReview => "casino-review",
            Self::SportsbookReview => "sportsbook-review",
            Self::CryptoComparison => "crypto-comparison",
        }
    }

    /// File name of the page template for this type.
    pub fn template_file(&self) -> String {
        format!("{}.html", self.as_str())
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = PageForgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                PageForgeError::validation(format!(
                    "unknown template type '{s}': expected casino-review, sportsbook-review or crypto-comparison"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// ConversionMethod
// ---------------------------------------------------------------------------

/// Which path produced the rendered HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionMethod {
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "rule-based")]
    RuleBased,
}

impl ConversionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::RuleBased => "rule-based",
        }
    }
}

impl std::fmt::Display for ConversionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConversionWarning
// ---------------------------------------------------------------------------

/// A non-fatal condition: the page was produced, but with reduced fidelity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionWarning {
    /// No known platform name appears in the document and no hint was given.
    PlatformUndetected,
    /// The platform hint is not a key in the platform metadata.
    UnknownPlatformHint { platform: String },
    /// No type keywords matched and no hint was given; the default type was used.
    TypeUndetected { fallback: DocumentType },
    /// The AI delegate failed; the rule-based path produced the page.
    AiFallback { reason: String },
    /// A page template or component was missing on disk; the built-in copy was used.
    BuiltinTemplate { name: String },
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlatformUndetected => f.write_str("platform undetected"),
            Self::UnknownPlatformHint { platform } => {
                write!(f, "platform '{platform}' has no configured metadata")
            }
            Self::TypeUndetected { fallback } => {
                write!(f, "document type undetected, using {fallback}")
            }
            Self::AiFallback { reason } => write!(f, "AI conversion failed ({reason}), used rules"),
            Self::BuiltinTemplate { name } => write!(f, "template {name} not found, used built-in"),
        }
    }
}
