//! Rule-based content extraction from Word-exported HTML.
//!
//! Every pass is an independent function over a parsed [`scraper::Html`]
//! document that degrades to an empty or `None` value on malformed input, so
//! extraction as a whole never fails:
//!
//! - [`text`]: headings, paragraphs, visible text
//! - [`tables`]: tables and the two-column quick-facts convention
//! - [`lists`]: pros/cons lists
//! - [`rating`]: "N/10" and "N out of 5" ratings
//! - [`faq`]: FAQ question/answer pairs
//! - [`sections`]: topic sections (bonuses, games, payments, ...)
//! - [`detect`]: document type and platform classification

pub mod detect;
pub mod faq;
pub mod lists;
pub mod rating;
pub mod sections;
pub mod tables;
pub mod text;

use scraper::Html;
use tracing::{debug, instrument};

pub use detect::{
    DetectError, Detection, Hints, PlatformMatch, Source, detect_document_type, detect_platform,
    resolve,
};
pub use faq::{FaqEntry, extract_faqs};
pub use lists::{ProsCons, extract_pros_cons};
pub use rating::{Rating, extract_rating};
pub use sections::{Topic, TopicSection, extract_sections};
pub use tables::{Cell, FactRow, KeyValueTable, Table, extract_tables};
pub use text::{
    Heading, collapse_whitespace, extract_headings, extract_paragraphs, extract_title, visible_text,
};

/// Everything the rule-based path pulls out of one document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Visible text, whitespace-collapsed. Used for detection.
    pub text: String,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
    pub pros_cons: ProsCons,
    pub rating: Option<Rating>,
    pub faqs: Vec<FaqEntry>,
    pub sections: Vec<TopicSection>,
}

impl Extraction {
    /// The first `<h1>`, if any.
    pub fn title(&self) -> Option<&str> {
        extract_title(&self.headings)
    }

    /// The first table, if it follows the two-column convention.
    pub fn quick_facts(&self) -> Option<KeyValueTable> {
        self.tables.first().and_then(Table::two_column)
    }

    pub fn section(&self, topic: Topic) -> Option<&TopicSection> {
        self.sections.iter().find(|s| s.topic == topic)
    }
}

/// Run every extraction pass over raw HTML.
#[instrument(skip_all, fields(len = html.len()))]
pub fn extract(html: &str) -> Extraction {
    let doc = Html::parse_document(html);
    let text = visible_text(&doc);

    let extraction = Extraction {
        rating: extract_rating(&text),
        headings: extract_headings(&doc),
        paragraphs: extract_paragraphs(&doc),
        tables: extract_tables(&doc),
        pros_cons: extract_pros_cons(&doc),
        faqs: extract_faqs(&doc),
        sections: extract_sections(&doc),
        text,
    };

    debug!(
        headings = extraction.headings.len(),
        paragraphs = extraction.paragraphs.len(),
        tables = extraction.tables.len(),
        pros = extraction.pros_cons.pros.len(),
        cons = extraction.pros_cons.cons.len(),
        rating = ?extraction.rating,
        faqs = extraction.faqs.len(),
        sections = extraction.sections.len(),
        "extraction complete"
    );

    extraction
}
