//! Text helpers shared by the extraction passes: block-aware text collection,
//! headings, paragraphs and Word list-paragraph handling.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose boundaries separate words in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead",
    "title", "tr", "ul",
];

/// Elements whose text is never visible.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "xml"];

/// A heading in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1 for `<h1>`, 2 for `<h2>`, ...
    pub level: u8,
    pub text: String,
}

/// Collapse runs of whitespace (including `&nbsp;`) into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

fn is_hidden(name: &str) -> bool {
    HIDDEN_TAGS.contains(&name)
}

/// Visible text of an element with block boundaries turned into spaces.
///
/// Word splits words across `<span>` runs, so inline text is concatenated
/// as-is; block elements (`p`, `td`, `li`, ...) always separate.
pub fn element_text(el: &ElementRef) -> String {
    let mut out = String::new();

    for node in el.descendants() {
        match node.value() {
            Node::Element(e) if is_block(e.name()) => out.push(' '),
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| is_hidden(e.name()))
                });
                if hidden {
                    continue;
                }
                let after_block = node
                    .prev_sibling()
                    .and_then(|s| s.value().as_element().map(|e| is_block(e.name())))
                    .unwrap_or(false);
                if after_block {
                    out.push(' ');
                }
                out.push_str(text);
            }
            _ => {}
        }
    }

    collapse_whitespace(&out)
}

/// Visible text of the whole document, used for keyword and rating scans.
pub fn visible_text(doc: &Html) -> String {
    element_text(&doc.root_element())
}

/// Whether `el` sits inside an element named `tag`.
pub(crate) fn has_ancestor(el: &ElementRef, tags: &[&str]) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| tags.contains(&a.value().name()))
}

/// Heading level for `h1`..`h6`, `None` for anything else.
pub(crate) fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Extract h1–h3 headings in document order. Empty headings are skipped.
pub fn extract_headings(doc: &Html) -> Vec<Heading> {
    let sel = Selector::parse("h1, h2, h3").expect("valid selector");

    doc.select(&sel)
        .filter_map(|el| {
            let level = heading_level(el.value().name())?;
            let text = element_text(&el);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

/// The first `<h1>` heading's text.
pub fn extract_title(headings: &[Heading]) -> Option<&str> {
    headings
        .iter()
        .find(|h| h.level == 1)
        .map(|h| h.text.as_str())
}

/// Minimum length (in characters) for a paragraph to count as body copy.
const MIN_PARAGRAPH_CHARS: usize = 10;

/// Extract body paragraphs.
///
/// Skips paragraphs inside tables and lists, Word list paragraphs, Pros/Cons
/// markers, and anything of 10 characters or fewer (Word emits many empty and
/// `&nbsp;` paragraphs).
pub fn extract_paragraphs(doc: &Html) -> Vec<String> {
    let sel = Selector::parse("p").expect("valid selector");

    doc.select(&sel)
        .filter(|p| !is_list_paragraph(p))
        .filter(|p| !has_ancestor(p, &["table", "li", "ul", "ol"]))
        .map(|p| element_text(&p))
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .filter(|text| crate::lists::marker_kind(text).is_none())
        .collect()
}

/// Word renders bullets as `<p class=MsoListParagraph...>` instead of `<li>`.
pub(crate) fn is_list_paragraph(el: &ElementRef) -> bool {
    el.value().name() == "p"
        && el
            .value()
            .classes()
            .any(|c| c.starts_with("MsoListParagraph"))
}

/// Strip the bullet glyph or number Word prefixes to list paragraphs.
pub(crate) fn strip_bullet(text: &str) -> String {
    static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(?:[·•§▪◦\-–*\x{F0B7}\x{F0A7}]|o|\d{1,2}[.)])\s+").expect("valid regex")
    });

    BULLET_RE.replace(text.trim(), "").trim().to_string()
}

/// HTML-escape extracted text before it is placed into a generated fragment.
pub(crate) fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}
