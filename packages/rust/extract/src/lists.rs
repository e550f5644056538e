//! Pros/cons extraction.
//!
//! Reviews mark their lists with a bold "Pros:" / "Cons:" label followed by a
//! bullet list. Word exports the list either as `<ul>` or as a run of
//! `MsoListParagraph` paragraphs; both are handled.

use scraper::{ElementRef, Html, Selector};

use crate::text::{element_text, heading_level, is_block, is_list_paragraph, strip_bullet};

/// Which list a marker introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Pros,
    Cons,
}

/// Pros and cons lists. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProsCons {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl ProsCons {
    pub fn is_empty(&self) -> bool {
        self.pros.is_empty() && self.cons.is_empty()
    }
}

/// Classify marker text such as "Pros", "Cons:" or "PROS :".
pub fn marker_kind(text: &str) -> Option<MarkerKind> {
    let label = text.trim().trim_end_matches(':').trim();
    if label.eq_ignore_ascii_case("pros") {
        Some(MarkerKind::Pros)
    } else if label.eq_ignore_ascii_case("cons") {
        Some(MarkerKind::Cons)
    } else {
        None
    }
}

/// Extract the pros and cons lists. A missing marker yields an empty list.
pub fn extract_pros_cons(doc: &Html) -> ProsCons {
    ProsCons {
        pros: extract_list(doc, MarkerKind::Pros),
        cons: extract_list(doc, MarkerKind::Cons),
    }
}

fn extract_list(doc: &Html, kind: MarkerKind) -> Vec<String> {
    let sel = Selector::parse("strong, b, em, h2, h3, h4, p").expect("valid selector");

    let Some(marker) = doc
        .select(&sel)
        .find(|el| marker_kind(&element_text(el)) == Some(kind))
    else {
        return Vec::new();
    };

    items_after(&enclosing_block(marker))
}

/// Climb from an inline marker (`<b>` inside `<p>`) to the block that holds it.
fn enclosing_block(el: ElementRef<'_>) -> ElementRef<'_> {
    if is_block(el.value().name()) {
        return el;
    }
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| is_block(a.value().name()))
        .unwrap_or(el)
}

/// Collect list items from the siblings following the marker block.
///
/// Blank paragraphs are skipped. Collection stops at the first `<ul>`/`<ol>`
/// (after taking its items), at the end of a run of Word list paragraphs, or
/// at any other non-empty element.
fn items_after(block: &ElementRef) -> Vec<String> {
    let li_sel = Selector::parse("li").expect("valid selector");
    let mut items = Vec::new();

    for sibling in block.next_siblings().filter_map(ElementRef::wrap) {
        let name = sibling.value().name();

        if name == "ul" || name == "ol" {
            if items.is_empty() {
                items.extend(
                    sibling
                        .select(&li_sel)
                        .map(|li| strip_bullet(&element_text(&li)))
                        .filter(|t| !t.is_empty()),
                );
            }
            break;
        }

        if is_list_paragraph(&sibling) {
            let item = strip_bullet(&element_text(&sibling));
            if !item.is_empty() {
                items.push(item);
            }
            continue;
        }

        let text = element_text(&sibling);
        if text.is_empty() && heading_level(name).is_none() {
            continue;
        }
        break;
    }

    items
}
