//! Component fragments: each is rendered from its own template into a single
//! HTML value that the page template then receives as one field.

use pageforge_extract::{FaqEntry, KeyValueTable, ProsCons, Rating};

use crate::escape;
use crate::store::{Component, TemplateSet};
use crate::template::{FieldMap, render};

/// Ratings on a 100-point scale are drawn with this many stars.
const MAX_STARS: u32 = 10;

const ITEM_INDENT: &str = "\n            ";

/// One filled star per whole point and empty stars up to the scale.
pub fn stars_html(rating: &Rating) -> String {
    let (value, scale) = if rating.scale > MAX_STARS {
        (rating.fraction() * f64::from(MAX_STARS), MAX_STARS)
    } else {
        (rating.value, rating.scale)
    };
    let filled = (value.floor().max(0.0) as u32).min(scale);

    let mut html = String::new();
    for _ in 0..filled {
        html.push_str(r#"<span class="star" aria-hidden="true">★</span>"#);
    }
    for _ in filled..scale {
        html.push_str(r#"<span class="star empty" aria-hidden="true">☆</span>"#);
    }
    html
}

pub fn rating_block(templates: &TemplateSet, rating: &Rating) -> String {
    let fields = FieldMap::from([
        ("rating_stars".into(), stars_html(rating)),
        ("rating_value".into(), rating.to_string()),
        (
            "rating_label".into(),
            format!("Rated {} out of {}", rating.value, rating.scale),
        ),
    ]);
    render(templates.component(Component::RatingBlock), &fields)
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape(item)))
        .collect::<Vec<_>>()
        .join(ITEM_INDENT)
}

pub fn pros_cons(templates: &TemplateSet, lists: &ProsCons) -> String {
    let fields = FieldMap::from([
        ("pros_items".into(), list_items(&lists.pros)),
        ("cons_items".into(), list_items(&lists.cons)),
    ]);
    render(templates.component(Component::ProsCons), &fields)
}

/// The two-column quick-facts table. Values that were bold in the source or
/// mention "free" get the `highlight` class.
pub fn quick_facts(templates: &TemplateSet, table: &KeyValueTable, caption: &str) -> String {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let class = if row.highlight { r#" class="highlight""# } else { "" };
            format!(
                "        <tr>\n            <td>{}</td>\n            <td{class}>{}</td>\n        </tr>",
                escape(&row.label),
                escape(&row.value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let fields = FieldMap::from([
        ("table_caption".into(), escape(caption)),
        ("col1_header".into(), escape(&table.header.0)),
        ("col2_header".into(), escape(&table.header.1)),
        ("table_rows".into(), rows),
    ]);
    render(templates.component(Component::QuickFacts), &fields)
}

/// Call-to-action button linking to the platform's affiliate URL.
///
/// `note` is inserted as-is; it comes from configuration and may hold markup.
pub fn cta_button(templates: &TemplateSet, url: &str, platform_name: &str, note: &str) -> String {
    let name = escape(platform_name);
    let fields = FieldMap::from([
        ("cta_url".into(), escape(url)),
        ("cta_text".into(), format!("Visit {name}")),
        (
            "aria_label".into(),
            format!("Visit {name} website (opens in new window)"),
        ),
        ("cta_note".into(), note.to_string()),
    ]);
    render(templates.component(Component::CtaButton), &fields)
}

pub fn faq_accordion(templates: &TemplateSet, faqs: &[FaqEntry]) -> String {
    let items = faqs
        .iter()
        .map(|faq| {
            format!(
                "        <details class=\"faq-item\">\n            <summary>{}</summary>\n            <p>{}</p>\n        </details>",
                escape(&faq.question),
                escape(&faq.answer)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let fields = FieldMap::from([("faq_items".into(), items)]);
    render(templates.component(Component::FaqAccordion), &fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageforge_extract::FactRow;
    use pageforge_shared::DocumentType;

    fn templates() -> TemplateSet {
        TemplateSet::builtin(DocumentType::CasinoReview)
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn stars_for_ten_point_rating() {
        let html = stars_html(&Rating {
            value: 6.9,
            scale: 10,
        });
        assert_eq!(count(&html, "★"), 6);
        assert_eq!(count(&html, "☆"), 4);
    }

    #[test]
    fn stars_for_five_and_hundred_point_ratings() {
        let html = stars_html(&Rating { value: 4.0, scale: 5 });
        assert_eq!((count(&html, "★"), count(&html, "☆")), (4, 1));

        let html = stars_html(&Rating {
            value: 85.0,
            scale: 100,
        });
        assert_eq!((count(&html, "★"), count(&html, "☆")), (8, 2));
    }

    #[test]
    fn rating_block_shows_value() {
        let html = rating_block(&templates(), &Rating { value: 6.9, scale: 10 });
        assert!(html.contains("6.9/10"));
        assert!(html.contains("Rated 6.9 out of 10"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn pros_cons_items_are_escaped() {
        let html = pros_cons(
            &templates(),
            &ProsCons {
                pros: vec!["Fast <24h> payouts".into(), "Big library".into()],
                cons: vec![],
            },
        );
        assert!(html.contains("<li>Fast &lt;24h&gt; payouts</li>"));
        assert!(html.contains("<li>Big library</li>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn quick_facts_rows_and_highlight() {
        let table = KeyValueTable {
            header: ("Feature".into(), "Value".into()),
            rows: vec![
                FactRow {
                    label: "Min Deposit".into(),
                    value: "£10".into(),
                    highlight: false,
                },
                FactRow {
                    label: "Welcome Bonus".into(),
                    value: "50 Free Spins".into(),
                    highlight: true,
                },
            ],
        };
        let html = quick_facts(&templates(), &table, "Quick Facts");
        assert!(html.contains("<caption>Quick Facts</caption>"));
        assert!(html.contains(">Feature</th>"));
        assert!(html.contains("<td>Min Deposit</td>"));
        assert!(html.contains("<td>£10</td>"));
        assert!(html.contains(r#"<td class="highlight">50 Free Spins</td>"#));
        assert_eq!(count(&html, "<tr>"), 3);
    }

    #[test]
    fn cta_button_fills_link_and_note() {
        let html = cta_button(
            &templates(),
            "https://example.com/go?a=1&b=2",
            "888 Casino",
            "18+ Only • T&amp;Cs Apply",
        );
        assert!(html.contains(r#"href="https://example.com/go?a=1&amp;b=2""#));
        assert!(html.contains(">Visit 888 Casino</a>"));
        assert!(html.contains("Visit 888 Casino website (opens in new window)"));
        assert!(html.contains("T&amp;Cs Apply"));
    }

    #[test]
    fn faq_items_rendered_as_details() {
        let html = faq_accordion(
            &templates(),
            &[FaqEntry {
                question: "Is it legit?".into(),
                answer: "Yes & licensed.".into(),
            }],
        );
        assert!(html.contains("<summary>Is it legit?</summary>"));
        assert!(html.contains("<p>Yes &amp; licensed.</p>"));
    }
}
