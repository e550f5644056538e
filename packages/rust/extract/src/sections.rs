//! Topic sections: the body of each `<h2>` section that matches a known
//! review topic (bonuses, games, payments, ...), re-emitted as clean HTML.

use scraper::{ElementRef, Html, Selector};

use crate::detect::find_word;
use crate::lists::marker_kind;
use crate::text::{element_text, escape, heading_level, is_list_paragraph, strip_bullet};

/// Review topics a page template has a slot for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Bonuses,
    Games,
    PaymentMethods,
    Mobile,
    CustomerSupport,
    Security,
    Verdict,
}

impl Topic {
    /// Classification order. The first topic with a matching keyword wins.
    pub const ALL: [Topic; 7] = [
        Self::Verdict,
        Self::Bonuses,
        Self::PaymentMethods,
        Self::Mobile,
        Self::CustomerSupport,
        Self::Security,
        Self::Games,
    ];

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Bonuses => &[
                "bonus",
                "bonuses",
                "promotion",
                "promotions",
                "promo",
                "promos",
                "welcome offer",
            ],
            Self::Games => &["games", "game", "slots", "live casino", "markets", "odds", "sports"],
            Self::PaymentMethods => &[
                "payment",
                "payments",
                "deposit",
                "deposits",
                "withdrawal",
                "withdrawals",
                "banking",
            ],
            Self::Mobile => &["mobile", "app", "apps"],
            Self::CustomerSupport => &["support", "customer service", "contact"],
            Self::Security => &[
                "security",
                "safety",
                "safe",
                "license",
                "licence",
                "licensing",
                "regulation",
                "fair",
            ],
            Self::Verdict => &["verdict", "conclusion", "final thoughts", "summary"],
        }
    }

    /// Placeholder the section body fills.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Bonuses => "bonuses_content",
            Self::Games => "games_content",
            Self::PaymentMethods => "payment_methods_content",
            Self::Mobile => "mobile_content",
            Self::CustomerSupport => "customer_support_content",
            Self::Security => "security_content",
            Self::Verdict => "quick_verdict_section",
        }
    }

    /// Classify a heading by keyword.
    pub fn classify(heading: &str) -> Option<Topic> {
        let lower = heading.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.keywords().iter().any(|k| find_word(&lower, k).is_some()))
    }
}

/// A classified section with its body as an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSection {
    pub topic: Topic,
    pub heading: String,
    pub html: String,
}

/// Extract the first section for each topic. Sections with no body are skipped.
pub fn extract_sections(doc: &Html) -> Vec<TopicSection> {
    let sel = Selector::parse("h2").expect("valid selector");
    let mut sections: Vec<TopicSection> = Vec::new();

    for h2 in doc.select(&sel) {
        let heading = element_text(&h2);
        let Some(topic) = Topic::classify(&heading) else {
            continue;
        };
        if sections.iter().any(|s| s.topic == topic) {
            continue;
        }

        let html = section_body(&h2);
        if !html.is_empty() {
            sections.push(TopicSection {
                topic,
                heading,
                html,
            });
        }
    }

    sections
}

/// Render the blocks between `h2` and the next `h1`/`h2` as plain HTML.
fn section_body(h2: &ElementRef) -> String {
    let li_sel = Selector::parse("li").expect("valid selector");
    let mut parts: Vec<String> = Vec::new();
    let mut word_list: Vec<String> = Vec::new();

    let flush = |word_list: &mut Vec<String>, parts: &mut Vec<String>| {
        if !word_list.is_empty() {
            parts.push(list_html("ul", word_list.drain(..)));
        }
    };

    for sibling in h2.next_siblings().filter_map(ElementRef::wrap) {
        let name = sibling.value().name();
        if heading_level(name).is_some_and(|l| l <= 2) {
            break;
        }

        if is_list_paragraph(&sibling) {
            let item = strip_bullet(&element_text(&sibling));
            if !item.is_empty() {
                word_list.push(item);
            }
            continue;
        }
        flush(&mut word_list, &mut parts);

        let text = element_text(&sibling);
        if text.is_empty() || marker_kind(&text).is_some() {
            continue;
        }

        match name {
            "ul" | "ol" => {
                let items = sibling
                    .select(&li_sel)
                    .map(|li| strip_bullet(&element_text(&li)))
                    .filter(|t| !t.is_empty());
                parts.push(list_html(name, items));
            }
            "h3" | "h4" | "h5" | "h6" => parts.push(format!("<h3>{}</h3>", escape(&text))),
            "table" => {}
            _ => parts.push(format!("<p>{}</p>", escape(&text))),
        }
    }
    flush(&mut word_list, &mut parts);

    parts.join("\n")
}

fn list_html(tag: &str, items: impl Iterator<Item = String>) -> String {
    let items: String = items.map(|i| format!("<li>{}</li>", escape(&i))).collect();
    format!("<{tag}>{items}</{tag}>")
}
