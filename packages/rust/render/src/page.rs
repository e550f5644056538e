//! Page assembly: flatten an extraction plus configuration lookups into the
//! field map a page template is rendered with.

use chrono::Datelike;
use pageforge_extract::{Detection, Extraction, Rating, Topic};
use pageforge_shared::{
    ConfigStore, ContentConfig, DocumentType, PlatformMetadata, truncate_chars,
};
use tracing::{debug, instrument};

use crate::components;
use crate::escape;
use crate::store::TemplateSet;
use crate::template::{FieldMap, render};

/// Maximum length of the meta description, in characters.
pub const META_DESCRIPTION_CHARS: usize = 155;

const DEFAULT_PLATFORM_NAME: &str = "Platform";
const VERDICT_PENDING: &str = "<!-- Quick verdict coming soon -->";

/// Everything page assembly reads. Nothing here is mutated.
#[derive(Debug, Clone, Copy)]
pub struct PageInput<'a> {
    pub extraction: &'a Extraction,
    pub detection: &'a Detection,
    pub store: &'a ConfigStore,
    pub content: &'a ContentConfig,
    pub templates: &'a TemplateSet,
    pub year: i32,
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Build the complete field map for a page.
///
/// Every field a built-in page template declares is present, with a fallback
/// where nothing was extracted.
#[instrument(skip_all, fields(platform = ?input.detection.platform))]
pub fn build_fields(input: &PageInput<'_>) -> FieldMap {
    let PageInput {
        extraction,
        detection,
        store,
        content,
        templates,
        year,
    } = *input;

    let key = detection.platform.as_deref();
    let metadata = key.and_then(|k| store.platform(k));
    let platform_name = metadata
        .map(|m| m.name.as_str())
        .unwrap_or(DEFAULT_PLATFORM_NAME);
    let coming_soon = format!("<p>{}</p>", content.coming_soon);

    let mut fields = FieldMap::new();
    let mut set = |name: &str, value: String| {
        fields.insert(name.to_string(), value);
    };

    // ---- Head ----

    let title = extraction
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{platform_name} Review"));
    set("title", escape(&title));

    let first = extraction.paragraphs.first().map(String::as_str).unwrap_or("");
    set("meta_description", escape(truncate_chars(first, META_DESCRIPTION_CHARS)));
    set("year", year.to_string());

    // ---- Platform ----

    set("platform_name", escape(platform_name));
    set("platform_key", escape(key.unwrap_or("")));
    set(
        "platform_logo",
        metadata
            .and_then(|m| m.logo.as_deref())
            .map(|logo| escape(&store.images.image_url(logo)))
            .unwrap_or_default(),
    );
    if let Some(meta) = metadata {
        for (name, value) in metadata_fields(meta) {
            set(&format!("platform_{name}"), escape(&value));
        }
    }

    // ---- Intro ----

    for (i, name) in ["intro_paragraph_1", "intro_paragraph_2"].into_iter().enumerate() {
        let text = extraction.paragraphs.get(i).map(String::as_str).unwrap_or("");
        set(name, escape(text));
    }

    // ---- Components ----

    set(
        "pros_cons_grid",
        if extraction.pros_cons.is_empty() {
            coming_soon.clone()
        } else {
            components::pros_cons(templates, &extraction.pros_cons)
        },
    );

    set(
        "quick_facts_table",
        match extraction.quick_facts() {
            Some(table) => {
                components::quick_facts(templates, &table, &content.quick_facts_caption)
            }
            None => coming_soon.clone(),
        },
    );

    set(
        "cta_button",
        key.and_then(|k| store.affiliate_link(k))
            .map(|url| {
                let name = key.map(|k| store.display_name(k)).unwrap_or_default();
                components::cta_button(templates, url, &name, &content.cta_note)
            })
            .unwrap_or_default(),
    );

    let rating = extraction.rating.or_else(|| metadata.and_then(metadata_rating));
    set(
        "rating_block",
        rating
            .map(|r| components::rating_block(templates, &r))
            .unwrap_or_default(),
    );
    set(
        "rating_value",
        rating.map(|r| r.to_string()).unwrap_or_default(),
    );

    set(
        "faq_section",
        if extraction.faqs.is_empty() {
            String::new()
        } else {
            components::faq_accordion(templates, &extraction.faqs)
        },
    );

    set("disclaimer", disclaimer(store, detection.document_type));

    // ---- Topic sections ----

    for topic in Topic::ALL {
        let value = match extraction.section(topic) {
            Some(section) => section.html.clone(),
            None if topic == Topic::Verdict => VERDICT_PENDING.to_string(),
            None => coming_soon.clone(),
        };
        set(topic.placeholder(), value);
    }

    debug!(fields = fields.len(), "page fields built");
    fields
}

/// Build the fields and render the page template.
pub fn render_page(input: &PageInput<'_>) -> String {
    render(&input.templates.page, &build_fields(input))
}

/// Typed metadata plus scalar extra keys, as `(name, display value)` pairs.
fn metadata_fields(meta: &PlatformMetadata) -> Vec<(String, String)> {
    let typed = [
        ("rating", meta.rating.map(|r| r.to_string())),
        ("stars_filled", meta.stars_filled.map(|s| s.to_string())),
        ("stars_total", meta.stars_total.map(|s| s.to_string())),
        ("min_deposit", meta.min_deposit.clone()),
        ("welcome_bonus", meta.welcome_bonus.clone()),
        ("established", meta.established.clone()),
        ("license", meta.license.clone()),
    ];

    let extra = meta.extra.iter().filter_map(|(name, value)| {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        Some((name.clone(), text))
    });

    typed
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .chain(extra)
        .collect()
}

/// The configured editorial rating (10-point scale), when the document itself
/// carries none.
fn metadata_rating(meta: &PlatformMetadata) -> Option<Rating> {
    let value = meta.rating?;
    (0.0..=10.0)
        .contains(&value)
        .then_some(Rating { value, scale: 10 })
}

/// Crypto pages use `crypto_warning` when configured; everything else gets the
/// gambling warning.
fn disclaimer(store: &ConfigStore, doc_type: DocumentType) -> String {
    let disclaimers = &store.images.disclaimers;
    match doc_type {
        DocumentType::CryptoComparison => disclaimers
            .extra
            .get("crypto_warning")
            .cloned()
            .unwrap_or_else(|| store.disclaimer().to_string()),
        _ => store.disclaimer().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholders;
    use pageforge_extract::{Hints, extract, resolve};

    const DOC: &str = r#"<html><body>
        <h1>888 Casino Review 2024</h1>
        <p class=MsoNormal>888 Casino is one of the oldest names in online gambling.</p>
        <p class=MsoNormal>Our rating: 6.9/10 after testing every section.</p>
        <table>
          <tr><td><b>Feature</b></td><td><b>Value</b></td></tr>
          <tr><td>Min Deposit</td><td>£10</td></tr>
        </table>
        <h2>Bonuses</h2>
        <p>New players get 100% up to £100.</p>
    </body></html>"#;

    fn store() -> ConfigStore {
        let mut store = ConfigStore::default();
        store.platforms.insert(
            "888casino".into(),
            PlatformMetadata {
                name: "888 Casino".into(),
                logo: Some("888casino.png".into()),
                min_deposit: Some("£10".into()),
                extra: [("payout_speed".to_string(), serde_json::json!("24h"))]
                    .into_iter()
                    .collect(),
                ..Default::default()
            },
        );
        store
            .affiliate_links
            .insert("888casino".into(), "https://go.example.com/888".into());
        store.images.base_url = "https://cdn.example.com".into();
        store.images.path = "/logos/".into();
        store.images.disclaimers.gambling_warning = "Gamble responsibly.".into();
        store
    }

    fn fields_for(html: &str, store: &ConfigStore) -> FieldMap {
        let extraction = extract(html);
        let detection = resolve(&Hints::default(), &extraction.text, &extraction.headings, store);
        let templates = TemplateSet::builtin(detection.document_type);
        let content = ContentConfig::default();
        build_fields(&PageInput {
            extraction: &extraction,
            detection: &detection,
            store,
            content: &content,
            templates: &templates,
            year: 2024,
        })
    }

    #[test]
    fn fields_from_casino_document() {
        let store = store();
        let fields = fields_for(DOC, &store);

        assert_eq!(fields["title"], "888 Casino Review 2024");
        assert_eq!(fields["platform_name"], "888 Casino");
        assert_eq!(fields["platform_key"], "888casino");
        assert_eq!(fields["platform_logo"], "https://cdn.example.com/logos/888casino.png");
        assert_eq!(fields["platform_min_deposit"], "£10");
        assert_eq!(fields["platform_payout_speed"], "24h");
        assert_eq!(fields["year"], "2024");
        assert_eq!(fields["rating_value"], "6.9/10");
        assert!(fields["cta_button"].contains("https://go.example.com/888"));
        assert!(fields["quick_facts_table"].contains("<td>Min Deposit</td>"));
        assert!(fields["bonuses_content"].contains("100% up to £100"));
        assert_eq!(fields["games_content"], "<p>Content coming soon...</p>");
        assert_eq!(fields["quick_verdict_section"], VERDICT_PENDING);
        assert_eq!(fields["pros_cons_grid"], "<p>Content coming soon...</p>");
        assert_eq!(fields["faq_section"], "");
        assert_eq!(fields["disclaimer"], "Gamble responsibly.");
    }

    #[test]
    fn every_page_placeholder_is_filled() {
        let store = store();
        let fields = fields_for(DOC, &store);
        for doc_type in DocumentType::ALL {
            let page = TemplateSet::builtin(doc_type).page;
            for name in placeholders(&page) {
                assert!(fields.contains_key(&name), "{doc_type}: missing {name}");
            }
        }
    }

    #[test]
    fn defaults_without_platform() {
        let fields = fields_for(
            "<body><p>Just some unrelated text here.</p></body>",
            &ConfigStore::default(),
        );
        assert_eq!(fields["title"], "Platform Review");
        assert_eq!(fields["platform_name"], "Platform");
        assert_eq!(fields["platform_logo"], "");
        assert_eq!(fields["cta_button"], "");
        assert_eq!(fields["rating_block"], "");
        assert_eq!(fields["quick_facts_table"], "<p>Content coming soon...</p>");
    }

    #[test]
    fn metadata_rating_used_when_text_has_none() {
        let mut store = store();
        if let Some(meta) = store.platforms.get_mut("888casino") {
            meta.rating = Some(8.5);
        }
        let fields = fields_for("<body><h1>888 Casino Review</h1></body>", &store);
        assert_eq!(fields["rating_value"], "8.5/10");
        assert_eq!(fields["platform_rating"], "8.5");
    }

    #[test]
    fn crypto_pages_use_crypto_disclaimer() {
        let mut store = store();
        store
            .images
            .disclaimers
            .extra
            .insert("crypto_warning".into(), "Capital at risk.".into());

        let extraction = extract(
            "<body><h1>Best Crypto Exchanges</h1><p>Compare crypto exchange fees.</p></body>",
        );
        let detection = resolve(&Hints::default(), &extraction.text, &extraction.headings, &store);
        assert_eq!(detection.document_type, DocumentType::CryptoComparison);

        let templates = TemplateSet::builtin(detection.document_type);
        let content = ContentConfig::default();
        let fields = build_fields(&PageInput {
            extraction: &extraction,
            detection: &detection,
            store: &store,
            content: &content,
            templates: &templates,
            year: 2024,
        });
        assert_eq!(fields["disclaimer"], "Capital at risk.");
    }

    #[test]
    fn extracted_text_is_escaped() {
        let fields = fields_for(
            "<body><h1>Bet &amp; Win &lt;Review&gt;</h1><p>A \"quoted\" intro paragraph.</p></body>",
            &ConfigStore::default(),
        );
        assert_eq!(fields["title"], "Bet &amp; Win &lt;Review&gt;");
        assert_eq!(fields["meta_description"], "A &quot;quoted&quot; intro paragraph.");
    }

    #[test]
    fn meta_description_is_truncated() {
        let long = format!("<body><p>{}</p></body>", "é".repeat(200));
        let fields = fields_for(&long, &ConfigStore::default());
        assert_eq!(fields["meta_description"].chars().count(), META_DESCRIPTION_CHARS);
        assert_eq!(fields["intro_paragraph_1"].chars().count(), 200);
    }
}
