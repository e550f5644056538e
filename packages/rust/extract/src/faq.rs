//! FAQ extraction: question/answer pairs under a "FAQ" heading.

use scraper::{ElementRef, Html, Selector};

use crate::text::{element_text, heading_level};

/// One question and its answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

fn is_faq_heading(text: &str) -> bool {
    let lower = text.to_lowercase();
    crate::detect::find_word(&lower, "faq").is_some()
        || crate::detect::find_word(&lower, "faqs").is_some()
        || lower.contains("frequently asked questions")
}

/// Extract FAQ entries following the first FAQ heading.
///
/// Questions are sub-headings or paragraphs ending in `?`; everything up to the
/// next question is the answer. Collection stops at a heading at the FAQ
/// heading's level or above. Questions without an answer are dropped.
pub fn extract_faqs(doc: &Html) -> Vec<FaqEntry> {
    let sel = Selector::parse("h1, h2, h3, h4").expect("valid selector");

    let Some(faq_heading) = doc.select(&sel).find(|h| is_faq_heading(&element_text(h))) else {
        return Vec::new();
    };
    let faq_level = heading_level(faq_heading.value().name()).unwrap_or(2);

    let mut entries = Vec::new();
    let mut current: Option<FaqEntry> = None;

    for sibling in faq_heading.next_siblings().filter_map(ElementRef::wrap) {
        let name = sibling.value().name();
        let text = element_text(&sibling);
        let level = heading_level(name);

        if level.is_some_and(|l| l <= faq_level) {
            break;
        }
        if text.is_empty() {
            continue;
        }

        if level.is_some() || (name == "p" && text.ends_with('?')) {
            entries.extend(current.take().filter(|e| !e.answer.is_empty()));
            current = Some(FaqEntry {
                question: text,
                answer: String::new(),
            });
        } else if let Some(entry) = current.as_mut() {
            if !entry.answer.is_empty() {
                entry.answer.push(' ');
            }
            entry.answer.push_str(&text);
        }
    }
    entries.extend(current.filter(|e| !e.answer.is_empty()));

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_questions() {
        let doc = Html::parse_document(
            r#"<body>
            <h2>888 Casino FAQ</h2>
            <h3>Is 888 Casino legit?</h3>
            <p>Yes, it is licensed in the UK.</p>
            <p>It has operated since 1997.</p>
            <h3>How fast are withdrawals?</h3>
            <p>Usually within 24 hours.</p>
            <h2>Final Verdict</h2>
            <h3>Not a question</h3><p>Ignored.</p>
            </body>"#,
        );
        let faqs = extract_faqs(&doc);
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].question, "Is 888 Casino legit?");
        assert_eq!(
            faqs[0].answer,
            "Yes, it is licensed in the UK. It has operated since 1997."
        );
        assert_eq!(faqs[1].answer, "Usually within 24 hours.");
    }

    #[test]
    fn bold_paragraph_questions() {
        let doc = Html::parse_document(
            r#"<body>
            <h2>Frequently Asked Questions</h2>
            <p><b>Can I play on mobile?</b></p>
            <p>There is an app for iOS and Android.</p>
            <p><b>Is there a no-deposit bonus?</b></p>
            </body>"#,
        );
        let faqs = extract_faqs(&doc);
        assert_eq!(faqs.len(), 1, "unanswered question dropped");
        assert_eq!(faqs[0].question, "Can I play on mobile?");
    }

    #[test]
    fn no_faq_heading() {
        let doc = Html::parse_document("<body><h2>Faqir's Casino</h2><p>Hello?</p></body>");
        assert!(extract_faqs(&doc).is_empty());
    }
}
