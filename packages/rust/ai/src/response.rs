//! Messages API response decoding and HTML extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::DelegateError;

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// All text blocks, concatenated in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect()
    }
}

/// Pull the HTML document out of the model's reply.
///
/// A `<!DOCTYPE html> ... </html>` span is returned alone, dropping any prose
/// around it. Otherwise the whole reply is returned, provided it contains at
/// least one HTML element.
pub fn extract_html(reply: &str) -> Result<String, DelegateError> {
    static DOCUMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)<!DOCTYPE html>.*</html>").expect("valid regex"));
    static ELEMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[A-Za-z][A-Za-z0-9]*[\s/>]").expect("valid regex"));

    if let Some(m) = DOCUMENT_RE.find(reply) {
        return Ok(m.as_str().to_string());
    }

    let reply = reply.trim();
    if reply.is_empty() {
        return Err(DelegateError::MalformedResponse("empty reply".into()));
    }
    if !ELEMENT_RE.is_match(reply) {
        return Err(DelegateError::MalformedResponse(
            "reply contains no HTML".into(),
        ));
    }
    Ok(reply.to_string())
}
