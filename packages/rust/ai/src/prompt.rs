//! Prompt construction for the completion request.

use std::collections::BTreeMap;

use pageforge_shared::{DocumentType, truncate_chars};

/// One conversion handed to the model.
#[derive(Debug, Clone)]
pub struct DelegateRequest<'a> {
    /// Raw Word-exported HTML.
    pub html: &'a str,
    pub document_type: DocumentType,
    /// Caller-supplied platform key; `None` asks the model to detect it.
    pub platform: Option<&'a str>,
    /// Page template text for `document_type`.
    pub template: &'a str,
    /// Configured platform keys.
    pub platforms: Vec<&'a str>,
    pub affiliate_links: &'a BTreeMap<String, String>,
}

/// How much of the document and template goes into the prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    pub input_chars: usize,
    pub template_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            input_chars: 5000,
            template_chars: 3000,
        }
    }
}

/// Build the single user message sent to the model.
pub fn build_prompt(request: &DelegateRequest<'_>, limits: PromptLimits) -> String {
    let platforms = serde_json::to_string(&request.platforms).unwrap_or_else(|_| "[]".into());
    let links =
        serde_json::to_string_pretty(request.affiliate_links).unwrap_or_else(|_| "{}".into());
    let platform = request.platform.unwrap_or("auto-detect");

    format!(
        "Convert the Word-exported HTML below into a finished {doc_type} page using the template.\n\
         \n\
         INPUT HTML:\n\
         {input}\n\
         \n\
         PAGE TEMPLATE:\n\
         {template}\n\
         \n\
         KNOWN PLATFORMS:\n\
         {platforms}\n\
         \n\
         AFFILIATE LINKS:\n\
         {links}\n\
         \n\
         INSTRUCTIONS:\n\
         1. Take the headings, paragraphs, tables and lists from the input.\n\
         2. Platform under review: {platform}.\n\
         3. Put the content into the template's {{{{placeholder}}}} slots and fill every slot.\n\
         4. Format pros and cons as lists and tables as two columns.\n\
         5. Use the affiliate link configured for the platform.\n\
         6. Reply with the complete HTML document only, starting with <!DOCTYPE html>.\n",
        doc_type = request.document_type,
        input = truncate_chars(request.html, limits.input_chars),
        template = truncate_chars(request.template, limits.template_chars),
    )
}
