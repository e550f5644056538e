//! `{{placeholder}}` substitution.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Placeholder name → replacement value (plain text or a pre-rendered fragment).
pub type FieldMap = BTreeMap<String, String>;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid regex")
});

/// Anything that still looks like a token after substitution.
static LEFTOVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("valid regex"));

/// An opening delimiter with no matching close.
static STRAY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{+").expect("valid regex"));

/// Replace every `{{name}}` in `template` with its field value.
///
/// Substitution is a single pass: values are inserted verbatim and never
/// re-scanned, so a value cannot pull in other fields. Names missing from
/// `fields` become the empty string. The sweep afterwards drops surviving
/// tokens (malformed names, tokens inside values) until none are left, then
/// removes any unmatched `{{`, so the output never contains one.
pub fn render(template: &str, fields: &FieldMap) -> String {
    let mut out = PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            fields.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned();

    // Removing an inner token can join the braces around it into a new one.
    while LEFTOVER_RE.is_match(&out) {
        out = LEFTOVER_RE.replace_all(&out, "").into_owned();
    }

    STRAY_OPEN_RE.replace_all(&out, "").into_owned()
}

/// Names of every placeholder the template declares.
pub fn placeholders(template: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}
