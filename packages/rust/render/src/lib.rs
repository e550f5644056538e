//! Template rendering for pageforge.
//!
//! Rendering is two-level: component fragments (pros/cons grid, quick-facts
//! table, CTA button, FAQ accordion, rating block) are rendered from their own
//! templates first, then substituted as single values into the page template.

pub mod components;
pub mod page;
pub mod store;
pub mod template;

pub use components::stars_html;
pub use page::{PageInput, build_fields, current_year, render_page};
pub use store::{Component, TemplateSet, TemplateStore};
pub use template::{FieldMap, placeholders, render};

/// Escape extracted text for use in element content or a double-quoted attribute.
pub(crate) fn escape(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}
