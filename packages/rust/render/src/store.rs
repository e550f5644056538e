//! Template loading.
//!
//! Page and component templates are read from disk on every conversion so
//! edits take effect without a restart. A file that does not exist falls back
//! to the copy compiled into the binary and is reported as a warning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pageforge_shared::{ConversionWarning, DocumentType, PageForgeError, Result};
use tracing::{debug, instrument, warn};

/// Reusable fragments rendered before the page template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Component {
    ProsCons,
    QuickFacts,
    CtaButton,
    FaqAccordion,
    RatingBlock,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Self::ProsCons,
        Self::QuickFacts,
        Self::CtaButton,
        Self::FaqAccordion,
        Self::RatingBlock,
    ];

    /// File name under `<templates_dir>/components/`.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::ProsCons => "pros-cons.html",
            Self::QuickFacts => "platform-table-2col.html",
            Self::CtaButton => "cta-button.html",
            Self::FaqAccordion => "faq-accordion.html",
            Self::RatingBlock => "rating-block.html",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            Self::ProsCons => include_str!("../../../../templates/components/pros-cons.html"),
            Self::QuickFacts => {
                include_str!("../../../../templates/components/platform-table-2col.html")
            }
            Self::CtaButton => include_str!("../../../../templates/components/cta-button.html"),
            Self::FaqAccordion => {
                include_str!("../../../../templates/components/faq-accordion.html")
            }
            Self::RatingBlock => include_str!("../../../../templates/components/rating-block.html"),
        }
    }
}

fn builtin_page(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::CasinoReview => include_str!("../../../../templates/casino-review.html"),
        DocumentType::SportsbookReview => {
            include_str!("../../../../templates/sportsbook-review.html")
        }
        DocumentType::CryptoComparison => {
            include_str!("../../../../templates/crypto-comparison.html")
        }
    }
}

/// Everything needed to render one page.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub page: String,
    components: BTreeMap<Component, String>,
    /// One `BuiltinTemplate` warning per file that fell back.
    pub warnings: Vec<ConversionWarning>,
}

impl TemplateSet {
    /// The compiled-in templates for `doc_type`, without touching the disk.
    pub fn builtin(doc_type: DocumentType) -> Self {
        Self {
            page: builtin_page(doc_type).to_string(),
            components: Component::ALL
                .into_iter()
                .map(|c| (c, c.builtin().to_string()))
                .collect(),
            warnings: Vec::new(),
        }
    }

    pub fn component(&self, component: Component) -> &str {
        self.components
            .get(&component)
            .map(String::as_str)
            .unwrap_or_else(|| component.builtin())
    }
}

/// Reads templates from a directory laid out as `<type>.html` plus
/// `components/<name>.html`.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the page template for `doc_type` and every component.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn load(&self, doc_type: DocumentType) -> Result<TemplateSet> {
        let mut warnings = Vec::new();

        let page_name = doc_type.template_file();
        let page = read_or_builtin(
            &self.dir.join(&page_name),
            &page_name,
            builtin_page(doc_type),
            &mut warnings,
        )?;

        let mut components = BTreeMap::new();
        for component in Component::ALL {
            let name = format!("components/{}", component.file_name());
            let text = read_or_builtin(
                &self.dir.join(&name),
                &name,
                component.builtin(),
                &mut warnings,
            )?;
            components.insert(component, text);
        }

        debug!(
            template = %page_name,
            builtin = warnings.len(),
            "templates loaded"
        );

        Ok(TemplateSet {
            page,
            components,
            warnings,
        })
    }
}

fn read_or_builtin(
    path: &Path,
    name: &str,
    builtin: &str,
    warnings: &mut Vec<ConversionWarning>,
) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "template not found, using built-in copy");
            warnings.push(ConversionWarning::BuiltinTemplate {
                name: name.to_string(),
            });
            Ok(builtin.to_string())
        }
        Err(e) => Err(PageForgeError::Template(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_falls_back_to_builtins() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(tmp.path().join("nope"));
        let set = store.load(DocumentType::SportsbookReview).unwrap();

        assert!(set.page.contains("sportsbook-review"));
        assert_eq!(set.warnings.len(), 1 + Component::ALL.len());
        assert_eq!(
            set.warnings[0],
            ConversionWarning::BuiltinTemplate {
                name: "sportsbook-review.html".into()
            }
        );
        assert!(set.component(Component::ProsCons).contains("{{pros_items}}"));
    }

    #[test]
    fn files_on_disk_override_builtins() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("components")).unwrap();
        std::fs::write(tmp.path().join("casino-review.html"), "<h1>{{title}}</h1>").unwrap();
        std::fs::write(
            tmp.path().join("components/cta-button.html"),
            "<a href=\"{{cta_url}}\">{{cta_text}}</a>",
        )
        .unwrap();

        let set = TemplateStore::new(tmp.path())
            .load(DocumentType::CasinoReview)
            .unwrap();

        assert_eq!(set.page, "<h1>{{title}}</h1>");
        assert_eq!(
            set.component(Component::CtaButton),
            "<a href=\"{{cta_url}}\">{{cta_text}}</a>"
        );
        assert_eq!(set.warnings.len(), Component::ALL.len() - 1);
    }

    #[test]
    fn repository_templates_match_builtins() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../templates");
        for doc_type in DocumentType::ALL {
            let set = TemplateStore::new(&dir).load(doc_type).unwrap();
            assert!(set.warnings.is_empty(), "{doc_type}: {:?}", set.warnings);
            assert_eq!(set.page, TemplateSet::builtin(doc_type).page);
        }
    }
}
