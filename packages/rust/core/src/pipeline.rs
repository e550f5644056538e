//! End-to-end conversion: raw HTML → extraction → field map → page.
//!
//! [`Converter`] owns the read-only configuration and applies the fallback
//! policy between the AI and rule-based strategies. [`convert_rule_based`] is
//! the rule-based path on its own, with no network access.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pageforge_ai::DelegateRequest;
use pageforge_extract::{Detection, Extraction, Hints, Source, extract, resolve};
use pageforge_render::{PageInput, TemplateSet, TemplateStore, current_year, render_page};
use pageforge_shared::{
    AppConfig, ConfigStore, ContentConfig, ConversionMethod, ConversionWarning, DocumentType,
    PageForgeError, Result,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::strategy::Strategy;

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// One document to convert.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Raw Word-exported HTML.
    pub html: String,
    /// Page type to produce; detected when `None`.
    pub template_type: Option<DocumentType>,
    /// Platform key or display name; detected when `None` or blank.
    pub platform: Option<String>,
}

impl ConversionRequest {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Default::default()
        }
    }

    fn hints(&self) -> Hints {
        Hints {
            document_type: self.template_type,
            platform: self.platform.clone(),
        }
    }
}

/// Counts of what the rule-based extractor found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub headings: usize,
    pub paragraphs: usize,
    pub tables: usize,
    pub pros: usize,
    pub cons: usize,
    pub faqs: usize,
    pub sections: usize,
    /// Rating as written, e.g. `6.9/10`.
    pub rating: Option<String>,
}

impl From<&Extraction> for ExtractionSummary {
    fn from(ex: &Extraction) -> Self {
        Self {
            headings: ex.headings.len(),
            paragraphs: ex.paragraphs.len(),
            tables: ex.tables.len(),
            pros: ex.pros_cons.pros.len(),
            cons: ex.pros_cons.cons.len(),
            faqs: ex.faqs.len(),
            sections: ex.sections.len(),
            rating: ex.rating.map(|r| r.to_string()),
        }
    }
}

/// A converted page and how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub html: String,
    pub method: ConversionMethod,
    pub document_type: DocumentType,
    #[serde(skip)]
    pub type_source: Source,
    /// Platform key, if one was hinted or detected.
    pub platform: Option<String>,
    #[serde(skip)]
    pub platform_source: Source,
    /// Everything that reduced fidelity without stopping the conversion.
    pub warnings: Vec<ConversionWarning>,
    pub summary: ExtractionSummary,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// A converted file and where it was written.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub output_path: PathBuf,
    pub outcome: ConversionOutcome,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting conversion status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the conversion completes.
    fn done(&self, outcome: &ConversionOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &ConversionOutcome) {}
}

// ---------------------------------------------------------------------------
// Rule-based path
// ---------------------------------------------------------------------------

/// Extraction, classification and templates for one document.
struct Prepared {
    extraction: Extraction,
    detection: Detection,
    templates: TemplateSet,
}

fn prepare(
    request: &ConversionRequest,
    store: &ConfigStore,
    templates: &TemplateStore,
) -> Result<Prepared> {
    if request.html.trim().is_empty() {
        return Err(PageForgeError::validation("input document is empty"));
    }

    let extraction = extract(&request.html);
    let detection = resolve(
        &request.hints(),
        &extraction.text,
        &extraction.headings,
        store,
    );
    let templates = templates.load(detection.document_type)?;

    Ok(Prepared {
        extraction,
        detection,
        templates,
    })
}

fn render_rule_based(
    prepared: Prepared,
    store: &ConfigStore,
    content: &ContentConfig,
    mut warnings: Vec<ConversionWarning>,
    start: Instant,
) -> ConversionOutcome {
    let html = render_page(&PageInput {
        extraction: &prepared.extraction,
        detection: &prepared.detection,
        store,
        content,
        templates: &prepared.templates,
        year: current_year(),
    });

    warnings.extend(prepared.detection.warnings);
    warnings.extend(prepared.templates.warnings);

    ConversionOutcome {
        html,
        method: ConversionMethod::RuleBased,
        document_type: prepared.detection.document_type,
        type_source: prepared.detection.type_source,
        platform: prepared.detection.platform,
        platform_source: prepared.detection.platform_source,
        warnings,
        summary: ExtractionSummary::from(&prepared.extraction),
        elapsed: start.elapsed(),
    }
}

/// Convert with the rule-based path only.
///
/// Fails only when the input is empty or a template exists on disk but cannot
/// be read; every extraction step degrades to a default instead.
#[instrument(skip_all, fields(len = request.html.len()))]
pub fn convert_rule_based(
    request: &ConversionRequest,
    store: &ConfigStore,
    templates: &TemplateStore,
    content: &ContentConfig,
) -> Result<ConversionOutcome> {
    let start = Instant::now();
    let prepared = prepare(request, store, templates)?;
    Ok(render_rule_based(prepared, store, content, Vec::new(), start))
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Long-lived conversion service shared by the CLI and the HTTP server.
#[derive(Debug, Clone)]
pub struct Converter {
    store: Arc<ConfigStore>,
    templates: TemplateStore,
    content: ContentConfig,
    output_dir: PathBuf,
    strategy: Strategy,
}

impl Converter {
    /// A rule-based converter over an already loaded store.
    pub fn new(store: Arc<ConfigStore>, templates: TemplateStore, content: ContentConfig) -> Self {
        Self {
            store,
            templates,
            content,
            output_dir: PathBuf::from("output"),
            strategy: Strategy::RuleBased,
        }
    }

    /// Load the configuration store and pick a strategy from app config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = ConfigStore::load(&config.paths.config_dir)?;
        Ok(Self::new(
            Arc::new(store),
            TemplateStore::new(&config.paths.templates_dir),
            config.content.clone(),
        )
        .with_output_dir(&config.paths.output_dir)
        .with_strategy(Strategy::from_settings(&config.ai)))
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Default output path: `<output_dir>/<input-stem>-converted.html`.
    pub fn default_output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.output_dir.join(format!("{stem}-converted.html"))
    }

    /// Convert one document, trying AI first when configured.
    ///
    /// An AI failure of any kind is logged, recorded as an `AiFallback`
    /// warning, and answered by the rule-based path.
    #[instrument(skip_all, fields(method = %self.strategy.method(), len = request.html.len()))]
    pub async fn convert(
        &self,
        request: &ConversionRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<ConversionOutcome> {
        let start = Instant::now();

        progress.phase("Extracting content");
        let prepared = prepare(request, &self.store, &self.templates)?;
        let mut warnings = Vec::new();

        if let Strategy::Ai(client) = &self.strategy {
            progress.phase("Converting with AI");

            let platforms: Vec<&str> = self.store.platforms.keys().map(String::as_str).collect();
            let delegate_request = DelegateRequest {
                html: &request.html,
                document_type: prepared.detection.document_type,
                platform: prepared.detection.platform.as_deref(),
                template: &prepared.templates.page,
                platforms,
                affiliate_links: &self.store.affiliate_links,
            };

            match client.render(&delegate_request).await {
                Ok(html) => {
                    let mut warnings = prepared.detection.warnings.clone();
                    warnings.extend(prepared.templates.warnings.iter().cloned());
                    let outcome = ConversionOutcome {
                        html,
                        method: ConversionMethod::Ai,
                        document_type: prepared.detection.document_type,
                        type_source: prepared.detection.type_source,
                        platform: prepared.detection.platform.clone(),
                        platform_source: prepared.detection.platform_source,
                        warnings,
                        summary: ExtractionSummary::from(&prepared.extraction),
                        elapsed: start.elapsed(),
                    };
                    return Ok(finish(outcome, progress));
                }
                Err(e) => {
                    warn!(error = %e, "AI conversion failed, falling back to rules");
                    warnings.push(ConversionWarning::AiFallback {
                        reason: e.to_string(),
                    });
                }
            }
        }

        progress.phase("Rendering template");
        let outcome = render_rule_based(prepared, &self.store, &self.content, warnings, start);
        Ok(finish(outcome, progress))
    }

    /// Read `input`, convert it, and write the page to `output` (or the
    /// default output path). Non-UTF-8 bytes in the input are replaced.
    #[instrument(skip_all, fields(input = %input.display()))]
    pub async fn convert_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        request: ConversionRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<FileOutcome> {
        progress.phase("Reading input");
        let bytes = std::fs::read(input).map_err(|e| PageForgeError::io(input, e))?;
        let request = ConversionRequest {
            html: String::from_utf8_lossy(&bytes).into_owned(),
            ..request
        };

        let outcome = self.convert(&request, progress).await?;

        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output_path(input));
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PageForgeError::output(parent, e))?;
        }
        std::fs::write(&output_path, &outcome.html)
            .map_err(|e| PageForgeError::output(&output_path, e))?;

        info!(output = %output_path.display(), "page written");

        Ok(FileOutcome {
            output_path,
            outcome,
        })
    }
}

fn finish(outcome: ConversionOutcome, progress: &dyn ProgressReporter) -> ConversionOutcome {
    progress.done(&outcome);

    info!(
        method = %outcome.method,
        document_type = %outcome.document_type,
        type_source = %outcome.type_source,
        platform = outcome.platform.as_deref().unwrap_or("-"),
        platform_source = %outcome.platform_source,
        warnings = outcome.warnings.len(),
        elapsed_ms = outcome.elapsed.as_millis(),
        "conversion complete"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use pageforge_ai::{AiClient, AiConfig, PromptLimits};

    use super::*;

    fn repo_path(rel: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../..").join(rel)
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(repo_path("fixtures/html").join(name)).expect("read fixture")
    }

    fn converter() -> Converter {
        let store = ConfigStore::load(&repo_path("config")).expect("load sample config");
        Converter::new(
            Arc::new(store),
            TemplateStore::new(repo_path("templates")),
            ContentConfig::default(),
        )
    }

    fn ai_strategy(base_url: &str) -> Strategy {
        let config = AiConfig {
            api_key: Some("test-key".into()),
            api_key_env: "ANTHROPIC_API_KEY".into(),
            model: "test-model".into(),
            base_url: base_url.parse().unwrap(),
            max_tokens: 512,
            timeout: Duration::from_secs(5),
            limits: PromptLimits::default(),
        };
        Strategy::Ai(AiClient::from_config(&config).unwrap())
    }

    #[tokio::test]
    async fn casino_document_end_to_end() {
        let conv = converter();
        let outcome = conv
            .convert(&ConversionRequest::new(fixture("888-casino.html")), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(outcome.method, ConversionMethod::RuleBased);
        assert_eq!(outcome.document_type, DocumentType::CasinoReview);
        assert_eq!(outcome.type_source, Source::Detected);
        assert_eq!(outcome.platform.as_deref(), Some("888casino"));
        assert_eq!(outcome.platform_source, Source::Detected);
        assert_eq!(outcome.summary.rating.as_deref(), Some("6.9/10"));
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

        let link = conv.store().affiliate_link("888casino").unwrap();
        assert!(outcome.html.contains(link));
        assert!(outcome.html.contains("<td>Min Deposit</td>"));
        assert!(outcome.html.contains("<td>£10</td>"));
        assert!(outcome.html.contains("<title>888 Casino Review 2024</title>"));
        assert!(!outcome.html.contains("{{"));
    }

    #[test]
    fn rule_based_without_markers_renders_fallbacks() {
        let store = ConfigStore::load(&repo_path("config")).unwrap();
        let outcome = convert_rule_based(
            &ConversionRequest::new(fixture("plain.html")),
            &store,
            &TemplateStore::new(repo_path("templates")),
            &ContentConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.summary.pros, 0);
        assert_eq!(outcome.summary.cons, 0);
        assert!(outcome.html.contains("<p>Content coming soon...</p>"));
        assert!(!outcome.html.contains("{{"));
    }

    #[tokio::test]
    async fn unknown_platform_is_a_named_warning() {
        let outcome = converter()
            .convert(
                &ConversionRequest::new(fixture("plain.html")),
                &SilentProgress,
            )
            .await
            .unwrap();

        assert_eq!(outcome.platform, None);
        assert_eq!(outcome.platform_source, Source::Default);
        assert!(outcome.warnings.contains(&ConversionWarning::PlatformUndetected));
    }

    #[tokio::test]
    async fn hints_override_detection() {
        let request = ConversionRequest {
            html: fixture("888-casino.html"),
            template_type: Some(DocumentType::SportsbookReview),
            platform: Some("betway".into()),
        };
        let outcome = converter().convert(&request, &SilentProgress).await.unwrap();
        assert_eq!(outcome.document_type, DocumentType::SportsbookReview);
        assert_eq!(outcome.type_source, Source::Hint);
        assert_eq!(outcome.platform.as_deref(), Some("betway"));
        assert_eq!(outcome.platform_source, Source::Hint);
        assert!(outcome.html.contains("sportsbook-review"));
    }

    #[test]
    fn brace_runs_in_document_text_leave_no_token() {
        let store = ConfigStore::load(&repo_path("config")).unwrap();
        let html = "<html><body><h1>888 Casino Review</h1>\
            <p>Claim with promo {{{{WELCOME}}}} at signup today.</p></body></html>";
        let outcome = convert_rule_based(
            &ConversionRequest::new(html),
            &store,
            &TemplateStore::new(repo_path("templates")),
            &ContentConfig::default(),
        )
        .unwrap();

        assert!(outcome.html.contains("Claim with promo"));
        assert!(!outcome.html.contains("{{"));
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let err = converter()
            .convert(&ConversionRequest::new("  \n"), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PageForgeError::Validation { .. }));
    }

    #[test]
    fn missing_api_key_means_rule_based() {
        let mut config = AppConfig::default();
        config.paths.config_dir = repo_path("config");
        config.paths.templates_dir = repo_path("templates");
        config.ai.api_key_env = "PAGEFORGE_PIPELINE_TEST_UNSET".into();

        let conv = Converter::from_config(&config).unwrap();
        assert_eq!(conv.strategy().method(), ConversionMethod::RuleBased);
    }

    #[tokio::test]
    async fn ai_success_is_tagged_ai() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/messages"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "content": [{ "type": "text", "text": "<!DOCTYPE html><html><body>AI page</body></html>" }]
                }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let conv = converter().with_strategy(ai_strategy(&server.uri()));
        let outcome = conv
            .convert(&ConversionRequest::new(fixture("888-casino.html")), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(outcome.method, ConversionMethod::Ai);
        assert_eq!(outcome.html, "<!DOCTYPE html><html><body>AI page</body></html>");
        assert_eq!(outcome.platform.as_deref(), Some("888casino"));
    }

    #[tokio::test]
    async fn ai_failure_falls_back_to_rules() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let conv = converter().with_strategy(ai_strategy(&server.uri()));
        let outcome = conv
            .convert(&ConversionRequest::new(fixture("888-casino.html")), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(outcome.method, ConversionMethod::RuleBased);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [ConversionWarning::AiFallback { reason }] if reason.contains("500")
        ));
        assert!(outcome.html.contains("888 Casino"));
    }

    #[tokio::test]
    async fn convert_file_writes_default_output() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("888-casino.html");
        std::fs::write(&input, fixture("888-casino.html")).unwrap();

        let conv = converter().with_output_dir(tmp.path().join("out"));
        let result = conv
            .convert_file(&input, None, ConversionRequest::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(
            result.output_path,
            tmp.path().join("out").join("888-casino-converted.html")
        );
        let written = std::fs::read_to_string(&result.output_path).unwrap();
        assert_eq!(written, result.outcome.html);
    }

    #[tokio::test]
    async fn convert_file_accepts_non_utf8_input() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("cp1252.html");
        let mut bytes =
            b"<html><body><h1>888 Casino Review</h1><p>Bonus worth \x80100 for new players.</p>"
                .to_vec();
        bytes.extend_from_slice(b"</body></html>");
        std::fs::write(&input, bytes).unwrap();

        let output = tmp.path().join("page.html");
        let result = converter()
            .convert_file(&input, Some(&output), ConversionRequest::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.output_path, output);
        assert!(result.outcome.html.contains("\u{FFFD}100"));
    }

    #[tokio::test]
    async fn missing_input_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = converter()
            .convert_file(
                &tmp.path().join("missing.html"),
                None,
                ConversionRequest::default(),
                &SilentProgress,
            )
            .await
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn unwritable_output_is_not_an_input_error() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("888.html");
        std::fs::write(&input, fixture("888-casino.html")).unwrap();
        let blocker = tmp.path().join("taken");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = converter()
            .convert_file(
                &input,
                Some(&blocker.join("page.html")),
                ConversionRequest::default(),
                &SilentProgress,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PageForgeError::Output { .. }), "{err}");
        assert!(!err.is_input_error());
    }
}
