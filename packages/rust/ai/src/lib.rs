//! AI delegate: hands a whole document to a hosted language model and gets
//! a rendered page back.
//!
//! Every failure is classified as a [`DelegateError`] so the caller can fall
//! back to the rule-based path on any of them.

mod prompt;
mod response;

use std::time::Duration;

use pageforge_shared::AiSettings;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument};
use url::Url;

pub use prompt::{DelegateRequest, PromptLimits, build_prompt};
pub use response::extract_html;

/// Version header required by the Messages API.
pub const API_VERSION: &str = "2023-06-01";

const USER_AGENT: &str = concat!("pageforge/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in [`DelegateError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why the delegate produced no HTML.
#[derive(Debug, thiserror::Error)]
pub enum DelegateError {
    /// No API key in the configured environment variable.
    #[error("no API key: set {env}")]
    MissingCredential { env: String },

    /// The configured endpoint is not a usable URL.
    #[error("invalid AI endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("AI request timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI request failed: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("AI endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply could not be decoded or contained no HTML.
    #[error("malformed AI response: {0}")]
    MalformedResponse(String),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Resolved client settings.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    /// Env var the key was read from, for error messages.
    pub api_key_env: String,
    pub model: String,
    pub base_url: Url,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub limits: PromptLimits,
}

impl AiConfig {
    /// Resolve settings from the app config, reading the key from the environment.
    pub fn from_settings(settings: &AiSettings) -> Result<Self, DelegateError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| DelegateError::InvalidEndpoint {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(DelegateError::InvalidEndpoint {
                url: settings.base_url.clone(),
                reason: "scheme must be http or https".into(),
            });
        }

        Ok(Self {
            api_key: settings.api_key(),
            api_key_env: settings.api_key_env.clone(),
            model: settings.model.clone(),
            base_url,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_secs),
            limits: PromptLimits {
                input_chars: settings.input_char_limit,
                template_chars: settings.template_char_limit,
            },
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.as_str().trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Messages API client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AiClient {
    http: Client,
    api_key: String,
    config: AiConfig,
}

impl AiClient {
    /// Build a client. Fails with `MissingCredential` when no key is configured.
    pub fn from_config(config: &AiConfig) -> Result<Self, DelegateError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DelegateError::MissingCredential {
                env: config.api_key_env.clone(),
            })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DelegateError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            config: config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask the model to render `request` and return the HTML it produced.
    #[instrument(skip_all, fields(model = %self.config.model, doc_type = %request.document_type))]
    pub async fn render(&self, request: &DelegateRequest<'_>) -> Result<String, DelegateError> {
        let prompt = build_prompt(request, self.config.limits);
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: [Message {
                role: "user",
                content: &prompt,
            }],
        };

        debug!(prompt_chars = prompt.chars().count(), "sending completion request");

        let response = self
            .http
            .post(self.config.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DelegateError::Status {
                status: status.as_u16(),
                body: pageforge_shared::truncate_chars(&body, MAX_ERROR_BODY_CHARS).to_string(),
            });
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;
        let parsed: response::MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| DelegateError::MalformedResponse(format!("invalid JSON: {e}")))?;

        let html = extract_html(&parsed.text())?;
        info!(html_len = html.len(), "AI conversion complete");
        Ok(html)
    }

    fn classify(&self, err: reqwest::Error) -> DelegateError {
        if err.is_timeout() {
            DelegateError::Timeout(self.config.timeout)
        } else {
            DelegateError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pageforge_shared::DocumentType;

    use super::*;

    fn config(base_url: &str) -> AiConfig {
        AiConfig {
            api_key: Some("test-key".into()),
            api_key_env: "PAGEFORGE_TEST_KEY".into(),
            model: "test-model".into(),
            base_url: Url::parse(base_url).unwrap(),
            max_tokens: 1024,
            timeout: Duration::from_secs(5),
            limits: PromptLimits::default(),
        }
    }

    fn request(links: &BTreeMap<String, String>) -> DelegateRequest<'_> {
        DelegateRequest {
            html: "<h1>888 Casino Review</h1>",
            document_type: DocumentType::CasinoReview,
            platform: Some("888casino"),
            template: "<!DOCTYPE html><html>{{title}}</html>",
            platforms: vec!["888casino"],
            affiliate_links: links,
        }
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": text }],
        })
    }

    #[test]
    fn missing_key_is_classified() {
        let mut cfg = config("https://api.example.com");
        cfg.api_key = None;
        let err = AiClient::from_config(&cfg).unwrap_err();
        assert!(
            matches!(err, DelegateError::MissingCredential { ref env } if env == "PAGEFORGE_TEST_KEY")
        );

        cfg.api_key = Some("  ".into());
        assert!(matches!(
            AiClient::from_config(&cfg),
            Err(DelegateError::MissingCredential { .. })
        ));
    }

    #[test]
    fn settings_with_bad_endpoint_are_rejected() {
        let settings = AiSettings {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            AiConfig::from_settings(&settings),
            Err(DelegateError::InvalidEndpoint { .. })
        ));

        let settings = AiSettings {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(AiConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn settings_are_carried_over() {
        let settings = AiSettings {
            api_key_env: "PAGEFORGE_TEST_UNSET_KEY_VAR".into(),
            timeout_secs: 7,
            input_char_limit: 100,
            ..Default::default()
        };
        let cfg = AiConfig::from_settings(&settings).unwrap();
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.timeout, Duration::from_secs(7));
        assert_eq!(cfg.limits.input_chars, 100);
        assert_eq!(cfg.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[tokio::test]
    async fn render_returns_html_document() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/messages"))
            .and(wiremock::matchers::header("x-api-key", "test-key"))
            .and(wiremock::matchers::header("anthropic-version", API_VERSION))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "model": "test-model",
                "max_tokens": 1024,
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(reply(
                "Here you go:\n<!DOCTYPE html><html><body>888</body></html>\nEnjoy!",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let links = BTreeMap::new();
        let client = AiClient::from_config(&config(&server.uri())).unwrap();
        let html = client.render(&request(&links)).await.unwrap();
        assert_eq!(html, "<!DOCTYPE html><html><body>888</body></html>");
    }

    #[tokio::test]
    async fn error_status_is_classified() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let links = BTreeMap::new();
        let client = AiClient::from_config(&config(&server.uri())).unwrap();
        let err = client.render(&request(&links)).await.unwrap_err();
        assert!(
            matches!(err, DelegateError::Status { status: 529, ref body } if body == "overloaded")
        );
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"),
            )
            .mount(&server)
            .await;

        let links = BTreeMap::new();
        let client = AiClient::from_config(&config(&server.uri())).unwrap();
        let err = client.render(&request(&links)).await.unwrap_err();
        assert!(matches!(err, DelegateError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn reply_without_html_is_malformed() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(reply("I can't do that.")),
            )
            .mount(&server)
            .await;

        let links = BTreeMap::new();
        let client = AiClient::from_config(&config(&server.uri())).unwrap();
        let err = client.render(&request(&links)).await.unwrap_err();
        assert!(matches!(err, DelegateError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(reply("<html></html>"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri());
        cfg.timeout = Duration::from_millis(200);
        let links = BTreeMap::new();
        let client = AiClient::from_config(&cfg).unwrap();
        let err = client.render(&request(&links)).await.unwrap_err();
        assert!(matches!(err, DelegateError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let links = BTreeMap::new();
        let client = AiClient::from_config(&config("http://127.0.0.1:9")).unwrap();
        let err = client.render(&request(&links)).await.unwrap_err();
        assert!(matches!(err, DelegateError::Network(_)));
    }
}
