//! The two conversion strategies and how one falls back to the other.

use pageforge_ai::{AiClient, AiConfig, DelegateError};
use pageforge_shared::{AiSettings, ConversionMethod};
use tracing::{info, warn};

/// How a document is turned into a page.
///
/// `Ai` is tried first when configured; any [`DelegateError`] drops to the
/// rule-based path for that conversion. `RuleBased` never calls out.
#[derive(Debug, Clone)]
pub enum Strategy {
    Ai(AiClient),
    RuleBased,
}

impl Strategy {
    /// Pick the strategy the settings allow.
    ///
    /// A missing key is the normal way to run without AI and is logged at
    /// info; any other setup failure is logged as a warning. Both yield
    /// `RuleBased`.
    pub fn from_settings(settings: &AiSettings) -> Self {
        if !settings.enabled {
            info!("AI conversion disabled in config");
            return Self::RuleBased;
        }

        match AiConfig::from_settings(settings).and_then(|cfg| AiClient::from_config(&cfg)) {
            Ok(client) => {
                info!(model = %client.model(), "AI conversion enabled");
                Self::Ai(client)
            }
            Err(DelegateError::MissingCredential { env }) => {
                info!(%env, "no API key configured, using rule-based conversion");
                Self::RuleBased
            }
            Err(e) => {
                warn!(error = %e, "AI client unavailable, using rule-based conversion");
                Self::RuleBased
            }
        }
    }

    /// Method tag of the first path this strategy tries.
    pub fn method(&self) -> ConversionMethod {
        match self {
            Self::Ai(_) => ConversionMethod::Ai,
            Self::RuleBased => ConversionMethod::RuleBased,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_settings_are_rule_based() {
        let settings = AiSettings {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(
            Strategy::from_settings(&settings).method(),
            ConversionMethod::RuleBased
        );
    }

    #[test]
    fn missing_key_is_rule_based() {
        let settings = AiSettings {
            api_key_env: "PAGEFORGE_STRATEGY_TEST_UNSET".into(),
            ..Default::default()
        };
        assert!(matches!(
            Strategy::from_settings(&settings),
            Strategy::RuleBased
        ));
    }

    #[test]
    fn bad_endpoint_is_rule_based() {
        let settings = AiSettings {
            base_url: "::nope::".into(),
            ..Default::default()
        };
        assert!(matches!(
            Strategy::from_settings(&settings),
            Strategy::RuleBased
        ));
    }
}
