//! Static lookup tables loaded once at startup: platform metadata,
//! affiliate links and site/image settings.
//!
//! The store is never mutated after [`ConfigStore::load`], so one instance is
//! shared (behind an `Arc`) by every conversion.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PageForgeError, Result};

/// Platform key → affiliate URL.
pub const AFFILIATE_LINKS_FILE: &str = "affiliate-links.json";
/// Platform key → [`PlatformMetadata`].
pub const PLATFORM_METADATA_FILE: &str = "platform-metadata.json";
/// [`ImageSettings`].
pub const IMAGE_SETTINGS_FILE: &str = "image-urls.json";

/// Marketing metadata for one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetadata {
    /// Display name, also used as a detection needle ("888 Casino").
    pub name: String,
    /// Logo file name, relative to the image path.
    #[serde(default)]
    pub logo: Option<String>,
    /// Editorial rating on a 10 point scale.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stars_filled: Option<u32>,
    #[serde(default)]
    pub stars_total: Option<u32>,
    #[serde(default)]
    pub min_deposit: Option<String>,
    #[serde(default)]
    pub welcome_bonus: Option<String>,
    #[serde(default)]
    pub established: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    /// Any other keys, kept verbatim for `platform_<key>` placeholders.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Legal copy shown on every page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disclaimers {
    #[serde(default)]
    pub gambling_warning: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Site-wide image hosting and disclaimer settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub disclaimers: Disclaimers,
}

impl ImageSettings {
    /// Absolute URL of an image file under the configured base URL and path.
    pub fn image_url(&self, file: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.path.trim_matches('/');
        let file = file.trim_start_matches('/');

        match (base.is_empty(), path.is_empty()) {
            (true, true) => file.to_string(),
            (true, false) => format!("/{path}/{file}"),
            (false, true) => format!("{base}/{file}"),
            (false, false) => format!("{base}/{path}/{file}"),
        }
    }
}

/// The three configuration tables, keyed by platform identifier.
///
/// `BTreeMap` keeps iteration order stable, which keeps platform detection
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    pub affiliate_links: BTreeMap<String, String>,
    pub platforms: BTreeMap<String, PlatformMetadata>,
    pub images: ImageSettings,
}

impl ConfigStore {
    /// Load all three tables from `dir`.
    ///
    /// A missing file logs a warning and leaves that table empty; a file that
    /// exists but is not valid JSON is a config error.
    pub fn load(dir: &Path) -> Result<Self> {
        let affiliate_links: BTreeMap<String, String> =
            load_json_or_default(&dir.join(AFFILIATE_LINKS_FILE))?;
        let platforms: BTreeMap<String, PlatformMetadata> =
            load_json_or_default(&dir.join(PLATFORM_METADATA_FILE))?;
        let images = load_json_or_default(&dir.join(IMAGE_SETTINGS_FILE))?;

        if let Some((key, _)) = platforms.iter().find(|(_, m)| m.name.trim().is_empty()) {
            return Err(PageForgeError::config(format!(
                "{PLATFORM_METADATA_FILE}: platform '{key}' has an empty name"
            )));
        }

        debug!(
            platforms = platforms.len(),
            affiliate_links = affiliate_links.len(),
            dir = %dir.display(),
            "configuration store loaded"
        );

        Ok(Self {
            affiliate_links,
            platforms,
            images,
        })
    }

    pub fn platform(&self, key: &str) -> Option<&PlatformMetadata> {
        self.platforms.get(key)
    }

    pub fn affiliate_link(&self, key: &str) -> Option<&str> {
        self.affiliate_links.get(key).map(String::as_str)
    }

    /// Display name for a platform key, falling back to the key itself.
    pub fn display_name(&self, key: &str) -> String {
        self.platform(key)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Gambling disclaimer text (empty when unconfigured).
    pub fn disclaimer(&self) -> &str {
        &self.images.disclaimers.gambling_warning
    }
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config file not found, using empty table");
            return Ok(T::default());
        }
        Err(e) => return Err(PageForgeError::io(path, e)),
    };

    serde_json::from_str(&content)
        .map_err(|e| PageForgeError::config(format!("failed to parse {}: {e}", path.display())))
}
