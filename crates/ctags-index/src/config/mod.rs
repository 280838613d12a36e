//! Layered settings.
//!
//! Each category lives in its own file as a public settings struct with
//! defaults and `normalize()`, plus a private `*Patch` struct for partial
//! deserialization. Layers are applied in order: defaults, then the
//! project's `ctags-index.toml`, then the client's JSON payload
//! (`initializationOptions` / `didChangeConfiguration`).

pub(crate) mod logging;
pub(crate) mod project_file;
pub(crate) mod resolver;
pub(crate) mod tags;

use std::{collections::HashMap, path::Path};

use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
pub use project_file::{PROJECT_FILENAME, find_project_file};
use resolver::ResolverSettingsPatch;
pub use resolver::{MAX_RESOLVE_CONCURRENCY, MIN_RESOLVE_CONCURRENCY, ResolverSettings};
use serde::Deserialize;
use serde_json::Value;
use tags::TagsSettingsPatch;
pub use tags::{MAX_BUCKET_PREFIX_LEN, MIN_BUCKET_PREFIX_LEN, StorageKind, TagsSettings};
use tracing::{debug, warn};

pub const SETTINGS_SECTION_KEY: &str = "ctags-index";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub tags: TagsSettings,
    pub resolver: ResolverSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    /// Defaults, then the nearest `ctags-index.toml` above `base_dir`, then
    /// the client payload.
    pub fn load(
        base_dir: &Path,
        payload: Option<&Value>,
    ) -> Self {
        Self::default().layered(base_dir, payload)
    }

    /// `self`, then the nearest project file, then the client payload.
    pub fn layered(
        &self,
        base_dir: &Path,
        payload: Option<&Value>,
    ) -> Self {
        let mut settings = self.clone();
        if let Some(path) = find_project_file(base_dir) {
            settings = settings.merged_with_project_file(&path);
        }
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<SettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    pub fn merged_with_project_file(
        &self,
        path: &Path,
    ) -> Self {
        let mut merged = self.clone();
        match project_file::read_patch(path) {
            Ok(patch) => {
                debug!("[config] applying {}", path.display());
                merged.apply_patch(patch);
                merged.normalize();
            },
            Err(error) => warn!("[config] ignoring {}: {error}", path.display()),
        }
        merged
    }

    fn apply_patch(
        &mut self,
        patch: SettingsPatch,
    ) {
        if let Some(p) = patch.tags {
            self.tags.apply_patch(p);
        }
        if let Some(p) = patch.resolver {
            self.resolver.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.tags.normalize();
        self.resolver.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SettingsPatch {
    tags: Option<TagsSettingsPatch>,
    resolver: Option<ResolverSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<&Value> {
    let mut candidates = vec![payload];
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped);
    }
    candidates
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
