use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::resolve::DEFAULT_RESOLVE_CONCURRENCY;

pub const MIN_RESOLVE_CONCURRENCY: usize = 1;
pub const MAX_RESOLVE_CONCURRENCY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Source files scanned at once when one symbol has many definitions.
    pub concurrency: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_RESOLVE_CONCURRENCY,
        }
    }
}

impl ResolverSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: ResolverSettingsPatch,
    ) {
        if let Some(v) = patch.concurrency {
            self.concurrency = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.concurrency = self.concurrency.clamp(MIN_RESOLVE_CONCURRENCY, MAX_RESOLVE_CONCURRENCY);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ResolverSettingsPatch {
    pub(crate) concurrency: Option<usize>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
