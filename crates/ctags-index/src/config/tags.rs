use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::index::{DEFAULT_BUCKET_PREFIX_LEN, StorageLayout};

pub const MIN_BUCKET_PREFIX_LEN: usize = 1;
pub const MAX_BUCKET_PREFIX_LEN: usize = 64;

const DEFAULT_TAGS_FILE: &str = "tags";
const DEFAULT_COMMAND: &str = "ctags";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StorageKind {
    /// Parse the whole table into memory.
    #[default]
    Resident,
    /// Keep only per-prefix byte spans and re-read the table per query.
    ByteRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagsSettings {
    /// Tag table path, relative to the base directory.
    pub file: String,
    pub command: String,
    /// Arguments placed before the per-call arguments and `-f <out> .`.
    pub args: Vec<String>,
    pub storage: StorageKind,
    pub bucket_prefix_len: usize,
}

impl Default for TagsSettings {
    fn default() -> Self {
        Self {
            file: DEFAULT_TAGS_FILE.to_string(),
            command: DEFAULT_COMMAND.to_string(),
            args: vec!["-R".to_string()],
            storage: StorageKind::Resident,
            bucket_prefix_len: DEFAULT_BUCKET_PREFIX_LEN,
        }
    }
}

impl TagsSettings {
    pub fn layout(&self) -> StorageLayout {
        match self.storage {
            StorageKind::Resident => StorageLayout::Resident,
            StorageKind::ByteRange => StorageLayout::ByteRange {
                bucket_prefix_len: self.bucket_prefix_len,
            },
        }
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: TagsSettingsPatch,
    ) {
        if let Some(v) = patch.file {
            self.file = v;
        }
        if let Some(v) = patch.command {
            self.command = v;
        }
        if let Some(v) = patch.args {
            self.args = v;
        }
        if let Some(v) = patch.storage {
            self.storage = v;
        }
        if let Some(v) = patch.bucket_prefix_len {
            self.bucket_prefix_len = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.file = self.file.trim().to_string();
        if self.file.is_empty() {
            self.file = DEFAULT_TAGS_FILE.to_string();
        }
        self.command = self.command.trim().to_string();
        if self.command.is_empty() {
            self.command = DEFAULT_COMMAND.to_string();
        }
        self.args = self.args.iter().map(|a| a.trim().to_string()).filter(|a| !a.is_empty()).collect();
        self.bucket_prefix_len = self.bucket_prefix_len.clamp(MIN_BUCKET_PREFIX_LEN, MAX_BUCKET_PREFIX_LEN);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct TagsSettingsPatch {
    pub(crate) file: Option<String>,
    pub(crate) command: Option<String>,
    pub(crate) args: Option<Vec<String>>,
    pub(crate) storage: Option<StorageKind>,
    pub(crate) bucket_prefix_len: Option<usize>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
