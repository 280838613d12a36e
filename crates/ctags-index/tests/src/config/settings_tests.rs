use std::path::PathBuf;

use serde_json::json;

use super::*;
use crate::index::StorageLayout;

fn unique_temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("ctags_settings_{name}_{}_{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.tags.file, "tags");
    assert_eq!(settings.tags.command, "ctags");
    assert_eq!(settings.tags.args, vec!["-R"]);
    assert_eq!(settings.tags.storage, StorageKind::Resident);
    assert_eq!(settings.tags.bucket_prefix_len, 7);
    assert_eq!(settings.resolver.concurrency, 8);
    assert_eq!(settings.logging.level, LogLevel::Info);
    assert_eq!(settings.tags.layout(), StorageLayout::Resident);
}

#[test]
fn bare_payload_is_applied() {
    let settings = Settings::from_payload(Some(&json!({
        "tags": { "file": ".tags", "storage": "byteRange", "bucketPrefixLen": 4 },
        "resolver": { "concurrency": 2 }
    })));
    assert_eq!(settings.tags.file, ".tags");
    assert_eq!(
        settings.tags.layout(),
        StorageLayout::ByteRange {
            bucket_prefix_len: 4
        }
    );
    assert_eq!(settings.resolver.concurrency, 2);
    assert_eq!(settings.tags.command, "ctags");
}

#[test]
fn nested_payload_is_applied() {
    let settings = Settings::from_payload(Some(&json!({
        "ctags-index": {
            "tags": { "command": "uctags", "args": ["--recurse", "  "] },
            "logging": { "level": "debug" }
        }
    })));
    assert_eq!(settings.tags.command, "uctags");
    assert_eq!(settings.tags.args, vec!["--recurse"]);
    assert_eq!(settings.logging.level, LogLevel::Debug);
}

#[test]
fn unknown_keys_are_tolerated() {
    let settings = Settings::from_payload(Some(&json!({
        "somethingElse": true,
        "tags": { "file": "TAGS", "futureOption": 1 }
    })));
    assert_eq!(settings.tags.file, "TAGS");
}

#[test]
fn invalid_values_leave_settings_unchanged() {
    let settings = Settings::from_payload(Some(&json!({ "tags": { "storage": "mmap" } })));
    assert_eq!(settings, Settings::default());
}

#[test]
fn ranges_are_clamped_and_blanks_restored() {
    let settings = Settings::from_payload(Some(&json!({
        "tags": { "file": "  ", "command": "", "bucketPrefixLen": 0 },
        "resolver": { "concurrency": 1000 }
    })));
    assert_eq!(settings.tags.file, "tags");
    assert_eq!(settings.tags.command, "ctags");
    assert_eq!(settings.tags.bucket_prefix_len, MIN_BUCKET_PREFIX_LEN);
    assert_eq!(settings.resolver.concurrency, MAX_RESOLVE_CONCURRENCY);
}

#[test]
fn merge_keeps_unpatched_fields() {
    let base = Settings::from_payload(Some(&json!({ "tags": { "file": "a.tags" } })));
    let merged = base.merged_with_payload(&json!({ "resolver": { "concurrency": 3 } }));
    assert_eq!(merged.tags.file, "a.tags");
    assert_eq!(merged.resolver.concurrency, 3);
}

#[test]
fn log_level_ordering() {
    assert!(LogLevel::Info.allows(LogLevel::Warn));
    assert!(LogLevel::Info.allows(LogLevel::Info));
    assert!(!LogLevel::Info.allows(LogLevel::Debug));
    assert!(!LogLevel::Error.allows(LogLevel::Warn));
}

#[test]
fn client_log_level_accepts_warning_spelling() {
    let settings = Settings::from_payload(Some(&json!({ "logging": { "level": "warning" } })));
    assert_eq!(settings.logging.level, LogLevel::Warn);
    assert_eq!(settings.logging.level.message_type(), tower_lsp::lsp_types::MessageType::WARNING);
    assert_eq!(LogLevel::Trace.message_type(), tower_lsp::lsp_types::MessageType::LOG);

    let unchanged = settings.merged_with_payload(&json!({ "logging": { "format": "json" } }));
    assert_eq!(unchanged.logging.level, LogLevel::Warn);
}

#[test]
fn project_file_is_found_in_parent_directories() {
    let root = unique_temp_dir("walk");
    let nested = root.join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(root.join(PROJECT_FILENAME), "[tags]\nfile = \"project.tags\"\n").unwrap();

    assert_eq!(find_project_file(&nested), Some(root.join(PROJECT_FILENAME)));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn project_file_is_layered_below_client_payload() {
    let root = unique_temp_dir("layers");
    std::fs::write(
        root.join(PROJECT_FILENAME),
        "[tags]\nfile = \"project.tags\"\nstorage = \"byteRange\"\n\n[resolver]\nconcurrency = 5\n",
    )
    .unwrap();

    let settings = Settings::load(&root, Some(&json!({ "resolver": { "concurrency": 6 } })));
    assert_eq!(settings.tags.file, "project.tags");
    assert_eq!(settings.tags.storage, StorageKind::ByteRange);
    assert_eq!(settings.resolver.concurrency, 6);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn malformed_project_file_is_ignored() {
    let root = unique_temp_dir("malformed");
    let path = root.join(PROJECT_FILENAME);
    std::fs::write(&path, "[tags\nfile = ").unwrap();

    let base = Settings::default();
    assert_eq!(base.merged_with_project_file(&path), base);
    std::fs::remove_dir_all(&root).ok();
}
