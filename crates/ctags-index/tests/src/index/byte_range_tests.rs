use std::path::PathBuf;

use super::*;
use crate::index::{StorageLayout, SymbolIndex, build};

fn unique_temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("ctags_byte_range_{name}_{}_{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}

/// Write `lines` as a table and return each line's byte span.
fn write_table(
    path: &Path,
    lines: &[String],
) -> Vec<Range<u64>> {
    let mut content = String::new();
    let mut spans = Vec::new();
    for line in lines {
        let start = content.len() as u64;
        content.push_str(line);
        content.push('\n');
        spans.push(start..content.len() as u64);
    }
    std::fs::write(path, content).expect("write table");
    spans
}

async fn build_byte_range(
    table: &Path,
    bucket_prefix_len: usize,
) -> ByteRangeIndex {
    match build(
        table,
        StorageLayout::ByteRange {
            bucket_prefix_len,
        },
    )
    .await
    {
        SymbolIndex::ByteRange(index) => index,
        other => panic!("expected byte-range index, got {other:?}"),
    }
}

#[test]
fn bucket_key_counts_characters() {
    assert_eq!(bucket_key("handler_main", 7), "handler");
    assert_eq!(bucket_key("abc", 7), "abc");
    assert_eq!(bucket_key("ünïcödé_x", 3), "ünï");
}

#[tokio::test]
async fn bucket_spans_cover_every_same_name_line() {
    let dir = unique_temp_dir("superset");
    let table = dir.join("tags");

    // Many names share the 7-character bucket "handler"; the order is
    // scrambled so same-bucket lines are not contiguous.
    let mut names: Vec<String> = (0..200).map(|i| format!("handler_{:03}", i % 60)).collect();
    names.extend(["hand", "handle", "handlers", "handler", "zeta", "alpha"].map(str::to_string));
    let count = names.len();
    let lines: Vec<String> =
        (0..count).map(|i| names[(i * 37) % count].clone()).map(|name| format!("{name}\tsrc/{name}.c\t1")).collect();
    let spans = write_table(&table, &lines);

    let index = build_byte_range(&table, 7).await;
    assert_eq!(index.len(), count);

    for (line, span) in lines.iter().zip(&spans) {
        let name = line.split('\t').next().unwrap();
        let bucket = index.span_for(name).expect("bucket exists");
        assert!(bucket.start <= span.start && span.end <= bucket.end, "{name}: {span:?} outside {bucket:?}");
    }

    let expected = lines.iter().filter(|line| line.starts_with("handler_007\t")).count();
    let found = index.get("handler_007").await;
    assert_eq!(found.len(), expected);
    assert!(found.iter().all(|r| r.name == "handler_007"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn lookup_reads_only_the_bucket() {
    let dir = unique_temp_dir("bucket");
    let table = dir.join("tags");
    let lines: Vec<String> = ["alpha\ta.c\t1", "beta\tb.c\t2", "beta\tb2.c\t3", "gamma\tg.c\t4"].map(str::to_string).to_vec();
    let spans = write_table(&table, &lines);

    let index = build_byte_range(&table, 4).await;
    assert_eq!(index.bucket_count(), 3);
    assert_eq!(index.span_for("beta"), Some(spans[1].start..spans[2].end));

    let files: Vec<String> = index.get("beta").await.iter().map(|r| r.file.to_string()).collect();
    assert_eq!(files, vec!["b.c", "b2.c"]);
    assert!(index.get("bet").await.is_empty());
    assert!(index.get("delta").await.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn prefix_search_spans_short_and_long_prefixes() {
    let dir = unique_temp_dir("prefix");
    let table = dir.join("tags");
    let lines: Vec<String> =
        ["bart\tb.c\t1", "foo\tf.c\t1", "foo\tf2.c\t1", "foobar\tf.c\t2", "foobaz\tf.c\t3"].map(str::to_string).to_vec();
    write_table(&table, &lines);

    let index = build_byte_range(&table, 4).await;
    assert_eq!(index.prefix_search("fo").await, vec!["foo", "foobar", "foobaz"]);
    assert_eq!(index.prefix_search("fooba").await, vec!["foobar", "foobaz"]);
    assert_eq!(index.prefix_search("foobaz").await, vec!["foobaz"]);
    assert!(index.prefix_search("q").await.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn vanished_table_reads_as_empty() {
    let dir = unique_temp_dir("vanished");
    let table = dir.join("tags");
    write_table(&table, &["x\tx.c\t1".to_string()]);

    let index = build_byte_range(&table, 7).await;
    std::fs::remove_file(&table).unwrap();
    assert!(index.get("x").await.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}
