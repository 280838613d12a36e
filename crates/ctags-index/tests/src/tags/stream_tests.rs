use super::*;

#[tokio::test]
async fn spans_cover_each_line_exactly() {
    let data: &[u8] = b"one\r\ntwo\n\nlast";
    let mut lines = LineStream::new(data);

    let mut seen = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        seen.push((line.span.clone(), line.text().into_owned()));
    }

    assert_eq!(
        seen,
        vec![
            (0..5, "one".to_string()),
            (5..9, "two".to_string()),
            (9..10, String::new()),
            (10..14, "last".to_string()),
        ]
    );
}

#[tokio::test]
async fn starting_offset_keeps_spans_absolute() {
    let data: &[u8] = b"b\tb.c\t2\n";
    let mut lines = LineStream::starting_at(data, 100);
    let (span, record) = lines.next_record().await.unwrap().unwrap();
    assert_eq!(span, 100..108);
    assert_eq!(record.name, "b");
    assert!(lines.next_record().await.unwrap().is_none());
}

#[tokio::test]
async fn next_record_skips_headers_and_garbage() {
    let data: &[u8] = b"!_TAG_FILE_SORTED\t1\t/0=unsorted/\nnot a record\nfoo\tfoo.c\t1\n";
    let mut lines = LineStream::new(data);
    let (span, record) = lines.next_record().await.unwrap().unwrap();
    assert_eq!(record.name, "foo");
    assert_eq!(span.start, 46);
    assert!(lines.next_record().await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_utf8_is_decoded_lossily() {
    let data: &[u8] = b"caf\xe9\tx.c\t3\n";
    let mut lines = LineStream::new(data);
    let (_, record) = lines.next_record().await.unwrap().unwrap();
    assert_eq!(record.name, "caf\u{fffd}");
}
