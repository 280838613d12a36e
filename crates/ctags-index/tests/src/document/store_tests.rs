use super::*;

#[test]
fn open_get_close() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///src/main.c").unwrap();
    store.open(uri.clone(), "int main;".to_string(), 1);

    assert_eq!(store.get(&uri).map(|doc| doc.text), Some("int main;".to_string()));
    assert_eq!(store.len(), 1);

    store.close(&uri);
    assert!(store.get(&uri).is_none());
    assert!(store.is_empty());
}

#[test]
fn update_replaces_text_and_version() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///src/main.c").unwrap();
    store.open(uri.clone(), "v1".to_string(), 1);
    store.update(uri.clone(), "v2\nmore".to_string(), 2);

    let doc = store.get(&uri).unwrap();
    assert_eq!(doc.text, "v2\nmore");
    assert_eq!(doc.version, 2);
    assert_eq!(doc.line_count(), 2);
}

#[test]
fn update_of_unknown_document_registers_it() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///late.c").unwrap();
    store.update(uri.clone(), "x".to_string(), 4);
    assert_eq!(store.get(&uri).map(|doc| doc.version), Some(4));
}
