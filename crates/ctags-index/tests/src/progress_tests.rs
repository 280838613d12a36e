use super::prefixed_title;

#[test]
fn title_gets_prefix() {
    assert_eq!(prefixed_title("Indexing"), "ctags-index: Indexing");
}

#[test]
fn existing_prefix_is_kept() {
    assert_eq!(prefixed_title("  ctags-index: Indexing "), "ctags-index: Indexing");
}
