//! Integration tests for named character reference lookup.

use kempt_html::tokenizer::named_character_references::{entity_name, lookup_entity};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp"), Some('&'));
    assert_eq!(lookup_entity("lt"), Some('<'));
    assert_eq!(lookup_entity("gt"), Some('>'));
    assert_eq!(lookup_entity("quot"), Some('"'));
    assert_eq!(lookup_entity("nbsp"), Some('\u{00A0}'));
    assert_eq!(lookup_entity("mdash"), Some('\u{2014}'));
}

#[test]
fn test_lookup_is_case_sensitive() {
    assert_eq!(lookup_entity("eacute"), Some('\u{00E9}'));
    assert_eq!(lookup_entity("Eacute"), Some('\u{00C9}'));
    assert_eq!(lookup_entity("AMP"), None);
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity"), None);
    assert_eq!(lookup_entity("amp;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_reverse_lookup() {
    assert_eq!(entity_name('\u{00A0}'), Some("nbsp"));
    assert_eq!(entity_name('\u{00A9}'), Some("copy"));
    assert_eq!(entity_name('\u{2026}'), Some("hellip"));
    assert_eq!(entity_name('a'), None);
}

#[test]
fn test_apostrophe_has_no_reverse_name() {
    // `&apos;` is accepted on input but is not an HTML 4 entity, so it is
    // never chosen for output.
    assert_eq!(lookup_entity("apos"), Some('\''));
    assert_eq!(entity_name('\''), None);
}
