use super::*;

#[test]
fn intern_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("clicked");
    let b = interner.intern("clicked");
    assert_eq!(a, b);
    assert_eq!(interner.resolve(a), "clicked");
}

#[test]
fn distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    let a = interner.intern("attr");
    let b = interner.intern("event");
    assert_ne!(a, b);
    assert_eq!(interner.resolve(a), "attr");
    assert_eq!(interner.resolve(b), "event");
}

#[test]
fn empty_string_is_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.resolve(Name::EMPTY), "");
}

#[test]
fn intern_owned_matches_intern() {
    let interner = StringInterner::new();
    let a = interner.intern("enamldef");
    let b = interner.intern_owned("enamldef".to_owned());
    assert_eq!(a, b);
}
