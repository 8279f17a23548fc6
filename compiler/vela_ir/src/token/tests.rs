use super::*;
use crate::StringInterner;
use pretty_assertions::assert_eq;

#[test]
fn tags_parallel_tokens() {
    let interner = StringInterner::new();
    let mut list = TokenList::new();
    list.push(Token::new(
        TokenKind::Name(interner.intern("enamldef")),
        Span::new(0, 8),
    ));
    list.push(Token::new(TokenKind::Colon, Span::new(8, 9)));
    list.push(Token::new(TokenKind::Newline, Span::new(9, 10)));
    list.push(Token::new(TokenKind::EndMarker, Span::new(10, 10)));

    assert_eq!(list.len(), 4);
    assert_eq!(
        list.tags(),
        &[
            TokenKind::TAG_NAME,
            TokenKind::Colon.tag(),
            TokenKind::TAG_NEWLINE,
            TokenKind::TAG_EOF,
        ]
    );
}

#[test]
fn tag_distinguishes_binding_operators() {
    let tags = [
        TokenKind::Equal.tag(),
        TokenKind::LeftShift.tag(),
        TokenKind::RightShift.tag(),
        TokenKind::ColonEqual.tag(),
        TokenKind::ColonColon.tag(),
    ];
    let mut unique = tags.to_vec();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), tags.len());
}

#[test]
fn fixed_tokens_have_text() {
    assert_eq!(TokenKind::ColonColon.text(), Some("::"));
    assert_eq!(TokenKind::FatArrow.text(), Some("=>"));
    assert_eq!(TokenKind::Ellipsis.text(), Some("..."));
    assert_eq!(TokenKind::FStringStart.text(), None);
}

#[test]
fn number_float_round_trips_bits() {
    let v = NumberValue::float(2.5);
    if let NumberValue::Float(bits) = v {
        assert_eq!(f64::from_bits(bits), 2.5);
    } else {
        panic!("expected float");
    }
}

#[test]
fn soft_keywords_are_sorted_and_complete() {
    let mut sorted = SOFT_KEYWORDS.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, SOFT_KEYWORDS);
    for kw in ["enamldef", "attr", "event", "alias", "const", "template", "pragma", "func"] {
        assert!(SOFT_KEYWORDS.contains(&kw), "missing soft keyword {kw}");
    }
}
