//! Property tests: the parser must be total and deterministic over
//! arbitrary input, not just the curated cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use vela_ir::ast::py::{Const, ExprKind, StmtKind};

use super::{first_stmt, parse};

proptest! {
    #[test]
    fn parse_never_panics_and_is_deterministic(
        source in proptest::collection::vec(32u8..127, 0..200)
    ) {
        let source = String::from_utf8(source).unwrap();
        let first = parse(&source);
        let second = parse(&source);
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Err(a), Err(b)) = (first, second) {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn integer_literals_round_trip(value in 0i64..=i64::MAX) {
        let parsed = parse(&format!("x = {value}\n")).unwrap();
        let StmtKind::Assign { value: rhs, .. } = &first_stmt(&parsed).kind else {
            return Err(TestCaseError::fail("expected an assignment"));
        };
        prop_assert_eq!(
            &rhs.kind,
            &ExprKind::Constant { value: Const::Int { value } }
        );
    }
}
