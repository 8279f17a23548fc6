//! Expression grammar tests: literals, operators, precedence, displays,
//! comprehensions, and string literals.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use vela_ir::ast::py::{
    BoolOpKind, CmpOp, Const, ExprKind, Operator, StmtKind, UnaryOpKind,
};

use super::{first_expr, first_stmt, parse_err, parse_ok};

fn assigned_expr(source: &str) -> vela_ir::ast::py::Expr {
    let parsed = parse_ok(source);
    match &first_stmt(&parsed).kind {
        StmtKind::Assign { value, .. } => (**value).clone(),
        other => panic!("expected an assignment, got {other:?}"),
    }
}

#[test]
fn test_int_literal() {
    let expr = first_expr("42\n");
    assert_eq!(expr.kind, ExprKind::Constant { value: Const::Int { value: 42 } });
}

#[test]
fn test_float_and_complex_literals() {
    let expr = first_expr("2.5\n");
    assert_eq!(expr.kind, ExprKind::Constant { value: Const::Float { value: 2.5 } });

    let expr = first_expr("3j\n");
    assert_eq!(expr.kind, ExprKind::Constant { value: Const::Complex { imag: 3.0 } });
}

#[test]
fn test_singleton_literals() {
    assert_eq!(first_expr("None\n").kind, ExprKind::Constant { value: Const::None });
    assert_eq!(first_expr("...\n").kind, ExprKind::Constant { value: Const::Ellipsis });
    assert_eq!(
        first_expr("True\n").kind,
        ExprKind::Constant { value: Const::Bool { value: true } }
    );
}

#[test]
fn test_precedence_mul_over_add() {
    let expr = first_expr("1 + 2 * 3\n");
    let ExprKind::BinOp { left, op, right } = expr.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, Operator::Add);
    assert_eq!(left.kind, ExprKind::Constant { value: Const::Int { value: 1 } });
    assert!(matches!(right.kind, ExprKind::BinOp { op: Operator::Mult, .. }));
}

#[test]
fn test_subtraction_is_left_associative() {
    // (a - b) - c, not a - (b - c).
    let expr = first_expr("10 - 3 - 2\n");
    let ExprKind::BinOp { left, op, right } = expr.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, Operator::Sub);
    assert_eq!(right.kind, ExprKind::Constant { value: Const::Int { value: 2 } });
    let ExprKind::BinOp { left: ll, op: lop, right: lr } = left.kind else {
        panic!("expected the left operand to be a subtraction");
    };
    assert_eq!(lop, Operator::Sub);
    assert_eq!(ll.kind, ExprKind::Constant { value: Const::Int { value: 10 } });
    assert_eq!(lr.kind, ExprKind::Constant { value: Const::Int { value: 3 } });
}

#[test]
fn test_power_is_right_associative() {
    let expr = first_expr("2 ** 3 ** 2\n");
    let ExprKind::BinOp { left, op, right } = expr.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, Operator::Pow);
    assert_eq!(left.kind, ExprKind::Constant { value: Const::Int { value: 2 } });
    assert!(matches!(right.kind, ExprKind::BinOp { op: Operator::Pow, .. }));
}

#[test]
fn test_unary_operators() {
    let expr = first_expr("-x\n");
    assert!(matches!(expr.kind, ExprKind::UnaryOp { op: UnaryOpKind::USub, .. }));

    let expr = first_expr("not x\n");
    assert!(matches!(expr.kind, ExprKind::UnaryOp { op: UnaryOpKind::Not, .. }));
}

#[test]
fn test_comparison_chain() {
    let expr = first_expr("a < b <= c\n");
    let ExprKind::Compare { left, ops, comparators } = expr.kind else {
        panic!("expected a comparison");
    };
    assert!(matches!(left.kind, ExprKind::Name { .. }));
    assert_eq!(ops, vec![CmpOp::Lt, CmpOp::LtE]);
    assert_eq!(comparators.len(), 2);
}

#[test]
fn test_identity_and_membership_operators() {
    let expr = first_expr("a is not b\n");
    let ExprKind::Compare { ops, .. } = expr.kind else {
        panic!("expected a comparison");
    };
    assert_eq!(ops, vec![CmpOp::IsNot]);

    let expr = first_expr("a not in b\n");
    let ExprKind::Compare { ops, .. } = expr.kind else {
        panic!("expected a comparison");
    };
    assert_eq!(ops, vec![CmpOp::NotIn]);
}

#[test]
fn test_boolop_flattens_operands() {
    let expr = first_expr("a or b or c\n");
    let ExprKind::BoolOp { op, values } = expr.kind else {
        panic!("expected a boolean expression");
    };
    assert_eq!(op, BoolOpKind::Or);
    assert_eq!(values.len(), 3);
}

#[test]
fn test_ternary_expression() {
    let expr = first_expr("a if b else c\n");
    assert!(matches!(expr.kind, ExprKind::IfExp { .. }));
}

#[test]
fn test_lambda() {
    let expr = first_expr("lambda x, y=1: x + y\n");
    let ExprKind::Lambda { args, .. } = expr.kind else {
        panic!("expected a lambda");
    };
    assert_eq!(args.args.len(), 2);
    assert_eq!(args.defaults.len(), 1);
}

#[test]
fn test_walrus_in_parentheses() {
    let expr = first_expr("(n := 10)\n");
    let ExprKind::NamedExpr { target, value } = expr.kind else {
        panic!("expected a named expression");
    };
    assert!(matches!(target.kind, ExprKind::Name { ref id, .. } if id == "n"));
    assert_eq!(value.kind, ExprKind::Constant { value: Const::Int { value: 10 } });
}

#[test]
fn test_trailer_chain() {
    // a.b(c)[d] must nest as Subscript(Call(Attribute(a, b), [c]), d).
    let expr = first_expr("a.b(c)[d]\n");
    let ExprKind::Subscript { value, .. } = expr.kind else {
        panic!("expected a subscript");
    };
    let ExprKind::Call { func, args, .. } = &value.kind else {
        panic!("expected a call under the subscript");
    };
    assert_eq!(args.len(), 1);
    assert!(matches!(func.kind, ExprKind::Attribute { ref attr, .. } if attr == "b"));
}

#[test]
fn test_slice_forms() {
    let expr = first_expr("a[1:2:3]\n");
    let ExprKind::Subscript { slice, .. } = expr.kind else {
        panic!("expected a subscript");
    };
    let ExprKind::Slice { lower, upper, step } = slice.kind else {
        panic!("expected a slice");
    };
    assert!(lower.is_some() && upper.is_some() && step.is_some());
}

#[test]
fn test_bare_tuple() {
    let expr = first_expr("1, 2\n");
    let ExprKind::Tuple { elts, .. } = expr.kind else {
        panic!("expected a tuple");
    };
    assert_eq!(elts.len(), 2);
}

#[test]
fn test_displays() {
    assert!(matches!(first_expr("[1, 2]\n").kind, ExprKind::List { ref elts, .. } if elts.len() == 2));
    assert!(matches!(first_expr("{1, 2}\n").kind, ExprKind::Set { ref elts, .. } if elts.len() == 2));
    assert!(matches!(first_expr("{1: 2}\n").kind, ExprKind::Dict { ref keys, .. } if keys.len() == 1));
    // Empty braces are a dict, not a set.
    assert!(matches!(first_expr("{}\n").kind, ExprKind::Dict { ref keys, .. } if keys.is_empty()));
}

#[test]
fn test_list_comprehension() {
    let expr = first_expr("[x * 2 for x in items if x]\n");
    let ExprKind::ListComp { generators, .. } = expr.kind else {
        panic!("expected a list comprehension");
    };
    assert_eq!(generators.len(), 1);
    assert_eq!(generators[0].ifs.len(), 1);
}

#[test]
fn test_call_with_sole_generator_argument() {
    let expr = first_expr("sum(x for x in items)\n");
    let ExprKind::Call { args, keywords, .. } = expr.kind else {
        panic!("expected a call");
    };
    assert_eq!(args.len(), 1);
    assert!(keywords.is_empty());
    assert!(matches!(args[0].kind, ExprKind::GeneratorExp { .. }));
}

#[test]
fn test_unparenthesized_generator_with_second_argument() {
    let err = parse_err("sum(x for x in items, 1)\n");
    assert_eq!(err.message, "Generator expression must be parenthesized");
}

#[test]
fn test_positional_after_keyword_argument() {
    let err = parse_err("f(x=1, 2)\n");
    assert_eq!(err.message, "positional argument follows keyword argument");
}

#[test]
fn test_star_unpacking_after_double_star() {
    let err = parse_err("f(**k, *a)\n");
    assert_eq!(
        err.message,
        "iterable argument unpacking follows keyword argument unpacking"
    );
}

#[test]
fn test_adjacent_string_concatenation() {
    let expr = assigned_expr("x = 'ab' 'cd'\n");
    assert_eq!(
        expr.kind,
        ExprKind::Constant { value: Const::Str { value: "abcd".to_owned() } }
    );
}

#[test]
fn test_mixing_bytes_and_str_literals() {
    let err = parse_err("x = b'a' 'b'\n");
    assert_eq!(err.message, "cannot mix bytes and nonbytes literals");
}

#[test]
fn test_fstring_parts() {
    let expr = assigned_expr("x = f'a{b}c'\n");
    let ExprKind::JoinedStr { values } = expr.kind else {
        panic!("expected a joined string");
    };
    assert_eq!(values.len(), 3);
    assert_eq!(
        values[0].kind,
        ExprKind::Constant { value: Const::Str { value: "a".to_owned() } }
    );
    assert!(matches!(values[1].kind, ExprKind::FormattedValue { .. }));
    assert_eq!(
        values[2].kind,
        ExprKind::Constant { value: Const::Str { value: "c".to_owned() } }
    );
}

#[test]
fn test_fstring_conversion_specifier() {
    let expr = assigned_expr("x = f'{v!r}'\n");
    let ExprKind::JoinedStr { values } = expr.kind else {
        panic!("expected a joined string");
    };
    let ExprKind::FormattedValue { conversion, .. } = values[0].kind else {
        panic!("expected a formatted value");
    };
    assert_eq!(conversion, i8::try_from(b'r').unwrap());
}

#[test]
fn test_fstring_invalid_conversion() {
    let err = parse_err("x = f'{v!z}'\n");
    assert_eq!(
        err.message,
        "f-string: invalid conversion character: expected 's', 'r', or 'a'"
    );
}

#[test]
fn test_yield_in_parentheses() {
    let parsed = parse_ok("def gen():\n    x = (yield 1)\n");
    let StmtKind::FunctionDef { body, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a function definition");
    };
    let StmtKind::Assign { value, .. } = &body[0].kind else {
        panic!("expected an assignment");
    };
    assert!(matches!(value.kind, ExprKind::Yield { .. }));
}

#[test]
fn test_await_in_async_function() {
    let parsed = parse_ok("async def fetch():\n    return await request()\n");
    let StmtKind::AsyncFunctionDef { body, .. } = &first_stmt(&parsed).kind else {
        panic!("expected an async function definition");
    };
    let StmtKind::Return { value: Some(value) } = &body[0].kind else {
        panic!("expected a return statement");
    };
    assert!(matches!(value.kind, ExprKind::Await { .. }));
}
