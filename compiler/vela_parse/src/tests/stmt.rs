//! Statement grammar tests: assignments, compound statements, imports,
//! function and class definitions, pattern matching, version gates.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use vela_ir::ast::py::{
    Const, ExprContext, ExprKind, Operator, PatternKind, StmtKind,
};

use super::{first_stmt, parse_err, parse_ok, parse_with_version};

#[test]
fn test_simple_assignment() {
    let parsed = parse_ok("x = 1\n");
    let StmtKind::Assign { targets, value } = &first_stmt(&parsed).kind else {
        panic!("expected an assignment");
    };
    assert_eq!(targets.len(), 1);
    assert!(matches!(
        targets[0].kind,
        ExprKind::Name { ref id, ctx: ExprContext::Store } if id == "x"
    ));
    assert_eq!(value.kind, ExprKind::Constant { value: Const::Int { value: 1 } });
}

#[test]
fn test_chained_assignment() {
    let parsed = parse_ok("x = y = 1\n");
    let StmtKind::Assign { targets, .. } = &first_stmt(&parsed).kind else {
        panic!("expected an assignment");
    };
    assert_eq!(targets.len(), 2);
}

#[test]
fn test_augmented_assignment() {
    let parsed = parse_ok("x += 1\n");
    let StmtKind::AugAssign { target, op, .. } = &first_stmt(&parsed).kind else {
        panic!("expected an augmented assignment");
    };
    assert_eq!(*op, Operator::Add);
    assert!(matches!(target.kind, ExprKind::Name { ctx: ExprContext::Store, .. }));
}

#[test]
fn test_augmented_assignment_illegal_target() {
    let err = parse_err("1 += 1\n");
    assert_eq!(
        err.message,
        "'literal' is an illegal expression for augmented assignment"
    );
}

#[test]
fn test_annotated_assignment() {
    let parsed = parse_ok("x: int = 1\n");
    let StmtKind::AnnAssign { annotation, value, simple, .. } = &first_stmt(&parsed).kind else {
        panic!("expected an annotated assignment");
    };
    assert!(*simple);
    assert!(value.is_some());
    assert!(matches!(annotation.kind, ExprKind::Name { ref id, .. } if id == "int"));
}

#[test]
fn test_assignment_to_literal() {
    let err = parse_err("1 = 2\n");
    assert_eq!(err.message, "cannot assign to literal");
}

#[test]
fn test_del_statement() {
    let parsed = parse_ok("del x, y\n");
    let StmtKind::Delete { targets } = &first_stmt(&parsed).kind else {
        panic!("expected a delete statement");
    };
    assert_eq!(targets.len(), 2);
    assert!(matches!(targets[0].kind, ExprKind::Name { ctx: ExprContext::Del, .. }));
}

#[test]
fn test_del_literal() {
    let err = parse_err("del 1\n");
    assert_eq!(err.message, "cannot delete literal");
}

#[test]
fn test_if_elif_else() {
    let parsed = parse_ok("if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n");
    let StmtKind::If { orelse, .. } = &first_stmt(&parsed).kind else {
        panic!("expected an if statement");
    };
    // elif desugars to a nested if in the else branch.
    let StmtKind::If { orelse: inner, .. } = &orelse[0].kind else {
        panic!("expected a nested if for the elif");
    };
    assert_eq!(inner.len(), 1);
}

#[test]
fn test_while_with_else() {
    let parsed = parse_ok("while a:\n    break\nelse:\n    pass\n");
    let StmtKind::While { body, orelse, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a while statement");
    };
    assert!(matches!(body[0].kind, StmtKind::Break));
    assert_eq!(orelse.len(), 1);
}

#[test]
fn test_for_loop() {
    let parsed = parse_ok("for i in range(3):\n    continue\n");
    let StmtKind::For { target, body, orelse, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a for statement");
    };
    assert!(matches!(target.kind, ExprKind::Name { ctx: ExprContext::Store, .. }));
    assert!(matches!(body[0].kind, StmtKind::Continue));
    assert!(orelse.is_empty());
}

#[test]
fn test_with_statement() {
    let parsed = parse_ok("with open(f) as fh, lock:\n    pass\n");
    let StmtKind::With { items, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a with statement");
    };
    assert_eq!(items.len(), 2);
    assert!(items[0].optional_vars.is_some());
    assert!(items[1].optional_vars.is_none());
}

#[test]
fn test_try_except_else_finally() {
    let source = "\
try:
    work()
except ValueError as exc:
    pass
except:
    pass
else:
    pass
finally:
    cleanup()
";
    let parsed = parse_ok(source);
    let StmtKind::Try { handlers, orelse, finalbody, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a try statement");
    };
    assert_eq!(handlers.len(), 2);
    assert_eq!(handlers[0].name.as_deref(), Some("exc"));
    assert!(handlers[1].r#type.is_none());
    assert_eq!(orelse.len(), 1);
    assert_eq!(finalbody.len(), 1);
}

#[test]
fn test_try_star() {
    let parsed = parse_ok("try:\n    pass\nexcept* ValueError:\n    pass\n");
    assert!(matches!(first_stmt(&parsed).kind, StmtKind::TryStar { .. }));
}

#[test]
fn test_mixed_except_and_except_star() {
    let err = parse_err("try:\n    pass\nexcept ValueError:\n    pass\nexcept* KeyError:\n    pass\n");
    assert_eq!(err.message, "cannot have both 'except' and 'except*' on the same 'try'");
}

#[test]
fn test_default_except_must_be_last() {
    let err = parse_err("try:\n    pass\nexcept:\n    pass\nexcept ValueError:\n    pass\n");
    assert_eq!(err.message, "default 'except:' must be last");
}

#[test]
fn test_try_without_handler_or_finally() {
    let err = parse_err("try:\n    pass\nx = 1\n");
    assert_eq!(err.message, "expected 'except' or 'finally' block");
}

#[test]
fn test_import_statement() {
    let parsed = parse_ok("import os.path as p, sys\n");
    let StmtKind::Import { names } = &first_stmt(&parsed).kind else {
        panic!("expected an import statement");
    };
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].name, "os.path");
    assert_eq!(names[0].asname.as_deref(), Some("p"));
    assert_eq!(names[1].asname, None);
}

#[test]
fn test_import_from_with_relative_level() {
    let parsed = parse_ok("from ..pkg import a as b, c\n");
    let StmtKind::ImportFrom { module, names, level } = &first_stmt(&parsed).kind else {
        panic!("expected a from-import statement");
    };
    assert_eq!(module.as_deref(), Some("pkg"));
    assert_eq!(*level, 2);
    assert_eq!(names.len(), 2);
}

#[test]
fn test_global_and_nonlocal() {
    let parsed = parse_ok("def f():\n    global a, b\n");
    let StmtKind::FunctionDef { body, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a function definition");
    };
    let StmtKind::Global { names } = &body[0].kind else {
        panic!("expected a global statement");
    };
    assert_eq!(names, &["a".to_owned(), "b".to_owned()]);
}

#[test]
fn test_raise_from() {
    let parsed = parse_ok("raise ValueError('bad') from exc\n");
    let StmtKind::Raise { exc, cause } = &first_stmt(&parsed).kind else {
        panic!("expected a raise statement");
    };
    assert!(exc.is_some());
    assert!(cause.is_some());
}

#[test]
fn test_assert_with_message() {
    let parsed = parse_ok("assert x, 'no'\n");
    let StmtKind::Assert { msg, .. } = &first_stmt(&parsed).kind else {
        panic!("expected an assert statement");
    };
    assert!(msg.is_some());
}

#[test]
fn test_full_parameter_list() {
    let parsed = parse_ok("def f(a, b=1, *args, c, d=2, **kw):\n    pass\n");
    let StmtKind::FunctionDef { args, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a function definition");
    };
    assert_eq!(args.args.len(), 2);
    assert_eq!(args.defaults.len(), 1);
    assert_eq!(args.vararg.as_ref().map(|a| a.arg.as_str()), Some("args"));
    assert_eq!(args.kwonlyargs.len(), 2);
    assert_eq!(args.kw_defaults[0], None);
    assert!(args.kw_defaults[1].is_some());
    assert_eq!(args.kwarg.as_ref().map(|a| a.arg.as_str()), Some("kw"));
}

#[test]
fn test_positional_only_parameters() {
    let parsed = parse_ok("def f(a, /, b):\n    pass\n");
    let StmtKind::FunctionDef { args, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a function definition");
    };
    assert_eq!(args.posonlyargs.len(), 1);
    assert_eq!(args.args.len(), 1);
}

#[test]
fn test_parameter_default_ordering() {
    let err = parse_err("def f(a=1, b):\n    pass\n");
    assert_eq!(
        err.message,
        "parameter without a default follows parameter with a default"
    );
}

#[test]
fn test_duplicate_parameter() {
    let err = parse_err("def f(x, x):\n    pass\n");
    assert_eq!(err.message, "duplicate argument 'x' in function definition");
}

#[test]
fn test_double_star_parameter_twice() {
    let err = parse_err("def f(*a, *b):\n    pass\n");
    assert_eq!(err.message, "* argument may appear only once");
}

#[test]
fn test_bare_star_without_named_parameters() {
    let err = parse_err("def f(*):\n    pass\n");
    assert_eq!(err.message, "named arguments must follow bare *");
}

#[test]
fn test_class_definition() {
    let parsed = parse_ok("class C(Base, metaclass=M):\n    pass\n");
    let StmtKind::ClassDef { name, bases, keywords, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a class definition");
    };
    assert_eq!(name, "C");
    assert_eq!(bases.len(), 1);
    assert_eq!(keywords.len(), 1);
}

#[test]
fn test_decorated_function() {
    let parsed = parse_ok("@deco(1)\n@other\ndef f():\n    pass\n");
    let StmtKind::FunctionDef { decorator_list, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a function definition");
    };
    assert_eq!(decorator_list.len(), 2);
}

#[test]
fn test_type_alias() {
    let parsed = parse_ok("type Vector = list[float]\n");
    let StmtKind::TypeAlias { name, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a type alias");
    };
    assert!(matches!(name.kind, ExprKind::Name { ref id, .. } if id == "Vector"));
}

#[test]
fn test_type_alias_version_gate() {
    let err = parse_with_version("type X = int\n", 11).unwrap_err();
    assert_eq!(err.message, "type statement is only supported in Python 3.12 and greater");
}

#[test]
fn test_except_star_version_gate() {
    let source = "try:\n    pass\nexcept* ValueError:\n    pass\n";
    let err = parse_with_version(source, 10).unwrap_err();
    assert_eq!(err.message, "except* syntax is only supported in Python 3.11 and greater");
}

#[test]
fn test_match_statement() {
    let source = "\
match command:
    case 'quit' | 'exit':
        pass
    case Point(x=0, y=0):
        pass
    case [first, *rest] if first:
        pass
    case {'key': value}:
        pass
    case other:
        pass
";
    let parsed = parse_ok(source);
    let StmtKind::Match { cases, .. } = &first_stmt(&parsed).kind else {
        panic!("expected a match statement");
    };
    assert_eq!(cases.len(), 5);
    assert!(matches!(cases[0].pattern.kind, PatternKind::MatchOr { .. }));
    assert!(matches!(cases[1].pattern.kind, PatternKind::MatchClass { .. }));
    assert!(matches!(cases[2].pattern.kind, PatternKind::MatchSequence { .. }));
    assert!(cases[2].guard.is_some());
    assert!(matches!(cases[3].pattern.kind, PatternKind::MatchMapping { .. }));
    assert!(matches!(
        cases[4].pattern.kind,
        PatternKind::MatchAs { pattern: None, name: Some(ref n) } if n == "other"
    ));
}

#[test]
fn test_match_version_gate() {
    let source = "match x:\n    case 1:\n        pass\n";
    let err = parse_with_version(source, 9).unwrap_err();
    assert_eq!(err.message, "match statement is only supported in Python 3.10 and greater");
    assert!(parse_with_version(source, 10).is_ok());
}

#[test]
fn test_match_is_still_a_valid_name() {
    let parsed = parse_ok("match = 1\n");
    assert!(matches!(first_stmt(&parsed).kind, StmtKind::Assign { .. }));
}

#[test]
fn test_wildcard_as_capture_target() {
    let err = parse_err("match x:\n    case 1 as _:\n        pass\n");
    assert_eq!(err.message, "cannot use '_' as a target");
}
