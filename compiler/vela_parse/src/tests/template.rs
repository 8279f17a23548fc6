//! Template definition and instantiation tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use vela_diagnostic::ErrorCode;
use vela_ir::ast::decl::{
    BindingOperator, DefItem, ModuleItem, Template, TemplateItem,
};

use super::{parse_err, parse_ok, Parsed};

fn first_template(parsed: &Parsed) -> &Template {
    match &parsed.module.body[0] {
        ModuleItem::Template(template) => template,
        other => panic!("expected a template, got {other:?}"),
    }
}

#[test]
fn test_basic_template() {
    let source = "\
template Field(label, value):
    Label:
        text = label
";
    let parsed = parse_ok(source);
    let template = first_template(&parsed);
    assert_eq!(template.name, "Field");
    assert_eq!(template.parameters.positional.len(), 2);
    assert!(template.parameters.keywords.is_empty());
    assert!(template.parameters.starparam.is_none());
    assert!(matches!(template.body[0], TemplateItem::Child(_)));
}

#[test]
fn test_specialized_and_keyword_parameters() {
    let source = "\
template Grid(rows: int, columns=2, *extra):
    pass
";
    let parsed = parse_ok(source);
    let params = &first_template(&parsed).parameters;
    assert_eq!(params.positional.len(), 1);
    assert!(params.positional[0].specialization.is_some());
    assert_eq!(params.keywords.len(), 1);
    assert_eq!(params.keywords[0].name, "columns");
    assert_eq!(params.starparam.as_deref(), Some("extra"));
    let names: Vec<&str> = params.names().collect();
    assert_eq!(names, vec!["rows", "columns", "extra"]);
}

#[test]
fn test_template_docstring() {
    let source = "\
template Field(label):
    '''A labeled field.'''
    pass
";
    let parsed = parse_ok(source);
    assert_eq!(first_template(&parsed).docstring.as_deref(), Some("A labeled field."));
}

#[test]
fn test_duplicate_parameter_name() {
    let err = parse_err("template Foo(x, x):\n    pass\n");
    assert_eq!(err.code, ErrorCode::E2001);
    assert_eq!(err.message, "duplicate parameter name 'x'");
}

#[test]
fn test_positional_after_keyword_parameter() {
    let err = parse_err("template Foo(a=1, b):\n    pass\n");
    assert_eq!(err.code, ErrorCode::E1005);
    assert_eq!(err.message, "a positional parameter may not follow a keyword parameter");
}

#[test]
fn test_const_shadows_parameter() {
    let err = parse_err("template Foo(x):\n    const x = 1\n");
    assert_eq!(err.code, ErrorCode::E2002);
    assert_eq!(err.message, "declaration of 'const x' shadows a parameter");
}

#[test]
fn test_const_shadows_previous_const() {
    let source = "\
template Foo(y):
    const x = 1
    const x = 2
";
    let err = parse_err(source);
    assert_eq!(err.message, "declaration of 'const x' shadows a previous declaration");
}

#[test]
fn test_template_consts_and_children() {
    let source = "\
template Padded(content):
    const margin = 4
    Container:
        padding = margin
";
    let parsed = parse_ok(source);
    let template = first_template(&parsed);
    assert_eq!(template.body.len(), 2);
    let TemplateItem::Const(item) = &template.body[0] else {
        panic!("expected a const");
    };
    assert_eq!(item.name, "margin");
}

#[test]
fn test_template_instantiation_in_enamldef() {
    let source = "\
enamldef Form(Container):
    Field('Name', owner.name): lbl, fld:
        fld.enabled = True
";
    let parsed = parse_ok(source);
    let ModuleItem::EnamlDef(def) = &parsed.module.body[0] else {
        panic!("expected an enamldef");
    };
    let DefItem::TemplateInst(inst) = &def.body[0] else {
        panic!("expected a template instantiation");
    };
    assert_eq!(inst.name, "Field");
    assert_eq!(inst.arguments.args.len(), 2);
    assert!(inst.arguments.stararg.is_none());
    let identifiers = inst.identifiers.as_ref().expect("identifiers clause");
    assert_eq!(identifiers.names, vec!["lbl".to_owned(), "fld".to_owned()]);
    assert!(identifiers.starname.is_none());

    let binding = &inst.body[0];
    assert_eq!(binding.name, "fld");
    assert_eq!(binding.chain, vec!["enabled".to_owned()]);
    assert_eq!(binding.expr.operator, BindingOperator::Eq);
}

#[test]
fn test_template_instantiation_star_arguments() {
    let source = "\
template Looper(items):
    Inner(*items): *objects:
        pass
";
    let parsed = parse_ok(source);
    let TemplateItem::TemplateInst(inst) = &first_template(&parsed).body[0] else {
        panic!("expected a template instantiation");
    };
    assert!(inst.arguments.stararg.is_some());
    let identifiers = inst.identifiers.as_ref().expect("identifiers clause");
    assert!(identifiers.names.is_empty());
    assert_eq!(identifiers.starname.as_deref(), Some("objects"));
    assert!(identifiers.declares("objects"));
}

#[test]
fn test_generator_template_argument() {
    let source = "\
template Rows(items):
    Inner(x * 2 for x in items): pass
";
    let parsed = parse_ok(source);
    let TemplateItem::TemplateInst(inst) = &first_template(&parsed).body[0] else {
        panic!("expected a template instantiation");
    };
    assert_eq!(inst.arguments.args.len(), 1);
}

#[test]
fn test_unknown_instantiation_identifier() {
    let source = "\
enamldef Form(Container):
    Field('Name'): lbl:
        other.text = 'x'
";
    let err = parse_err(source);
    assert_eq!(err.code, ErrorCode::E2005);
    assert_eq!(err.message, "unknown template instantiation identifier 'other'");
}

#[test]
fn test_instantiation_binding_requires_chain() {
    let source = "\
enamldef Form(Container):
    Field('Name'): lbl:
        lbl = 'x'
";
    let err = parse_err(source);
    assert_eq!(err.message, "expected '.' after the identifier");
}

#[test]
fn test_duplicate_instantiation_identifiers_warn() {
    let source = "\
enamldef Form(Container):
    Label: fld:
        pass
    Field('Name'): fld:
        pass
";
    let parsed = parse_ok(source);
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].message, "redefinition of identifier 'fld'");
}

#[test]
fn test_pragma_before_template() {
    let source = "\
pragma unroll
template Foo(x):
    pass
";
    let parsed = parse_ok(source);
    let template = first_template(&parsed);
    assert_eq!(template.pragmas.len(), 1);
    assert_eq!(template.pragmas[0].command, "unroll");
}
