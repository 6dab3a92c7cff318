//! Component-level parser tests: brace-kind disambiguation and the `<`/`>`
//! overload (`spec.md` §4.C).

use teko::ast::{Expr, Stmt};
use teko::tag::{Brace, ConvOp};

fn parse(src: &str) -> Vec<Stmt> {
    let tags = teko::tag::tag_source(src).expect("tagging should succeed");
    teko::parser::parse_program(&tags).expect("parsing should succeed")
}

#[test]
fn curly_after_declared_label_is_a_container_literal() {
    let stmts = parse("int{} a = {1, 2, 3};");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(matches!(decls[0].type_expr, Some(Expr::Conversion(_, ConvOp::Curly, _))));
    assert!(matches!(decls[0].initializer, Some(Expr::Sequence(Brace::Curly, _, _))));
}

#[test]
fn bare_curly_block_is_a_codeblock_not_a_sequence() {
    let stmts = parse("int f() = { 1 + 1; };");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(decls[0].struct_params.is_some(), "a struct-parameter-list declaration is a function");
    assert!(matches!(decls[0].initializer, Some(Expr::CodeBlock(..))));
}

#[test]
fn angle_brackets_parse_as_a_set_literal() {
    let stmts = parse("let s = <1, 2, 3>;");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(matches!(decls[0].initializer, Some(Expr::Sequence(Brace::Angle, _, _))));
}

#[test]
fn less_than_inside_parens_is_a_comparison_not_a_set_open() {
    let stmts = parse("let b = (1 < 2);");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(matches!(decls[0].initializer, Some(Expr::Comparison(..))));
}

#[test]
fn struct_type_literal_vs_grouping_parens() {
    let stmts = parse("let t = (int x, int y);");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(matches!(decls[0].initializer, Some(Expr::NewStruct(..))));

    let stmts = parse("let g = (1 + 2);");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(matches!(decls[0].initializer, Some(Expr::BinOp(..))));
}

#[test]
fn bare_dot_postfix_is_a_toreal_conversion() {
    let stmts = parse("let r = 3 .;");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(matches!(decls[0].initializer, Some(Expr::Conversion(_, ConvOp::ToReal, _))));
}

#[test]
fn dollar_prefix_is_a_tostr_conversion() {
    let stmts = parse("let s = $3;");
    let Stmt::Declaration(decls, _) = &stmts[0] else { panic!("expected a declaration") };
    assert!(matches!(decls[0].initializer, Some(Expr::Conversion(_, ConvOp::ToStr, _))));
}
