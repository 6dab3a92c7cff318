//! Drives the public `Runner` API against `spec.md` §8's negative cases.

use teko::exception::ExcKind;
use teko::run_source;

#[test]
fn declaration_type_mismatch() {
    let err = run_source("int x = \"a\";").unwrap_err();
    assert_eq!(err.kind, ExcKind::Static);
}

#[test]
fn missing_initializer_with_no_declared_type() {
    let err = run_source("let x; x = 1;").unwrap_err();
    assert_eq!(err.kind, ExcKind::Static);
}

#[test]
fn void_is_a_forbidden_declared_type() {
    let err = run_source("void v;").unwrap_err();
    assert_eq!(err.kind, ExcKind::Static);
}

#[test]
fn positional_argument_after_keyword_argument() {
    let err = run_source("print(obj=1, 2);").unwrap_err();
    assert_eq!(err.kind, ExcKind::Static);
}
