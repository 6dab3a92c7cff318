//! Drives the public `Runner` API against `spec.md` §8's concrete scenario
//! table, asserting on captured `print` output rather than process stdout.

use teko::io::CollectStringPrint;
use teko::Runner;

fn run_capturing(source: &str) -> String {
    let sink = CollectStringPrint::new();
    let mut runner = Runner::with_output(Box::new(sink.clone()));
    runner.run(source).expect("scenario should run to completion");
    sink.output()
}

#[test]
fn scenario_1_arithmetic_precedence() {
    assert_eq!(run_capturing("int a = 3 + 4 * 2; print($a);"), "11");
}

#[test]
fn scenario_2_string_concat() {
    assert_eq!(run_capturing("str s = \"he\" + \"llo\"; print($s);"), "hello");
}

#[test]
fn scenario_3_if_else() {
    assert_eq!(run_capturing("if (3 < 5) { print(\"y\"); } else { print(\"n\"); }"), "y");
}

#[test]
fn scenario_4_while_loop() {
    assert_eq!(run_capturing("int i = 0; while (i < 3) { print($i); i = i + 1; }"), "012");
}

#[test]
fn scenario_5_not_and_eq() {
    assert_eq!(run_capturing("bool b = !(1 == 2); print($b);"), "true");
}

#[test]
fn scenario_6_chained_assignment() {
    assert_eq!(run_capturing("int x = 1; x = x + x; x = x * 3; print($x);"), "6");
}

#[test]
fn scenario_7_string_mutation_assert() {
    assert_eq!(run_capturing("str s = \"a\"; s = s + \"b\"; assert(s == \"ab\");"), "");
}

#[test]
fn scenario_8_exponent() {
    assert_eq!(run_capturing("print($ (2 ^ 10));"), "1024");
}

#[test]
fn scenario_9_real_arithmetic() {
    assert_eq!(run_capturing("int a = 2; real r = 2.5; r = r + 1.0; print($r);"), "3.5");
}

#[test]
fn scenario_10_for_over_list() {
    assert_eq!(run_capturing("for (int k in {1, 2, 3}) { print($k); }"), "123");
}
