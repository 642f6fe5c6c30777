//! Parameterized coverage of the arithmetic/comparison/logic words, one `test_case` per operator
//! scenario, in the style of the teacher's `forth_rs_param_tests.rs`.

use test_case::test_case;
use wtf::runtime::interpreter::Interpreter;

/// Compile `DEF r = <expr>`, run it, and return `r`'s final number.
fn eval(expr: &str) -> f64 {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", &format!("DEF r = {}", expr)).unwrap();
    interp.run().unwrap();
    let r_index = interp.dictionary.get(interp.dictionary.find("r").unwrap()).datum.as_index().unwrap();
    interp.vars.get(r_index).unwrap().as_number().unwrap()
}

#[test_case("2 + 3", 5.0; "add")]
#[test_case("10 - 3 - 2", 5.0; "sub_is_left_associative")]
#[test_case("2 * 3 + 1", 7.0; "mul_binds_tighter_than_add")]
#[test_case("1 + 2 * 3", 7.0; "mul_binds_tighter_than_add_reversed")]
#[test_case("12 / 3", 4.0; "div")]
#[test_case("2 ** 10", 1024.0; "pow")]
#[test_case("NEG 5", -5.0; "neg")]
#[test_case("ABS 5", 5.0; "abs_of_positive")]
#[test_case("ROUND 2.6", 3.0; "round_up")]
#[test_case("ROUND 2.4", 2.0; "round_down")]
#[test_case("3 < 4", 1.0; "lt_true")]
#[test_case("4 < 3", 0.0; "lt_false")]
#[test_case("3 <= 3", 1.0; "leq_true_on_equal")]
#[test_case("4 <= 3", 0.0; "leq_false")]
#[test_case("3 > 4", 0.0; "gt_false")]
#[test_case("4 > 3", 1.0; "gt_true")]
#[test_case("3 >= 3", 1.0; "geq_true_on_equal")]
#[test_case("3 = 3", 1.0; "eq_true")]
#[test_case("3 = 4", 0.0; "eq_false")]
#[test_case("3 <> 4", 1.0; "neq_true")]
#[test_case("3 <> 3", 0.0; "neq_false")]
#[test_case("1 AND 1", 1.0; "and_true_true")]
#[test_case("1 AND 0", 0.0; "and_true_false")]
#[test_case("0 OR 1", 1.0; "or_false_true")]
#[test_case("0 OR 0", 0.0; "or_false_false")]
#[test_case("NOT 0", 1.0; "not_false")]
#[test_case("NOT 1", 0.0; "not_true")]
fn operator_scenarios(expr: &str, expected: f64) {
    assert_eq!(eval(expr), expected);
}
