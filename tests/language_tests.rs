use wtf::runtime::error::Result;
use wtf::runtime::interpreter::Interpreter;

/// Compile and run a program, returning whatever is left on the data stack as numbers. Most
/// programs print rather than leave a result, so individual tests usually assert on `NIL`-free
/// stack contents only when they push something deliberately and never `PRINT` it.
fn run(source: &str) -> Result<Interpreter> {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", source)?;
    interp.run()?;
    Ok(interp)
}

fn defined_var(interp: &Interpreter, name: &str) -> wtf::runtime::data_structures::value::Value {
    let index = interp.dictionary.get(interp.dictionary.find(name).unwrap()).datum.as_index().unwrap();
    interp.vars.get(index).unwrap().clone()
}

#[test]
fn arithmetic_respects_priority_and_left_associativity() {
    // `*` binds tighter than `+`, so this is 1 + (2*3) = 7, not (1+2)*3 = 9.
    let interp = run("DEF x = 1 + 2 * 3").unwrap();
    assert_eq!(defined_var(&interp, "x").as_number().unwrap(), 7.0);
}

#[test]
fn subtraction_is_left_associative() {
    // 10 - 3 - 2 should be (10 - 3) - 2 = 5, not 10 - (3 - 2) = 9.
    let interp = run("DEF r = 10 - 3 - 2").unwrap();
    assert_eq!(defined_var(&interp, "r").as_number().unwrap(), 5.0);
}

#[test]
fn define_and_reassign_a_variable() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", "DEF x = 5 LET x = x + 1").unwrap();
    interp.run().unwrap();
    let index = interp.dictionary.find("x").unwrap();
    let var_index = interp.dictionary.get(index).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(var_index).unwrap().as_number().unwrap(), 6.0);
}

#[test]
fn user_stacks_push_pop_and_report_length() {
    let mut interp = Interpreter::new();
    interp
        .compile_program("<test>", "STACK s PUSH(s 10) PUSH(s 20) DEF n = LEN(s) LET n = LEN(s)")
        .unwrap();
    interp.run().unwrap();
    let n_index = interp.dictionary.get(interp.dictionary.find("n").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(n_index).unwrap().as_number().unwrap(), 2.0);
}

#[test]
fn if_then_else_picks_the_right_branch() {
    let mut interp = Interpreter::new();
    interp
        .compile_program("<test>", "DEF r = 0 IF 1 THEN LET r = 42 ELSE LET r = 0 FI")
        .unwrap();
    interp.run().unwrap();
    let r_index = interp.dictionary.get(interp.dictionary.find("r").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(r_index).unwrap().as_number().unwrap(), 42.0);
}

#[test]
fn if_without_else_falls_through_when_false() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", "DEF r = 1 IF 0 THEN LET r = 42 FI").unwrap();
    interp.run().unwrap();
    let r_index = interp.dictionary.get(interp.dictionary.find("r").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(r_index).unwrap().as_number().unwrap(), 1.0);
}

#[test]
fn elif_chain_picks_the_matching_branch() {
    let mut interp = Interpreter::new();
    interp
        .compile_program(
            "<test>",
            "DEF r = 0 IF 0 THEN LET r = 1 ELIF 0 THEN LET r = 2 ELIF 1 THEN LET r = 3 ELSE LET r = 4 FI",
        )
        .unwrap();
    interp.run().unwrap();
    let r_index = interp.dictionary.get(interp.dictionary.find("r").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(r_index).unwrap().as_number().unwrap(), 3.0);
}

#[test]
fn while_loop_counts_down_to_zero() {
    let mut interp = Interpreter::new();
    interp
        .compile_program("<test>", "DEF i = 3 DEF total = 0 WHILE i DO LET total = total + i LET i = i - 1 OD")
        .unwrap();
    interp.run().unwrap();
    let total_index = interp.dictionary.get(interp.dictionary.find("total").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(total_index).unwrap().as_number().unwrap(), 6.0);
}

#[test]
fn for_loop_iterates_the_half_open_range() {
    // `i` must be `DEF`'d before `FOR` assigns into it, and the body needs a newline before `NEXT`
    // -- `NEXT`, unlike `OD`, does not flush the deferred stack, so an unterminated statement would
    // leak its `VStore`/`Add` past the loop instead of running on every iteration.
    let mut interp = Interpreter::new();
    interp
        .compile_program(
            "<test>",
            "DEF i = 0\nDEF total = 0\nFOR i = 1 TO 4 DO\nLET total = total + i\nNEXT",
        )
        .unwrap();
    interp.run().unwrap();
    let total_index = interp.dictionary.get(interp.dictionary.find("total").unwrap()).datum.as_index().unwrap();
    // 1 + 2 + 3 = 6; the loop stops once i reaches the bound, matching IF i < 4.
    assert_eq!(interp.vars.get(total_index).unwrap().as_number().unwrap(), 6.0);
}

#[test]
fn proc_and_func_are_also_begin_blocks_at_a_different_priority() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", "PROC noop END FUNC identity END").unwrap();
    interp.run().unwrap();
    assert!(interp.dictionary.find("noop").is_some());
    assert!(interp.dictionary.find("identity").is_some());
}

#[test]
fn end_forgets_locals_defined_inside_the_block() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", "CMD body DEF local = 1 END").unwrap();
    interp.run().unwrap();
    assert!(interp.dictionary.find("local").is_none());
    assert!(interp.dictionary.find("body").is_some());
}

#[test]
fn string_literals_compile_to_text_values() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", r#"DEF s = "" LET s = "hello""#).unwrap();
    interp.run().unwrap();
    let s_index = interp.dictionary.get(interp.dictionary.find("s").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(s_index).unwrap().as_text().unwrap().as_ref(), "hello");
}

#[test]
fn comments_are_skipped_to_end_of_line() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", "DEF x = 1 \\ this is a comment, x stays 1\nLET x = x").unwrap();
    interp.run().unwrap();
    let x_index = interp.dictionary.get(interp.dictionary.find("x").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(x_index).unwrap().as_number().unwrap(), 1.0);
}

#[test]
fn negative_indices_count_from_the_end_of_a_user_stack() {
    // `s[-1]` compiles to VPush(s), Push(-1), IPush -- Python-style tail indexing.
    let mut interp = Interpreter::new();
    interp
        .compile_program("<test>", "STACK s PUSH(s 10) PUSH(s 20) PUSH(s 30) DEF last = 0 LET last = s [ -1 ]")
        .unwrap();
    interp.run().unwrap();
    let last_index = interp.dictionary.get(interp.dictionary.find("last").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(last_index).unwrap().as_number().unwrap(), 30.0);
}

#[test]
fn of_assigns_into_a_user_stack_slot() {
    // `0 OF s = 99` compiles the index first, then ISTORE patches `s[0]` once `99` is compiled.
    let mut interp = Interpreter::new();
    interp
        .compile_program("<test>", "STACK s PUSH(s 1) PUSH(s 2) PUSH(s 3) 0 OF s = 99 DEF first = 0 LET first = s [ 0 ]")
        .unwrap();
    interp.run().unwrap();
    let first_index = interp.dictionary.get(interp.dictionary.find("first").unwrap()).datum.as_index().unwrap();
    assert_eq!(interp.vars.get(first_index).unwrap().as_number().unwrap(), 99.0);
}

#[test]
fn unknown_word_is_a_recoverable_error_not_a_panic() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", "GLORB").unwrap();
    assert_eq!(interp.error_count, 1);
}

#[test]
fn stack_underflow_is_a_fatal_error() {
    let mut interp = Interpreter::new();
    interp.compile_program("<test>", "PRINT").unwrap();
    assert!(interp.run().is_err());
}
