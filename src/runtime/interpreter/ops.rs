use crate::lang::code::Opcode;
use crate::runtime::data_structures::parse_stack::{IncludeFrame, Sentinel};
use crate::runtime::data_structures::value::Value;
use crate::runtime::error::{self, ScriptError};
use crate::runtime::interpreter::Interpreter;

/// The single action table shared by compile-time immediate dispatch (`compile`'s `p == 0` branch)
/// and run-time instruction stepping (`Interpreter::run`). This mirrors the reference
/// implementation calling the very same Python function either way; the consequence -- a
/// `CMD`-installed word's `Call` running at compile time -- is intentional, see `spec.md` 4.5.
pub fn dispatch(interp: &mut Interpreter, op: Opcode, datum: Value) -> error::Result<()> {
    match op {
        Opcode::Push => {
            interp.data.push_value(datum);
        }

        Opcode::Jp => {
            interp.pc = datum.as_index()?;
        }

        Opcode::Jpz => {
            if !interp.data.pop_value()?.is_truthy()? {
                interp.pc = datum.as_index()?;
            }
        }

        Opcode::Call => op_call(interp, datum)?,
        Opcode::Ret => op_ret(interp)?,

        Opcode::VPush => {
            let index = datum.as_index()?;
            let value = interp.vars.get(index)?.clone();
            interp.data.push_value(value);
        }

        Opcode::VStore => {
            let index = datum.as_index()?;
            let value = interp.data.pop_value()?;
            interp.vars.set(index, value)?;
        }

        Opcode::VIncr => interp.vars.incr(datum.as_index()?)?,
        Opcode::VDecr => interp.vars.decr(datum.as_index()?)?,

        Opcode::IPush => {
            let index = interp.data.pop_value()?.as_number()? as i64;
            let stack = interp.data.pop_value()?.as_user_stack()?;
            let items = stack.borrow();
            let resolved = resolve_index(index, items.len())?;
            interp.data.push_value(items[resolved].clone());
        }

        Opcode::IStore => {
            let element = interp.data.pop_value()?;
            let index = interp.data.pop_value()?.as_number()? as i64;
            let stack = interp.vars.get(datum.as_index()?)?.as_user_stack()?;
            let mut items = stack.borrow_mut();
            let resolved = resolve_index(index, items.len())?;
            items[resolved] = element;
        }

        Opcode::Abs => unary(interp, f64::abs)?,
        Opcode::Neg => unary(interp, |n| -n)?,
        Opcode::Round => unary(interp, |n| n.round())?,
        Opcode::Not => {
            let a = interp.data.pop_value()?;
            interp.data.push_value(Value::boolean(!a.is_truthy()?));
        }
        Opcode::Rand => {
            interp.data.push_value(Value::Number(rand::random::<f64>()));
        }

        Opcode::Add => binary(interp, |a, b| b + a)?,
        Opcode::Sub => binary(interp, |a, b| -b + a)?,
        Opcode::Mul => binary(interp, |a, b| b * a)?,
        Opcode::Div => binary(interp, |a, b| (1.0 / b) * a)?,
        Opcode::Pow => binary(interp, |a, b| a.powf(b))?,

        Opcode::Eq => compare(interp, |a, b| a == b)?,
        Opcode::Neq => compare(interp, |a, b| a != b)?,
        Opcode::Geq => compare(interp, |a, b| a >= b)?,
        Opcode::Gt => compare(interp, |a, b| a > b)?,
        Opcode::Leq => compare(interp, |a, b| a <= b)?,
        Opcode::Lt => compare(interp, |a, b| a < b)?,

        Opcode::And => compare(interp, |a, b| a != 0.0 && b != 0.0)?,
        Opcode::Or => compare(interp, |a, b| a != 0.0 || b != 0.0)?,

        Opcode::Print => {
            println!("{}", interp.data.pop_value()?);
        }

        Opcode::SPush => {
            let value = interp.data.pop_value()?;
            let stack = interp.data.pop_value()?.as_user_stack()?;
            stack.borrow_mut().push(value);
        }

        Opcode::SPop => {
            let stack = interp.data.pop_value()?.as_user_stack()?;
            let popped = stack.borrow_mut().pop();
            match popped {
                Some(value) => interp.data.push_value(value),
                None => {
                    return ScriptError::new_as_result(None, "Missing value (stack underflow)".to_string());
                }
            }
        }

        Opcode::STos => {
            let stack = interp.data.pop_value()?.as_user_stack()?;
            let items = stack.borrow();
            match items.last() {
                Some(value) => {
                    let value = value.clone();
                    drop(items);
                    interp.data.push_value(value);
                }
                None => {
                    return ScriptError::new_as_result(None, "Missing data (stack underflow)".to_string());
                }
            }
        }

        Opcode::SLen => {
            let stack = interp.data.pop_value()?.as_user_stack()?;
            let len = stack.borrow().len();
            interp.data.push_value(Value::Number(len as f64));
        }

        Opcode::FOpen => op_fopen(interp)?,
        Opcode::FClose => op_fclose(interp)?,
        Opcode::FGet => op_fget(interp)?,
        Opcode::FPut => op_fput(interp)?,

        Opcode::OpenPar => {
            interp.data.push_deferred(datum, Opcode::OpenPar, 0);
        }

        Opcode::ClosePar => drain_to_marker(interp, &datum)?,

        Opcode::CloseBra => {
            drain_to_marker(interp, &datum)?;
            interp.compile(255, Opcode::IPush, Value::Nil)?;
        }

        Opcode::StrConst => op_strconst(interp)?,
        Opcode::Comment => op_comment(interp),
        Opcode::Newline => {
            interp.compile_words(1);
            interp.line += 1;
        }

        Opcode::Def => op_def(interp)?,
        Opcode::LetAssign => {
            interp.compile_assignment(Opcode::VStore)?;
        }
        Opcode::OfAssign => {
            interp.compile_assignment(Opcode::IStore)?;
        }
        Opcode::Stack => op_stack(interp),

        Opcode::Begin => op_begin(interp, datum)?,
        Opcode::End => op_end(interp)?,

        Opcode::If => op_if(interp),
        Opcode::Then => op_then(interp)?,
        Opcode::Elif => op_elif(interp)?,
        Opcode::Else => op_else(interp)?,
        Opcode::Fi => op_fi(interp)?,

        Opcode::While => op_while(interp),
        Opcode::Do => op_do(interp)?,
        Opcode::Od => op_od(interp)?,

        Opcode::For => op_for(interp)?,
        Opcode::To => op_to(interp)?,
        Opcode::Next => op_next(interp)?,

        Opcode::Include => op_include(interp)?,
    }

    Ok(())
}

fn resolve_index(index: i64, len: usize) -> error::Result<usize> {
    let resolved = if index < 0 { index + len as i64 } else { index };

    if resolved < 0 || resolved as usize >= len {
        ScriptError::new_as_result(None, "Index out of range".to_string())
    } else {
        Ok(resolved as usize)
    }
}

fn unary(interp: &mut Interpreter, f: impl Fn(f64) -> f64) -> error::Result<()> {
    let a = interp.data.pop_value()?.as_number()?;
    interp.data.push_value(Value::Number(f(a)));
    Ok(())
}

/// Binary arithmetic pops `b` then `a` (reverse emission order) and calls `f(a, b)`; callers
/// reconstruct the correct operand order themselves (see `spec.md` 4.4's note on `SUB`/`DIV`).
fn binary(interp: &mut Interpreter, f: impl Fn(f64, f64) -> f64) -> error::Result<()> {
    let b = interp.data.pop_value()?.as_number()?;
    let a = interp.data.pop_value()?.as_number()?;
    interp.data.push_value(Value::Number(f(a, b)));
    Ok(())
}

fn compare(interp: &mut Interpreter, f: impl Fn(f64, f64) -> bool) -> error::Result<()> {
    let b = interp.data.pop_value()?.as_number()?;
    let a = interp.data.pop_value()?.as_number()?;
    interp.data.push_value(Value::boolean(f(a, b)));
    Ok(())
}

/// `CALL`: save the caller's stream and position, switch to the callee. Runs identically whether
/// invoked by the VM stepping over a `Call` instruction, or by the compiler immediately dispatching
/// a `CMD`/`PROC`/`FUNC`-defined word's priority-0 dictionary entry mid-compile.
fn op_call(interp: &mut Interpreter, datum: Value) -> error::Result<()> {
    let target = datum.as_code()?;
    interp.vars.push_call_frame(interp.code.clone(), interp.pc);
    interp.code = target;
    interp.pc = 0;
    Ok(())
}

fn op_ret(interp: &mut Interpreter) -> error::Result<()> {
    let (code, pc) = interp.vars.pop_call_frame()?;
    interp.code = code;
    interp.pc = pc;
    Ok(())
}

fn op_fopen(interp: &mut Interpreter) -> error::Result<()> {
    let mode = interp.data.pop_value()?.as_text()?;
    let name = interp.data.pop_value()?.as_text()?;
    let handle = interp.files.open(&name, &mode)?;
    interp.data.push_value(Value::FileHandle(handle));
    Ok(())
}

fn op_fclose(interp: &mut Interpreter) -> error::Result<()> {
    let handle = interp.data.pop_value()?.as_file_handle()?;
    interp.files.close(handle)?;
    Ok(())
}

fn op_fget(interp: &mut Interpreter) -> error::Result<()> {
    let handle = interp.data.pop_value()?.as_file_handle()?;
    let ch = interp.files.read_char(handle)?;
    interp.data.push_value(Value::text(ch));
    Ok(())
}

fn op_fput(interp: &mut Interpreter) -> error::Result<()> {
    let handle = interp.data.pop_value()?.as_file_handle()?;
    let code = interp.data.pop_value()?.as_number()? as i64;
    interp.files.write_char(handle, code)?;
    Ok(())
}

/// Drain `D` to the code stream until the barrier triple matching `marker` is found, consuming it
/// without re-emitting it. Shared by `)` and `]`.
fn drain_to_marker(interp: &mut Interpreter, marker: &Value) -> error::Result<()> {
    let marker_text = marker.as_text().ok();

    loop {
        if interp.data.top_deferred_priority().is_none() {
            interp.recoverable_error("Unmatched parenthesis");
            return Ok(());
        }

        let (entry_datum, entry_opcode, _) = interp.data.pop_deferred();

        if entry_opcode == Opcode::OpenPar && entry_datum.as_text().ok() == marker_text {
            return Ok(());
        }

        interp.emit(entry_opcode, entry_datum);
    }
}

fn op_strconst(interp: &mut Interpreter) -> error::Result<()> {
    let mut text = String::new();

    loop {
        match interp.lexer.scan_char() {
            None => {
                return ScriptError::new_as_result(None, "End of file inside string".to_string());
            }
            Some('"') => break,
            Some(c) => text.push(c),
        }
    }

    interp.compile(255, Opcode::Push, Value::text(text))?;
    Ok(())
}

fn op_comment(interp: &mut Interpreter) {
    loop {
        match interp.lexer.scan_char() {
            None => break,
            Some('\n') => {
                interp.line += 1;
                break;
            }
            Some(_) => continue,
        }
    }
}

fn op_def(interp: &mut Interpreter) -> error::Result<()> {
    let index = interp.vars.alloc(Value::Number(0.0));
    interp.insert_word(255, Opcode::VPush, Value::Address(index));

    if interp.lexer.scan_word() != "=" {
        interp.recoverable_error("'=' expected");
    }

    interp.compile(50, Opcode::VStore, Value::Address(index))
}

fn op_stack(interp: &mut Interpreter) {
    let index = interp.vars.alloc(Value::UserStack(Default::default()));
    interp.insert_word(255, Opcode::VPush, Value::Address(index));
}

fn op_begin(interp: &mut Interpreter, datum: Value) -> error::Result<()> {
    let priority = datum.as_index()? as u8;

    interp.parse.push_code(interp.code.clone());
    let body = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    interp.code = body.clone();
    interp.insert_word(priority, Opcode::Call, Value::Code(body));
    interp.parse.push_watermark(interp.dictionary.len());
    interp.parse.push_sentinel(Sentinel::Begin);

    Ok(())
}

fn op_end(interp: &mut Interpreter) -> error::Result<()> {
    interp.compile_words(0);

    if interp.parse.pop_sentinel()? != Sentinel::Begin {
        interp.recoverable_error("'END' without 'BEGIN'");
    }

    interp.emit(Opcode::Ret, Value::Nil);

    let watermark = interp.parse.pop_watermark()?;
    interp.dictionary.truncate(watermark);

    interp.code = interp.parse.pop_code()?;
    Ok(())
}

fn op_if(interp: &mut Interpreter) {
    interp.compile_words(1);
    interp.parse.push_sentinel(Sentinel::Fi);
    interp.parse.push_sentinel(Sentinel::If);
}

fn op_then(interp: &mut Interpreter) -> error::Result<()> {
    if interp.parse.pop_sentinel()? != Sentinel::If {
        interp.recoverable_error("'THEN' without 'IF'");
    }

    interp.compile_words(1);
    interp.emit(Opcode::Jpz, Value::Address(0));
    interp.parse.push_addr(interp.next_index() - 1);
    interp.parse.push_sentinel(Sentinel::Then);
    Ok(())
}

fn op_elif(interp: &mut Interpreter) -> error::Result<()> {
    op_else(interp)?;
    let _ = interp.parse.pop_sentinel()?;
    interp.parse.push_sentinel(Sentinel::If);
    Ok(())
}

fn op_else(interp: &mut Interpreter) -> error::Result<()> {
    if interp.parse.pop_sentinel()? != Sentinel::Then {
        interp.recoverable_error("'ELSE' without 'THEN'");
    }

    interp.compile_words(1);
    interp.emit(Opcode::Jp, Value::Address(0));
    let jpz_index = interp.parse.pop_addr()?;
    let jp_index = interp.next_index() - 1;

    interp.parse.push_addr(jp_index);
    interp.patch(jpz_index, Value::Address(jp_index + 1));
    interp.parse.push_sentinel(Sentinel::Else);
    Ok(())
}

fn op_fi(interp: &mut Interpreter) -> error::Result<()> {
    let closer = interp.parse.pop_sentinel()?;
    if closer != Sentinel::Then && closer != Sentinel::Else {
        interp.recoverable_error("'FI' without 'THEN'/'ELSE'");
    }

    interp.compile_words(1);

    loop {
        if interp.parse.top_is_sentinel(Sentinel::Fi) {
            let _ = interp.parse.pop_sentinel()?;
            break;
        }

        let index = interp.parse.pop_addr()?;
        let target = interp.next_index();
        interp.patch(index, Value::Address(target));
    }

    Ok(())
}

fn op_while(interp: &mut Interpreter) {
    interp.compile_words(1);
    interp.parse.push_addr(interp.next_index());
    interp.parse.push_sentinel(Sentinel::While);
}

fn op_do(interp: &mut Interpreter) -> error::Result<()> {
    let opener = interp.parse.pop_sentinel()?;
    if opener != Sentinel::While && opener != Sentinel::For {
        interp.recoverable_error("'DO' without 'WHILE' or 'FOR'");
    }

    interp.compile_words(1);
    interp.emit(Opcode::Jpz, Value::Address(0));
    interp.parse.push_addr(interp.next_index() - 1);
    interp.parse.push_sentinel(Sentinel::Do);
    Ok(())
}

fn op_od(interp: &mut Interpreter) -> error::Result<()> {
    if interp.parse.pop_sentinel()? != Sentinel::Do {
        interp.recoverable_error("'OD' without 'DO'");
    }

    let exit_patch = interp.parse.pop_addr()?;
    let loop_top = interp.parse.pop_addr()?;

    interp.compile_words(5);
    interp.emit(Opcode::Jp, Value::Address(loop_top));
    interp.patch(exit_patch, Value::Address(interp.next_index()));
    Ok(())
}

fn op_for(interp: &mut Interpreter) -> error::Result<()> {
    let var_index = interp.compile_assignment(Opcode::VStore)?;
    interp.parse.push_addr(var_index);
    interp.parse.push_sentinel(Sentinel::For);
    Ok(())
}

fn op_to(interp: &mut Interpreter) -> error::Result<()> {
    interp.compile_words(1);
    let loop_top = interp.next_index();

    if interp.parse.pop_sentinel()? != Sentinel::For {
        interp.recoverable_error("'TO' without 'FOR'");
    }

    let var_index = interp.parse.pop_addr()?;
    interp.compile(255, Opcode::VPush, Value::Address(var_index))?;
    interp.compile(50, Opcode::Lt, Value::Nil)?;

    interp.parse.push_addr(loop_top);
    interp.parse.push_addr(var_index);
    interp.parse.push_sentinel(Sentinel::For);
    Ok(())
}

fn op_next(interp: &mut Interpreter) -> error::Result<()> {
    if interp.parse.pop_sentinel()? != Sentinel::Do {
        interp.recoverable_error("'NEXT' without 'DO'");
    }

    let exit_patch = interp.parse.pop_addr()?;
    let var_index = interp.parse.pop_addr()?;
    let loop_top = interp.parse.pop_addr()?;

    interp.compile(255, Opcode::VIncr, Value::Address(var_index))?;
    interp.compile(255, Opcode::Jp, Value::Address(loop_top))?;
    interp.patch(exit_patch, Value::Address(interp.next_index()));
    Ok(())
}

fn op_include(interp: &mut Interpreter) -> error::Result<()> {
    let filename = interp.lexer.scan_word();

    let saved_name = interp.source_name.clone();
    let saved_lexer = std::mem::replace(&mut interp.lexer, crate::lang::tokenizing::Lexer::new(""));
    let saved_line = interp.line;

    interp.parse.push_include(IncludeFrame { name: saved_name, lexer: saved_lexer, line: saved_line });

    let path = interp.resolve_path(&filename);
    let source = std::fs::read_to_string(&path)?;

    interp.source_name = filename;
    interp.lexer = crate::lang::tokenizing::Lexer::new(&source);
    interp.line = 1;

    interp.compile_stream()?;

    let frame = interp.parse.pop_include()?;
    interp.source_name = frame.name;
    interp.lexer = frame.lexer;
    interp.line = frame.line;

    Ok(())
}
