use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

use crate::lang::code::CodeStream;
use crate::runtime::error::{self, ScriptError};

/// A growable, heap-allocated user stack, as created by the `STACK` word. Shared by reference so
/// that a variable slot holding one and a value copied off the data stack alias the same storage.
pub type UserStack = Rc<RefCell<Vec<Value>>>;

/// A compiled stream of instructions, shared by reference. A `BEGIN`-family word allocates one of
/// these for its body and installs it as the `datum` of the dictionary entry that names it, so
/// that `CALL` can switch the active stream to it; dictionary entries, `CALL`/`RET` save-frames and
/// the interpreter's own "currently being built/executed" stream pointer all alias the same
/// logical stream through this handle rather than through a raw pointer.
pub type CodeHandle = Rc<RefCell<CodeStream>>;

/// Core value enumeration used by the interpreter. A boolean is simply a `Number` of `0.0` or
/// `1.0`, matching the reference implementation's `float(a == b)` idiom.
#[derive(Clone)]
pub enum Value {
    /// No value. Used as the literal datum of words that carry no data of their own.
    Nil,

    /// A double precision number. Every arithmetic, comparison and logic word operates on this
    /// variant; booleans are its `0.0`/`1.0` subset.
    Number(f64),

    /// An immutable text string, produced by `"..."` literals.
    Text(Rc<str>),

    /// An open file, as returned by `FOPEN`.
    FileHandle(i64),

    /// A user-defined stack, as created by `STACK`.
    UserStack(UserStack),

    /// A non-negative index: a jump target in the current code stream, or a slot in the variable
    /// stack.
    Address(usize),

    /// A handle to a compiled code stream, the `datum` of a `BEGIN`-family word's `CALL` entry.
    Code(CodeHandle),
}

impl Value {
    pub fn text(s: impl Into<Rc<str>>) -> Self {
        Value::Text(s.into())
    }

    pub fn boolean(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    pub fn is_truthy(&self) -> error::Result<bool> {
        Ok(self.as_number()? != 0.0)
    }

    pub fn as_number(&self) -> error::Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => ScriptError::new_as_result(
                None,
                format!("Expected a number, got {}", other.type_name()),
            ),
        }
    }

    pub fn as_index(&self) -> error::Result<usize> {
        match self {
            Value::Address(i) => Ok(*i),
            Value::Number(n) => Ok(*n as usize),
            other => ScriptError::new_as_result(
                None,
                format!("Expected an address, got {}", other.type_name()),
            ),
        }
    }

    pub fn as_text(&self) -> error::Result<Rc<str>> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            other => ScriptError::new_as_result(
                None,
                format!("Expected text, got {}", other.type_name()),
            ),
        }
    }

    pub fn as_file_handle(&self) -> error::Result<i64> {
        match self {
            Value::FileHandle(fd) => Ok(*fd),
            other => ScriptError::new_as_result(
                None,
                format!("Expected a file handle, got {}", other.type_name()),
            ),
        }
    }

    pub fn as_user_stack(&self) -> error::Result<UserStack> {
        match self {
            Value::UserStack(stack) => Ok(stack.clone()),
            other => ScriptError::new_as_result(
                None,
                format!("Expected a stack, got {}", other.type_name()),
            ),
        }
    }

    pub fn as_code(&self) -> error::Result<CodeHandle> {
        match self {
            Value::Code(code) => Ok(code.clone()),
            other => ScriptError::new_as_result(
                None,
                format!("Expected a code stream, got {}", other.type_name()),
            ),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::FileHandle(_) => "file handle",
            Value::UserStack(_) => "stack",
            Value::Address(_) => "address",
            Value::Code(_) => "code stream",
        }
    }
}

/// Render a number the way the reference implementation's `print(float)` does: always with a
/// decimal point, so `7` prints as `7.0`.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(formatter, "None"),
            Value::Number(n) => write!(formatter, "{}", format_number(*n)),
            Value::Text(s) => write!(formatter, "{}", s),
            Value::FileHandle(fd) => write!(formatter, "<file {}>", fd),
            Value::UserStack(stack) => {
                let items = stack.borrow();
                write!(formatter, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(formatter, ", ")?;
                    }
                    write!(formatter, "{}", item)?;
                }
                write!(formatter, "]")
            }
            Value::Address(i) => write!(formatter, "{}", i),
            Value::Code(stream) => write!(formatter, "<code {} instructions>", stream.borrow().len()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(Rc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_with_decimal_point() {
        assert_eq!(format!("{}", Value::Number(7.0)), "7.0");
        assert_eq!(format!("{}", Value::Number(0.5)), "0.5");
    }

    #[test]
    fn truthiness_matches_nonzero() {
        assert!(Value::Number(1.0).is_truthy().unwrap());
        assert!(!Value::Number(0.0).is_truthy().unwrap());
    }

    #[test]
    fn wrong_type_access_is_an_error() {
        assert!(Value::text("hi").as_number().is_err());
    }
}
