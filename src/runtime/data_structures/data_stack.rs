use crate::lang::code::Opcode;
use crate::runtime::data_structures::value::Value;
use crate::runtime::error::{self, ScriptError};

/// One occupant of the data stack `D`. During compilation a word of priority `1..=254` parks an
/// operator triple here to wait for a later, lower-or-equal-priority word to flush it; every other
/// occupant -- at compile time once a phrase is fully flushed, and always at run time -- is a plain
/// `Value`. This mirrors the reference interpreter's trick of using one physical stack for both
/// roles; see DESIGN.md for why a tagged enum replaces that dynamic typing here.
enum Slot {
    Value(Value),
    Deferred { datum: Value, opcode: Opcode, priority: u8 },
}

/// The shared data stack `D`: the compiler's deferred-operator stack and the VM's operand stack
/// are the same physical structure, just used in different phases of a program's life.
#[derive(Default)]
pub struct DataStack {
    slots: Vec<Slot>,
}

impl DataStack {
    pub fn new() -> Self {
        DataStack { slots: Vec::new() }
    }

    pub fn push_value(&mut self, value: Value) {
        self.slots.push(Slot::Value(value));
    }

    pub fn push_deferred(&mut self, datum: Value, opcode: Opcode, priority: u8) {
        self.slots.push(Slot::Deferred { datum, opcode, priority });
    }

    /// Pop a plain value. Fails with a stack underflow if the stack is empty, or if the top is a
    /// stray deferred triple -- the latter should never happen in a well-formed program since
    /// `compile_words(0)` flushes every deferred entry before execution begins.
    pub fn pop_value(&mut self) -> error::Result<Value> {
        match self.slots.pop() {
            Some(Slot::Value(value)) => Ok(value),
            Some(Slot::Deferred { .. }) => {
                ScriptError::new_as_result(None, "Missing value (stack underflow)".to_string())
            }
            None => ScriptError::new_as_result(None, "Missing value (stack underflow)".to_string()),
        }
    }

    /// The priority of the deferred triple on top of the stack, if there is one. Used by
    /// `compile_words` to decide whether to keep flushing.
    pub fn top_deferred_priority(&self) -> Option<u8> {
        match self.slots.last() {
            Some(Slot::Deferred { priority, .. }) => Some(*priority),
            _ => None,
        }
    }

    /// Pop the deferred triple on top of the stack. Panics if the top isn't a deferred triple --
    /// callers must check `top_deferred_priority` first.
    pub fn pop_deferred(&mut self) -> (Value, Opcode, u8) {
        match self.slots.pop() {
            Some(Slot::Deferred { datum, opcode, priority }) => (datum, opcode, priority),
            _ => panic!("pop_deferred called with no deferred triple on top"),
        }
    }

    /// True once every deferred triple has been flushed to the code stream and only plain values
    /// remain (ideally none, at a well-formed program's end).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip() {
        let mut stack = DataStack::new();
        stack.push_value(Value::Number(3.0));
        assert_eq!(stack.pop_value().unwrap().as_number().unwrap(), 3.0);
    }

    #[test]
    fn deferred_triples_report_their_priority() {
        let mut stack = DataStack::new();
        assert_eq!(stack.top_deferred_priority(), None);

        stack.push_deferred(Value::Nil, Opcode::Add, 100);
        assert_eq!(stack.top_deferred_priority(), Some(100));

        let (_, opcode, priority) = stack.pop_deferred();
        assert_eq!(opcode, Opcode::Add);
        assert_eq!(priority, 100);
        assert!(stack.is_empty());
    }

    #[test]
    fn underflow_on_empty_stack_is_an_error() {
        let mut stack = DataStack::new();
        assert!(stack.pop_value().is_err());
    }
}
