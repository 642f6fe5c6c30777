use crate::runtime::data_structures::value::{CodeHandle, Value};
use crate::runtime::error::{self, ScriptError};

/// One occupant of the variable stack `V`. Ordinary slots hold a user variable or user stack,
/// addressed by the fixed index handed out when `DEF`/`STACK` allocated them. `CALL` pushes a
/// `CallFrame` onto the tail of the very same stack to save the caller's position, then `RET` pops
/// it back off -- reproducing the reference interpreter's reuse of one list as both a fixed
/// variable table and a LIFO call stack, since the two never overlap: frames are always pushed
/// past every variable index already handed out, and are always popped again before anyone could
/// address past them.
enum VarSlot {
    Value(Value),
    CallFrame { code: CodeHandle, pc: usize },
}

#[derive(Default)]
pub struct VarStack {
    slots: Vec<VarSlot>,
}

impl VarStack {
    pub fn new() -> Self {
        VarStack { slots: Vec::new() }
    }

    /// Allocate a new variable (or user-stack) slot and return its fixed index.
    pub fn alloc(&mut self, value: Value) -> usize {
        let index = self.slots.len();
        self.slots.push(VarSlot::Value(value));
        index
    }

    pub fn get(&self, index: usize) -> error::Result<&Value> {
        match self.slots.get(index) {
            Some(VarSlot::Value(value)) => Ok(value),
            Some(VarSlot::CallFrame { .. }) => {
                ScriptError::new_as_result(None, "Index out of range".to_string())
            }
            None => ScriptError::new_as_result(None, "Index out of range".to_string()),
        }
    }

    pub fn set(&mut self, index: usize, value: Value) -> error::Result<()> {
        match self.slots.get_mut(index) {
            Some(slot @ VarSlot::Value(_)) => {
                *slot = VarSlot::Value(value);
                Ok(())
            }
            _ => ScriptError::new_as_result(None, "Index out of range".to_string()),
        }
    }

    pub fn incr(&mut self, index: usize) -> error::Result<()> {
        self.bump(index, 1.0)
    }

    pub fn decr(&mut self, index: usize) -> error::Result<()> {
        self.bump(index, -1.0)
    }

    fn bump(&mut self, index: usize, delta: f64) -> error::Result<()> {
        let current = self.get(index)?.as_number()?;
        self.set(index, Value::Number(current + delta))
    }

    /// Save the caller's position on `RET`urn from a `CALL`.
    pub fn push_call_frame(&mut self, code: CodeHandle, pc: usize) {
        self.slots.push(VarSlot::CallFrame { code, pc });
    }

    /// Restore the caller's position. Fails with a stack underflow if there is no frame to pop --
    /// a bare `RET` outside of any `CALL`.
    pub fn pop_call_frame(&mut self) -> error::Result<(CodeHandle, usize)> {
        match self.slots.pop() {
            Some(VarSlot::CallFrame { code, pc }) => Ok((code, pc)),
            Some(other @ VarSlot::Value(_)) => {
                self.slots.push(other);
                ScriptError::new_as_result(None, "Missing value (stack underflow)".to_string())
            }
            None => ScriptError::new_as_result(None, "Missing value (stack underflow)".to_string()),
        }
    }

    /// Number of variable slots currently allocated (used as the next slot's index).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over the variable values for `--dump-vars`. Only meaningful once execution has
    /// completed and every call frame has unwound, so every occupant is a plain value.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter().filter_map(|slot| match slot {
            VarSlot::Value(value) => Some(value),
            VarSlot::CallFrame { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_mutate() {
        let mut vars = VarStack::new();
        let i = vars.alloc(Value::Number(5.0));
        vars.incr(i).unwrap();
        assert_eq!(vars.get(i).unwrap().as_number().unwrap(), 6.0);
    }

    #[test]
    fn call_frames_do_not_disturb_variable_indices() {
        let mut vars = VarStack::new();
        let i = vars.alloc(Value::Number(1.0));
        vars.push_call_frame(CodeHandle::default(), 4);
        assert_eq!(vars.get(i).unwrap().as_number().unwrap(), 1.0);
        let (_, pc) = vars.pop_call_frame().unwrap();
        assert_eq!(pc, 4);
    }
}
