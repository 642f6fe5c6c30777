use crate::lang::code::Opcode;
use crate::runtime::data_structures::value::Value;

/// One quadruple of the dictionary: a name, its compile-time priority, and the opcode+datum pair
/// that `compile()` acts on when the name is looked up. See `runtime::interpreter::compiler` for
/// how the three priority bands (0 = immediate, 255 = literal, else deferred) are interpreted.
#[derive(Clone)]
pub struct DictEntry {
    pub name: String,
    pub priority: u8,
    pub opcode: Opcode,
    pub datum: Value,
}

/// The word dictionary: a flat, append-only sequence of entries, newest last. Lookup scans from
/// the tail backward so that a later definition shadows an earlier one of the same name for free;
/// `truncate` drops entries back to a previously recorded length, which is how `END` erases the
/// locals of a `BEGIN`-family block.
#[derive(Default)]
pub struct Dictionary {
    entries: Vec<DictEntry>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary { entries: Vec::new() }
    }

    /// Append a new entry to the dictionary. Shadowing a same-named entry is permitted (see
    /// DESIGN.md's note on the "word already defined" check the reference implementation disabled).
    pub fn insert(&mut self, name: String, priority: u8, opcode: Opcode, datum: Value) {
        self.entries.push(DictEntry { name, priority, opcode, datum });
    }

    /// Find the index of the newest entry with the given name, if any.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.name == name)
    }

    pub fn get(&self, index: usize) -> &DictEntry {
        &self.entries[index]
    }

    /// How many entries are currently in the dictionary. Recorded by `BEGIN` as a watermark and
    /// restored to by `END` via `truncate`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries back down to `len`, erasing everything defined since the watermark was taken.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DictEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_prefers_newest_entry() {
        let mut dict = Dictionary::new();
        dict.insert("X".to_string(), 255, Opcode::Push, Value::Number(1.0));
        dict.insert("X".to_string(), 255, Opcode::Push, Value::Number(2.0));

        let index = dict.find("X").unwrap();
        assert_eq!(dict.get(index).datum.as_number().unwrap(), 2.0);
    }

    #[test]
    fn truncate_restores_a_watermark() {
        let mut dict = Dictionary::new();
        dict.insert("A".to_string(), 0, Opcode::Ret, Value::Nil);
        let watermark = dict.len();
        dict.insert("B".to_string(), 0, Opcode::Ret, Value::Nil);
        dict.insert("C".to_string(), 0, Opcode::Ret, Value::Nil);

        dict.truncate(watermark);

        assert_eq!(dict.len(), watermark);
        assert!(dict.find("B").is_none());
        assert!(dict.find("A").is_some());
    }
}
