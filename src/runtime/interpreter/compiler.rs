use crate::lang::code::{Instruction, Opcode};
use crate::runtime::data_structures::value::Value;
use crate::runtime::error;
use crate::runtime::interpreter::{Interpreter, ops};

impl Interpreter {
    /// Scan words from the current lexer and compile each one until the source is exhausted, then
    /// flush whatever is left on `D`. Used both for the top-level program and for each file an
    /// `INCLUDE` pulls in.
    pub(crate) fn compile_stream(&mut self) -> error::Result<()> {
        loop {
            let word = self.lexer.scan_word();
            if word.is_empty() {
                break;
            }

            self.compile_word(&word)?;
        }

        self.compile_words(0);
        Ok(())
    }

    /// Look a scanned word up in the dictionary and compile it; failing that, probe it as a
    /// decimal float literal; failing that, report an unknown word.
    fn compile_word(&mut self, word: &str) -> error::Result<()> {
        if let Some(index) = self.dictionary.find(word) {
            let entry = self.dictionary.get(index).clone();
            self.compile(entry.priority, entry.opcode, entry.datum)?;
        } else if let Ok(number) = word.parse::<f64>() {
            self.compile(255, Opcode::Push, Value::Number(number))?;
        } else {
            self.recoverable_error(&format!("Unknown word {}", word));
        }

        Ok(())
    }

    /// The heart of the compiler: dispatch on priority band. `p == 0` runs the word immediately
    /// (every control-flow and declaration word); `p == 255` emits straight to the code stream; any
    /// other priority flushes everything binding at least as tightly, then parks the new triple.
    pub fn compile(&mut self, priority: u8, opcode: Opcode, datum: Value) -> error::Result<()> {
        if priority == 0 {
            ops::dispatch(self, opcode, datum)
        } else if priority == 255 {
            self.emit(opcode, datum);
            Ok(())
        } else {
            self.compile_words(priority);
            self.data.push_deferred(datum, opcode, priority);
            Ok(())
        }
    }

    /// Flush every deferred triple on top of `D` whose priority is `>= n`, emitting each to the
    /// code stream in pop order (this is what gives left-associativity at equal priority).
    pub fn compile_words(&mut self, n: u8) {
        while let Some(priority) = self.data.top_deferred_priority() {
            if priority < n {
                break;
            }

            let (datum, opcode, _) = self.data.pop_deferred();
            self.emit(opcode, datum);
        }
    }

    pub fn emit(&mut self, opcode: Opcode, datum: Value) {
        self.code.borrow_mut().push(Instruction::new(opcode, datum));
    }

    /// The index the next `emit` will land on -- used to record jump-placeholder and loop-top
    /// addresses on the parse stack.
    pub fn next_index(&self) -> usize {
        self.code.borrow().len()
    }

    /// Patch a previously emitted instruction's datum, used to back-fill jump targets once the
    /// real destination is known.
    pub fn patch(&mut self, index: usize, datum: Value) {
        self.code.borrow_mut()[index].datum = datum;
    }

    /// Scan a word from the source and install it as a new dictionary entry, flushing anything
    /// pending first -- `insert_word` in the reference implementation.
    pub fn insert_word(&mut self, priority: u8, opcode: Opcode, datum: Value) -> String {
        self.compile_words(1);
        let name = self.lexer.scan_word();
        self.dictionary.insert(name.clone(), priority, opcode, datum);
        name
    }

    /// Shared by `LET`/`OF`: scan a variable name, verify it really is a variable (a `VPush`
    /// entry), require `=`, then compile the assignment at priority 50 so it binds later than any
    /// expression but earlier than the next statement. Returns the variable's slot index.
    pub fn compile_assignment(&mut self, assign_opcode: Opcode) -> error::Result<usize> {
        let word = self.lexer.scan_word();

        let Some(index) = self.dictionary.find(&word) else {
            self.recoverable_error(&format!("Unknown variable {}", word));
            return Ok(0);
        };

        let entry = self.dictionary.get(index).clone();

        if entry.opcode != Opcode::VPush {
            self.recoverable_error(&format!("Unknown variable {}", word));
            return Ok(0);
        }

        if self.lexer.scan_word() != "=" {
            self.recoverable_error("'=' expected");
        }

        let var_index = entry.datum.as_index()?;
        self.compile(50, assign_opcode, Value::Address(var_index))?;

        Ok(var_index)
    }
}
