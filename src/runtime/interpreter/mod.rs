use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::lang::code::{CodeStream, pretty_print_code};
use crate::lang::tokenizing::Lexer;
use crate::runtime::data_structures::data_stack::DataStack;
use crate::runtime::data_structures::dictionary::Dictionary;
use crate::runtime::data_structures::parse_stack::ParseStack;
use crate::runtime::data_structures::value::CodeHandle;
use crate::runtime::data_structures::var_stack::VarStack;
use crate::runtime::error;

/// The priority-shunt compiler core: `compile`, `compile_words`, the word-dispatch loop and the
/// handful of assignment-parsing helpers shared by `DEF`/`LET`/`OF`/`FOR`.
pub mod compiler;

/// The table of built-in words, installed into a fresh `Dictionary` at startup.
pub mod builtins;

/// File handles opened by `FOPEN`/`INCLUDE`.
pub mod files;

/// The single dispatcher shared by compile-time immediate execution and run-time instruction
/// stepping -- see `spec.md` 4.5's note on why a `CMD`-defined word's `CALL` runs identically in
/// both phases.
pub mod ops;

use files::FileTable;

/// The interpreter: the four stacks (`D`, `C`, `P`, `V`), the dictionary, and the compile-time
/// reader state, all as one process-wide mutable bundle -- see `spec.md` 5 on why this is
/// intentionally not made reentrant or thread-safe.
pub struct Interpreter {
    pub dictionary: Dictionary,
    pub data: DataStack,
    pub vars: VarStack,
    pub parse: ParseStack,
    pub files: FileTable,

    /// The code stream currently being appended to (at compile time) or executed (at run time).
    /// `BEGIN`/`CALL` swap this out and `END`/`RET` swap it back; see `ops::op_call`.
    pub code: CodeHandle,
    /// The program counter into `code`, meaningful only once execution has begun.
    pub pc: usize,
    /// The top-level code stream, recorded once compilation finishes, so `run`/`--dump-obj` always
    /// have a stable handle to the program entry point regardless of where `code` has wandered off
    /// to mid-execution.
    pub entry: CodeHandle,

    pub lexer: Lexer,
    pub source_name: String,
    /// The current 1-based source line. Bumped only by the `NEWLINE` and `\` (comment) words, not
    /// by the lexer itself. `0` suppresses the `source:line:` prefix on diagnostics, used once
    /// compilation has finished.
    pub line: usize,

    pub error_count: usize,
    pub search_paths: Vec<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let mut dictionary = Dictionary::new();
        builtins::register(&mut dictionary);

        let entry: CodeHandle = Rc::new(RefCell::new(CodeStream::new()));

        Interpreter {
            dictionary,
            data: DataStack::new(),
            vars: VarStack::new(),
            parse: ParseStack::new(),
            files: FileTable::new(),
            code: entry.clone(),
            pc: 0,
            entry,
            lexer: Lexer::new(""),
            source_name: "<none>".to_string(),
            line: 0,
            error_count: 0,
            search_paths: Vec::new(),
        }
    }

    pub fn add_search_path(&mut self, path: String) {
        self.search_paths.push(path);
    }

    /// Resolve a file name for `INCLUDE`/`FOPEN`: try it as given first, then under each search
    /// path in order (current directory is implicit since a bare relative name is tried first).
    pub fn resolve_path(&self, name: &str) -> String {
        if Path::new(name).exists() {
            return name.to_string();
        }

        for base in &self.search_paths {
            let candidate = Path::new(base).join(name);
            if candidate.exists() {
                return candidate.to_string_lossy().into_owned();
            }
        }

        name.to_string()
    }

    /// Compile an entire top-level program from source text.
    pub fn compile_program(&mut self, name: &str, source: &str) -> error::Result<()> {
        self.source_name = name.to_string();
        self.lexer = Lexer::new(source);
        self.line = 1;

        self.compile_stream()?;

        self.line = 0;
        self.entry = self.code.clone();

        Ok(())
    }

    /// Report a recoverable diagnostic: print it, tally it, and give up after 100 of them, exactly
    /// as the reference interpreter's `error_on` does.
    pub fn recoverable_error(&mut self, message: &str) {
        if self.line > 0 {
            println!("{}:{}: WTF! {}", self.source_name, self.line, message);
        } else {
            println!("WTF! {}", message);
        }

        self.error_count += 1;

        if self.error_count > 100 {
            println!("That makes 100 errors: I give up!");
            std::process::exit(-1);
        }
    }

    /// Run the compiled top-level program. Only meaningful once compilation completed with zero
    /// recoverable errors.
    pub fn run(&mut self) -> error::Result<()> {
        self.code = self.entry.clone();
        self.pc = 0;

        loop {
            let len = self.code.borrow().len();
            if self.pc >= len {
                break;
            }

            let (op, datum) = {
                let code = self.code.borrow();
                let instruction = &code[self.pc];
                (instruction.op, instruction.datum.clone())
            };

            self.pc += 1;
            ops::dispatch(self, op, datum)?;
        }

        Ok(())
    }

    pub fn dump_obj(&self) -> String {
        let mut out = String::from("\nCode dump\n");
        out.push_str(&pretty_print_code(&self.entry.borrow()));
        out
    }

    pub fn dump_dict(&self) -> String {
        let mut out = String::from("\nDictionary dump\n");
        for entry in self.dictionary.iter() {
            out.push_str(&format!(
                "{} {} {:?} {}\n",
                entry.name, entry.priority, entry.opcode, entry.datum
            ));
        }
        out
    }

    pub fn dump_vars(&self) -> String {
        let mut out = String::from("\nVariables dump\n");
        for (i, value) in self.vars.values().enumerate() {
            out.push_str(&format!("{}: {}\n", i, value));
        }
        out
    }
}
