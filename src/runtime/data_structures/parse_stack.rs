use crate::lang::tokenizing::Lexer;
use crate::runtime::data_structures::value::CodeHandle;
use crate::runtime::error::{self, ScriptError};

/// The marker a block-opening word leaves on the parse stack `P`, identifying which construct is
/// currently open so the matching closer can verify it and report a structured mismatch instead
/// of silently misinterpreting a stray token.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sentinel {
    /// Pushed by `IF`; consumed, eventually, by `FI`.
    Fi,
    /// Pushed by `IF` and re-pushed by `ELIF`; consumed by `THEN`.
    If,
    /// Pushed by `THEN`; consumed by `ELSE` or `FI`.
    Then,
    /// Pushed by `ELSE`; consumed by `FI`.
    Else,
    /// Pushed by `WHILE`; consumed by `DO`.
    While,
    /// Pushed by `DO`; consumed by `OD` or `NEXT`.
    Do,
    /// Pushed by `FOR` and re-pushed by `TO`; consumed by `DO`.
    For,
    /// Pushed by a `BEGIN`-family word; consumed by `END`.
    Begin,
}

/// Saved state for a nested `INCLUDE`: the including file's name, its lexer (so scanning can
/// resume exactly where it left off), and its line counter.
pub struct IncludeFrame {
    pub name: String,
    pub lexer: Lexer,
    pub line: usize,
}

/// One occupant of the parse stack `P`. Each block construct pushes a prescribed pattern of these
/// (see `spec.md` 4.5); reimplemented as a tagged union per DESIGN.md rather than the reference
/// implementation's untyped list so each `pop_*` can validate the variant it expected.
pub enum ParseSlot {
    Sentinel(Sentinel),
    /// A patch address: either a jump-target placeholder waiting to be filled in, or a saved
    /// "return to here" address (the `WHILE`/`FOR` loop top).
    Addr(usize),
    /// A dictionary-length watermark, recorded by a `BEGIN`-family word and restored by `END`.
    Watermark(usize),
    /// The enclosing code stream, saved by a `BEGIN`-family word while its body is compiled.
    Code(CodeHandle),
    /// Saved reader state for a nested `INCLUDE`.
    Include(Box<IncludeFrame>),
}

/// The compile-time auxiliary stack `P`, used by every block-structured control construct to keep
/// track of nesting.
#[derive(Default)]
pub struct ParseStack {
    slots: Vec<ParseSlot>,
}

impl ParseStack {
    pub fn new() -> Self {
        ParseStack { slots: Vec::new() }
    }

    pub fn push(&mut self, slot: ParseSlot) {
        self.slots.push(slot);
    }

    pub fn push_sentinel(&mut self, sentinel: Sentinel) {
        self.push(ParseSlot::Sentinel(sentinel));
    }

    pub fn push_addr(&mut self, addr: usize) {
        self.push(ParseSlot::Addr(addr));
    }

    pub fn push_watermark(&mut self, watermark: usize) {
        self.push(ParseSlot::Watermark(watermark));
    }

    pub fn push_code(&mut self, code: CodeHandle) {
        self.push(ParseSlot::Code(code));
    }

    pub fn push_include(&mut self, frame: IncludeFrame) {
        self.push(ParseSlot::Include(Box::new(frame)));
    }

    fn pop(&mut self) -> error::Result<ParseSlot> {
        self.slots
            .pop()
            .ok_or_else(|| ScriptError::new(None, "Control structures mismatches".to_string()))
    }

    /// Pop a sentinel and check that it is one of `expected`. On mismatch (or an empty stack, or a
    /// differently-shaped slot) reports a recoverable "X without Y" style error through `on_error`
    /// and returns it anyway so the caller can decide whether to keep going; callers that cannot
    /// sensibly continue should treat a `None` sentinel as a hard stop.
    pub fn pop_sentinel(&mut self) -> error::Result<Sentinel> {
        match self.pop()? {
            ParseSlot::Sentinel(sentinel) => Ok(sentinel),
            _ => ScriptError::new_as_result(None, "Control structures mismatches".to_string()),
        }
    }

    pub fn pop_addr(&mut self) -> error::Result<usize> {
        match self.pop()? {
            ParseSlot::Addr(addr) => Ok(addr),
            _ => ScriptError::new_as_result(None, "Control structures mismatches".to_string()),
        }
    }

    pub fn pop_watermark(&mut self) -> error::Result<usize> {
        match self.pop()? {
            ParseSlot::Watermark(watermark) => Ok(watermark),
            _ => ScriptError::new_as_result(None, "Control structures mismatches".to_string()),
        }
    }

    pub fn pop_code(&mut self) -> error::Result<CodeHandle> {
        match self.pop()? {
            ParseSlot::Code(code) => Ok(code),
            _ => ScriptError::new_as_result(None, "Control structures mismatches".to_string()),
        }
    }

    pub fn pop_include(&mut self) -> error::Result<IncludeFrame> {
        match self.pop()? {
            ParseSlot::Include(frame) => Ok(*frame),
            _ => ScriptError::new_as_result(None, "Control structures mismatches".to_string()),
        }
    }

    /// Peek at the top sentinel without consuming it, used by `FI`'s unrolling loop to decide
    /// whether to keep patching addresses or stop.
    pub fn top_is_sentinel(&self, sentinel: Sentinel) -> bool {
        matches!(self.slots.last(), Some(ParseSlot::Sentinel(s)) if *s == sentinel)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
