use std::fmt::{self, Display, Formatter};

use crate::runtime::data_structures::value::Value;

/// The primitive operations of the WTF virtual machine. A dictionary entry pairs one of these
/// with a priority and a datum; the compiler core (see `runtime::interpreter::compiler`)
/// dispatches on the opcode both when a priority-0 word is compiled and when a runtime opcode is
/// stepped over in the code stream — the same handful of match arms serve both roles, exactly as
/// the reference implementation calls the very same Python function at compile time or at run
/// time depending on the word's priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    // --- runtime primitives -------------------------------------------------
    Push,
    Jp,
    Jpz,
    Call,
    Ret,
    VPush,
    VStore,
    VIncr,
    VDecr,
    IPush,
    IStore,
    Abs,
    Add,
    Div,
    Mul,
    Neg,
    Pow,
    Rand,
    Round,
    Sub,
    Eq,
    Geq,
    Gt,
    Leq,
    Lt,
    Neq,
    And,
    Not,
    Or,
    Print,
    SPush,
    SPop,
    STos,
    SLen,
    FOpen,
    FClose,
    FGet,
    FPut,

    // --- compile-time only (always installed at priority 0) -----------------
    OpenPar,
    ClosePar,
    CloseBra,
    StrConst,
    Comment,
    Newline,
    Def,
    LetAssign,
    OfAssign,
    Stack,
    Begin,
    End,
    If,
    Then,
    Elif,
    Else,
    Fi,
    While,
    Do,
    Od,
    For,
    To,
    Next,
    Include,
}

/// One step of compiled code: an opcode together with its immediate argument. The code stream is
/// the flattened, even-length sequence of these pairs that the VM walks two cells at a time.
#[derive(Clone)]
pub struct Instruction {
    pub op: Opcode,
    pub datum: Value,
}

impl Instruction {
    pub fn new(op: Opcode, datum: Value) -> Self {
        Instruction { op, datum }
    }
}

impl Display for Instruction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:?} {}", self.op, self.datum)
    }
}

/// A single compiled stream, either the top-level program or the body of a `CMD`/`PROC`/`FUNC`/
/// `BEGIN` block. Streams are kept in a side table (see `CodeTable`) and referenced by stable
/// handles rather than by direct pointer, so that `CALL`/`RET` frames, dictionary entries, and the
/// VM's active stream can all name the same stream safely.
pub type CodeStream = Vec<Instruction>;

/// Pretty-print a code stream for `--dump-obj`, in the `index: opcode datum` shape the language
/// spec calls for.
pub fn pretty_print_code(stream: &CodeStream) -> String {
    let mut out = String::new();

    for (i, instruction) in stream.iter().enumerate() {
        out.push_str(&format!("{:4}: {}\n", i * 2, instruction));
    }

    out
}
