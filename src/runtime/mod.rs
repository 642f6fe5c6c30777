/// All of the core data structures used by the interpreter: the value model, the word dictionary,
/// and the four stacks (`D`, `C`, `P`, `V`).
pub mod data_structures;

/// Error reporting: the fatal `ScriptError` type used throughout via `Result`.
pub mod error;

/// The compiler core, control-flow protocol, built-in word table and VM loop.
pub mod interpreter;
