use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::process::{ExitCode, Termination};

use crate::lang::source_buffer::SourceLocation;

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Any error serious enough to abort the run: stack underflow, a malformed literal escaping the
/// compiler's number probe, an I/O failure, unmatched delimiters discovered at flush time. This
/// mirrors the reference interpreter's `exit_on` — there is no recovering from one of these, the
/// process exits with status `-1` once it propagates out of `main`.
///
/// Ordinary compile-time diagnostics (`error_on` in the reference implementation — an unknown
/// word, a missing `=`) are *not* represented by this type: they are reported, tallied and
/// swallowed by [`crate::runtime::interpreter::Interpreter::recoverable_error`] so that
/// compilation can continue.
#[derive(Clone)]
pub struct ScriptError {
    location: Option<SourceLocation>,
    message: String,
}

impl Error for ScriptError {}

impl Termination for ScriptError {
    fn report(self) -> ExitCode {
        eprintln!("{}", self);
        // Mirrors the reference interpreter's `exit(-1)`; -1i32 truncates to 255 as a process
        // exit code on every platform this runs on.
        ExitCode::from(255)
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: WTF! {} sorry, this is a fatal error!", location, self.message),
            None => write!(f, "WTF! {} sorry, this is a fatal error!", self.message),
        }
    }
}

impl Debug for ScriptError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl ScriptError {
    pub fn new(location: Option<SourceLocation>, message: String) -> ScriptError {
        ScriptError { location, message }
    }

    /// Create a `ScriptError` and wrap it in a `Result::Err` in one call, the shape every fallible
    /// accessor in this crate returns through.
    pub fn new_as_result<T>(location: Option<SourceLocation>, message: String) -> Result<T> {
        Err(ScriptError::new(location, message))
    }

    pub fn location(&self) -> &Option<SourceLocation> {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(error: std::io::Error) -> ScriptError {
        ScriptError::new(None, format!("I/O error: {}", error))
    }
}
