use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// The location in the source code where a token was found.  This structure is used all over the
/// interpreter to keep track where important things are found in the source code.  This is used
/// extensively in the error reporting.
///
/// This is a read-only structure.  Use the field accessor methods to get the values.
#[derive(Clone, PartialEq, PartialOrd, Eq)]
pub struct SourceLocation {
    /// Either the path to the file or a description of the source code.  For example code entered
    /// in the REPL will have a tag of "\<repl\>".
    path: String,

    /// The 1 based line number in the source code where the token was found.  WTF only advances
    /// this on a `NEWLINE` or `COMMENT` word, not per character, so it tracks statement lines
    /// rather than raw source position.
    line: usize,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Hash for SourceLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.line.hash(state);
    }
}

/// Used for error reporting to show where in the source code an error originated.
impl Display for SourceLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(formatter, "{}:{}", self.path, self.line)
    }
}

impl SourceLocation {
    pub fn new() -> SourceLocation {
        SourceLocation { path: "unspecified".to_string(), line: 0 }
    }

    pub fn new_from_path(path: &str) -> Self {
        SourceLocation { path: path.to_owned(), line: 1 }
    }

    pub fn new_from_info(path: &str, line: usize) -> Self {
        SourceLocation { path: path.to_owned(), line }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    pub fn advance_line(&mut self) {
        self.line += 1;
    }
}

/// Helper macro to get the location of the macro invocation.  This is useful for error reporting
/// that includes locations within the Rust code where important operations are occurring.
#[macro_export]
macro_rules! location_here {
    () => {
        $crate::lang::source_buffer::SourceLocation::new_from_info(file!(), line!() as usize)
    };
}
