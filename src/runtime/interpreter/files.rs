use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};

/// Either half of a file opened by `FOPEN`: the language only ever reads or writes a given handle,
/// never both, matching the modes `FOPEN` is called with (`"r"`, `"w"`, `"a"`).
enum OpenFile {
    Read(BufReader<File>),
    Write(File),
}

/// The table of files currently open under a `Value::FileHandle` id. File I/O is scoped: any
/// error escalates to fatal (`exit_on` in the reference implementation), so callers map this
/// module's `io::Result` straight through `ScriptError`'s `From<io::Error>`.
#[derive(Default)]
pub struct FileTable {
    files: HashMap<i64, OpenFile>,
    next_id: i64,
}

impl FileTable {
    pub fn new() -> Self {
        FileTable { files: HashMap::new(), next_id: 1 }
    }

    pub fn open(&mut self, name: &str, mode: &str) -> io::Result<i64> {
        let file = match mode {
            "w" => OpenFile::Write(File::create(name)?),
            "a" => OpenFile::Write(OpenOptions::new().create(true).append(true).open(name)?),
            _ => OpenFile::Read(BufReader::new(File::open(name)?)),
        };

        let handle = self.next_id;
        self.next_id += 1;
        self.files.insert(handle, file);
        Ok(handle)
    }

    pub fn close(&mut self, handle: i64) -> io::Result<()> {
        match self.files.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such open file handle")),
        }
    }

    /// Read one character, as `FGET` expects. Returns an empty string at end of file, matching
    /// Python's `f.read(1)`.
    pub fn read_char(&mut self, handle: i64) -> io::Result<String> {
        match self.files.get_mut(&handle) {
            Some(OpenFile::Read(reader)) => {
                let mut byte = [0u8; 1];
                let read = reader.read(&mut byte)?;
                if read == 0 {
                    Ok(String::new())
                } else {
                    Ok((byte[0] as char).to_string())
                }
            }
            _ => Err(io::Error::new(io::ErrorKind::Other, "file handle is not open for reading")),
        }
    }

    /// Write one character code, as `FPUT` expects (see DESIGN.md on the original's `chr(int(POP))`
    /// bug and the decision to implement the evidently-intended behavior).
    pub fn write_char(&mut self, handle: i64, code: i64) -> io::Result<()> {
        match self.files.get_mut(&handle) {
            Some(OpenFile::Write(file)) => {
                let ch = char::from_u32(code as u32).unwrap_or('\u{FFFD}');
                let mut buffer = [0u8; 4];
                let encoded = ch.encode_utf8(&mut buffer);
                file.write_all(encoded.as_bytes())
            }
            _ => Err(io::Error::new(io::ErrorKind::Other, "file handle is not open for writing")),
        }
    }
}
