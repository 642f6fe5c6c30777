use std::env::{args, current_exe, var};
use std::fs;

use wtf::runtime::error::{self, ScriptError};
use wtf::runtime::interpreter::Interpreter;

/// Where to look for `INCLUDE`d files besides the current directory: either the directory
/// specified by `WTF_LIB_PATH`, or the directory the executable itself lives in. Mirrors the
/// reference interpreter's `RSORTH_LIB_PATH` convention.
fn std_lib_directory() -> error::Result<String> {
    if let Ok(lib_path) = var("WTF_LIB_PATH") {
        return Ok(lib_path);
    }

    match current_exe() {
        Ok(exe_path) => match exe_path.parent() {
            Some(directory) => match directory.to_str() {
                Some(dir_str) => Ok(dir_str.to_string()),
                None => ScriptError::new_as_result(
                    None,
                    "Executable directory path includes invalid characters.".to_string(),
                ),
            },
            None => ScriptError::new_as_result(
                None,
                "Could not get the directory of the running executable.".to_string(),
            ),
        },
        Err(err) => {
            ScriptError::new_as_result(None, format!("Could not get the current executable path: {}", err))
        }
    }
}

struct Args {
    source: String,
    dump_obj: bool,
    dump_dict: bool,
    dump_vars: bool,
}

fn parse_args() -> error::Result<Args> {
    let mut source = None;
    let mut dump_obj = false;
    let mut dump_dict = false;
    let mut dump_vars = false;

    for arg in args().skip(1) {
        match arg.as_str() {
            "--dump-obj" => dump_obj = true,
            "--dump-dict" => dump_dict = true,
            "--dump-vars" => dump_vars = true,
            other if source.is_none() => source = Some(other.to_string()),
            other => {
                return ScriptError::new_as_result(None, format!("Unexpected argument: {}", other));
            }
        }
    }

    match source {
        Some(source) => Ok(Args { source, dump_obj, dump_dict, dump_vars }),
        None => ScriptError::new_as_result(None, "Usage: wtf [--dump-obj] [--dump-dict] [--dump-vars] <source>".to_string()),
    }
}

fn main() -> error::Result<()> {
    let args = parse_args()?;

    let mut interpreter = Interpreter::new();
    interpreter.add_search_path(std_lib_directory()?);

    let source = fs::read_to_string(&args.source)?;
    interpreter.compile_program(&args.source, &source)?;

    if args.dump_obj {
        print!("{}", interpreter.dump_obj());
    }

    if args.dump_dict {
        print!("{}", interpreter.dump_dict());
    }

    if args.dump_vars {
        print!("{}", interpreter.dump_vars());
    }

    if interpreter.error_count == 0 {
        if !interpreter.data.is_empty() {
            interpreter.recoverable_error("Some error occurred, cross your fingers");
        }
        if !interpreter.parse.is_empty() {
            interpreter.recoverable_error("Control structures mismatches");
        }

        interpreter.run()?;
    }

    if interpreter.error_count > 0 {
        eprintln!("\n{} error(s), not running.", interpreter.error_count);
        std::process::exit(1);
    }

    Ok(())
}
