//! Thin CLI wrapper around [`teko::run_source`] (`spec.md` §6: one
//! positional path argument, no flags, exit 0 on success).

use std::process::ExitCode;
use std::{env, fs};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("usage: teko <path/to/file>");
        return ExitCode::FAILURE;
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match teko::run_source(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(exc) => {
            eprintln!("{exc}");
            ExitCode::FAILURE
        }
    }
}
