pub mod builtins;
pub mod env;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod value;

use std::io::{self, BufRead, Write};
use std::path::Path;

pub use error::{CrimsonError, CrimsonResult};
pub use interp::Interpreter;

/// Execute Crimson source against the process's standard streams.
pub fn run_source(source: &str) -> CrimsonResult<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    run_source_with(source, &mut reader, &mut writer)
}

/// Execute Crimson source against caller-supplied streams. This is the seam
/// the tests drive with in-memory buffers.
pub fn run_source_with<R: BufRead, W: Write>(
    source: &str,
    input: &mut R,
    output: &mut W,
) -> CrimsonResult<()> {
    let tokens = lexer::tokenize(source);
    Interpreter::new(tokens, input, output).run()
}

/// Read a script file and execute it against the standard streams.
pub fn run_file(path: impl AsRef<Path>) -> CrimsonResult<()> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| CrimsonError::Io(format!("could not open file {}: {}", path.display(), e)))?;
    run_source(&source)
}
