use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use lazy_static::lazy_static;

use crate::env::Env;
use crate::error::{map_io_error, CrimsonError, CrimsonResult};

lazy_static! {
    static ref BUILTINS: HashSet<&'static str> = ["crym", "inp", "Sleep"].iter().copied().collect();
}

/// The closed built-in vocabulary, consulted both at call sites and by the
/// entry resolver's outside-main check.
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(name)
}

/// Route a call statement to its target: one of the three built-ins, the
/// stub for a previously declared function, or a silent no-op for anything
/// else.
pub fn dispatch<R: BufRead, W: Write>(
    name: &str,
    args: &[String],
    env: &Env,
    input: &mut R,
    output: &mut W,
) -> CrimsonResult<()> {
    match name {
        "crym" => crym(args, output),
        "inp" => inp(args, input, output),
        "Sleep" => sleep(args),
        _ if env.has_func(name) => {
            writeln!(output, "Executing function: {}", name).map_err(map_io_error)
        }
        _ => Ok(()),
    }
}

fn crym<W: Write>(args: &[String], output: &mut W) -> CrimsonResult<()> {
    if let Some(message) = args.first() {
        writeln!(output, "{}", strip_quotes(message)).map_err(map_io_error)?;
    }
    Ok(())
}

fn inp<R: BufRead, W: Write>(args: &[String], input: &mut R, output: &mut W) -> CrimsonResult<()> {
    if let Some(prompt) = args.first() {
        write!(output, "{}", strip_quotes(prompt)).map_err(map_io_error)?;
        output.flush().map_err(map_io_error)?;
        let mut line = String::new();
        input.read_line(&mut line).map_err(map_io_error)?;
        // The captured line is discarded; inp never binds a variable.
    }
    Ok(())
}

fn sleep(args: &[String]) -> CrimsonResult<()> {
    if let Some(arg) = args.first() {
        let seconds: i64 = arg.parse().map_err(|_| CrimsonError::SleepArgument {
            text: arg.clone(),
        })?;
        if seconds > 0 {
            thread::sleep(Duration::from_secs(seconds as u64));
        }
    }
    Ok(())
}

/// Remove one pair of surrounding double quotes, if present. Escapes inside
/// are left untouched.
fn strip_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
