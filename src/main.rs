use std::path::Path;

use anyhow::Context;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.crm>", args[0]);
        std::process::exit(1);
    }
    let filename = &args[1];
    if !filename.ends_with(".crm") {
        eprintln!("File must have .crm extension");
        std::process::exit(1);
    }
    if !Path::new(filename).exists() {
        eprintln!("File '{}' not found", filename);
        std::process::exit(1);
    }
    let source = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to read file '{}'", filename))?;
    crimson_interpreter::run_source(&source)?;
    Ok(())
}
