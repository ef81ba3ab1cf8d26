// tarn - A small Scheme-like language on a register-bytecode VM
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use tarn_base::register_baselib;
use tarn_parser::Parser;
use tarn_vm::{compile, Interp, Options, Value};

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
        .ok();

    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && (args[1] == "--version" || args[1] == "-v") {
        println!("Tarn v0.1.0");
        return;
    }

    let mut interp = Interp::new(Options::default());
    register_baselib(&mut interp);

    // -e evaluates one program from the command line, like a one-line script.
    if args.len() >= 2 && args[1] == "-e" {
        match args.get(2) {
            Some(source) => match eval_source(source, &mut interp) {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            },
            None => {
                eprintln!("Usage: tarn -e <code>");
                process::exit(2);
            }
        }
        return;
    }

    if args.len() > 1 {
        run_files(&args[1..], &mut interp);
    } else {
        run_repl(&mut interp);
    }
}

/// Parse, compile and execute one whole program.
fn eval_source(source: &str, interp: &mut Interp) -> Result<Value, String> {
    let forms = Parser::parse_all_str(source).map_err(|e| e.to_string())?;
    let proto = compile(&forms).map_err(|e| e.to_string())?;
    interp.execute(proto).map_err(|e| {
        interp.reset();
        e.to_string()
    })
}

/// Evaluate a sequence of source files.
fn run_files(files: &[String], interp: &mut Interp) {
    for file_path in files {
        if let Err(e) = eval_file(file_path, interp) {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Evaluate a single source file.
fn eval_file(file_path: &str, interp: &mut Interp) -> Result<(), String> {
    let path = Path::new(file_path);

    match path.extension().and_then(|e| e.to_str()) {
        Some("scm") | Some("tarn") => {}
        Some(ext) => {
            return Err(format!(
                "Error: unsupported file extension '.{}' for '{}'",
                ext, file_path
            ));
        }
        None => {
            return Err(format!(
                "Error: file '{}' has no extension (expected .scm or .tarn)",
                file_path
            ));
        }
    }

    let source =
        fs::read_to_string(path).map_err(|e| format!("Error reading '{}': {}", file_path, e))?;
    eval_source(&source, interp)
        .map_err(|e| format!("Error in '{}': {}", file_path, e))?;
    Ok(())
}

/// Run the interactive REPL. Each line is one program; globals persist
/// across lines through the shared interpreter.
fn run_repl(interp: &mut Interp) {
    println!("Tarn v0.1.0");

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                match eval_source(input, interp) {
                    Ok(value) => println!("{}", value),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }
    }
}
