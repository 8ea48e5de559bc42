//! The Servo toolchain CLI.
//!
//! Subcommands:
//!
//! - `servoc run <file>` - run a program and print its result
//! - `servoc tokens <file>` - dump the token stream
//! - `servoc ast <file> [--json]` - dump the parse tree
//! - `servoc bytecode <file>` - dump disassembled instructions and constants
//! - `servoc repl` - start an interactive session
//!
//! Source files must use the `.servo` or `.svo` extension.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "servoc", version, about = "The Servo toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and run a Servo program, printing the resulting value
    Run {
        /// Path to a .servo or .svo source file
        file: PathBuf,
    },
    /// Print the token stream of a source file
    Tokens {
        /// Path to a .servo or .svo source file
        file: PathBuf,
    },
    /// Print the parse tree of a source file
    Ast {
        /// Path to a .servo or .svo source file
        file: PathBuf,

        /// Emit the tree as JSON instead of the debug rendering
        #[arg(long)]
        json: bool,
    },
    /// Print disassembled bytecode and the constant pool
    Bytecode {
        /// Path to a .servo or .svo source file
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run { file } => run(&file),
        Commands::Tokens { file } => tokens(&file),
        Commands::Ast { file, json } => ast(&file, json),
        Commands::Bytecode { file } => bytecode(&file),
        Commands::Repl => servo_repl::start().map_err(|e| e.to_string()),
    };

    if let Err(message) = outcome {
        if !message.is_empty() {
            eprintln!("error: {message}");
        }
        process::exit(1);
    }
}

/// Read a source file, enforcing the `.servo`/`.svo` extension.
fn load_source(path: &Path) -> Result<String, String> {
    let extension = path.extension().and_then(|ext| ext.to_str());
    if !matches!(extension, Some("servo") | Some("svo")) {
        return Err(format!(
            "'{}' is not a Servo source file (expected a .servo or .svo extension)",
            path.display()
        ));
    }
    std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {e}", path.display()))
}

fn run(path: &Path) -> Result<(), String> {
    let source = load_source(path)?;
    let program = parse_or_report(&source, path)?;
    let bytecode = servo_compiler::compile(&program).map_err(|e| e.to_string())?;
    let result = servo_vm::run(bytecode, None).map_err(|e| e.to_string())?;
    println!("{}", result.inspect());
    Ok(())
}

fn tokens(path: &Path) -> Result<(), String> {
    let source = load_source(path)?;
    match servo_lexer::tokenize(&source) {
        Ok(tokens) => {
            for token in tokens {
                println!(
                    "{:04}..{:04} {:?} {:?}",
                    token.span.start, token.span.end, token.kind, token.lexeme
                );
            }
            Ok(())
        }
        Err(err) => {
            report_lex_error(&source, &err);
            Err(String::new())
        }
    }
}

fn ast(path: &Path, json: bool) -> Result<(), String> {
    let source = load_source(path)?;
    let program = parse_or_report(&source, path)?;
    if json {
        let rendered =
            serde_json::to_string_pretty(&program).map_err(|e| e.to_string())?;
        println!("{rendered}");
    } else {
        println!("{program:#?}");
    }
    Ok(())
}

fn bytecode(path: &Path) -> Result<(), String> {
    let source = load_source(path)?;
    let program = parse_or_report(&source, path)?;
    let bytecode = servo_compiler::compile(&program).map_err(|e| e.to_string())?;

    print!("{}", bytecode.instructions);
    println!("constants:");
    for (index, constant) in bytecode.constants.iter().enumerate() {
        println!("  {index:04} {} {}", constant.type_tag(), constant.inspect());
    }
    Ok(())
}

/// Parse, rendering any lex/parse error as an ariadne report. The returned
/// error is empty because the report already went to stderr.
fn parse_or_report(
    source: &str,
    path: &Path,
) -> Result<servo_parser::ast::Block, String> {
    let file = path.display().to_string();
    match servo_parser::parse(source, Some(&file)) {
        Ok(program) => Ok(program),
        Err(err) => {
            report_parse_error(source, &err);
            Err(String::new())
        }
    }
}

fn report_parse_error(source: &str, err: &servo_common::ParseError) {
    use ariadne::{Label, Report, ReportKind, Source};
    let start = err.span.start as usize;
    let end = (err.span.end as usize).max(start + 1);
    let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
        .with_message("Parse error")
        .with_label(Label::new(start..end).with_message(err.kind.to_string()))
        .finish()
        .eprint(Source::from(source));
}

fn report_lex_error(source: &str, err: &servo_common::LexError) {
    use ariadne::{Label, Report, ReportKind, Source};
    let start = err.span.start as usize;
    let end = (err.span.end as usize).max(start + 1);
    let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
        .with_message("Lex error")
        .with_label(Label::new(start..end).with_message(err.to_string()))
        .finish()
        .eprint(Source::from(source));
}
