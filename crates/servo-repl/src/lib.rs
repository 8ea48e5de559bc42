//! Interactive REPL for the Servo language.
//!
//! Each line runs through the full pipeline; the symbol table, constant
//! pool, and globals persist across lines via [`ReplSession`].

mod session;

pub use session::{ReplError, ReplSession};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = ">> ";

const GEAR: &str = r#"
                             ..
                         ..........
                .        ..........        .
             ......   ................   ......
            ....................................
           ......................................
             ......                      .......
             ....                          ....
            ....                            ....
      .........       :.            .:       .........
      .........       :.            .:       .........
     .........        :.            ..        ........
      .........                              .........
      ...........                          ...........
            ....................................
             ..................................
             ...................................
           ......................................
           ......................................
             ......   ................   ......
                .        ..........        .
                         ..........
                            ...."#;

/// Run the read-eval-print loop until EOF or interrupt.
pub fn start() -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let mut session = ReplSession::new();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);

                match session.eval(&line) {
                    Ok(result) => println!("{}", result.inspect()),
                    Err(ReplError::Parse(err)) => {
                        println!("{GEAR}");
                        println!("Whoops! Errors really grind my gears!");
                        println!(" parser errors:");
                        println!("\t{err}");
                    }
                    Err(err) => println!("{err}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    Ok(())
}
