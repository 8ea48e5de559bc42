//! Servo parser -- table-driven Pratt parsing to a typed AST.
//!
//! The grammar is split across four dispatch tables keyed by token kind
//! (prefix handlers, infix handlers, binding powers, statement handlers)
//! plus a parallel pair for the type sub-grammar. The tables are built once
//! at first use and are read-only afterwards; the parser itself is just a
//! token stream, a position, and one restriction flag.
//!
//! ```
//! let program = servo_parser::parse("let x -> Number = 5 + 3 * 2;", None).unwrap();
//! assert_eq!(program.body.len(), 1);
//! ```

pub mod ast;
mod lookups;
mod parser;

pub use lookups::BindingPower;
pub use parser::parse;
