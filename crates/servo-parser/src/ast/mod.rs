//! Typed AST for the Servo language.
//!
//! Three closed families: [`Expression`], [`Statement`], and [`Type`]. A
//! successfully parsed program is a single top-level [`Block`] whose body is
//! an ordered sequence of statements.

mod expr;
mod stmt;
mod types;

pub use expr::{Expression, Parameter};
pub use stmt::{Block, FunctionDecl, Statement, StructProperty};
pub use types::Type;
