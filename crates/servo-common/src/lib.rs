//! Shared types for the Servo toolchain.
//!
//! Every stage of the pipeline (lexer, parser, compiler, VM) depends on this
//! crate for the token vocabulary, byte-offset spans, and the per-phase error
//! types.

pub mod error;
pub mod span;
pub mod token;

pub use error::{CompileError, LexError, ParseError, ParseErrorKind, VmError};
pub use span::{LineIndex, Span};
pub use token::{reserved_word, Token, TokenKind};
