use std::fmt;

use serde::Serialize;

use crate::span::Span;
use crate::token::TokenKind;

/// A lexer error. The lexer fails fast: the first unmatched input aborts
/// tokenization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    /// A bounded prefix of the input that no pattern matched.
    pub prefix: String,
    /// 1-based line of the unmatched input.
    pub line: u32,
    pub span: Span,
}

impl LexError {
    pub fn new(prefix: impl Into<String>, line: u32, span: Span) -> Self {
        Self {
            prefix: prefix.into(),
            line,
            span,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized token near {:?} (line {})",
            self.prefix, self.line
        )
    }
}

impl std::error::Error for LexError {}

/// The specific kind of parser error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParseErrorKind {
    /// Tokenization failed before parsing could start.
    Lex(LexError),
    /// A token other than the expected one was found.
    UnexpectedToken {
        expected: Option<TokenKind>,
        found: TokenKind,
        lexeme: String,
    },
    /// No prefix (null-denotation) handler is registered for the token.
    MissingPrefixHandler(TokenKind),
    /// No infix (left-denotation) handler is registered for the token.
    MissingInfixHandler(TokenKind),
    /// No handler is registered for the token in the type grammar.
    MissingTypeHandler(TokenKind),
    /// A `const` declaration has no assigned value.
    ConstantWithoutValue(String),
    /// A declaration carries neither an explicit type nor a value.
    DeclarationWithoutTypeOrValue(String),
    /// A struct property name appears more than once.
    DuplicateStructProperty(String),
    /// The left side of a struct instantiation is not a bare symbol.
    InvalidInstantiationTarget,
    /// A numeric lexeme could not be converted to a value.
    InvalidNumberLiteral(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::UnexpectedToken {
                expected: Some(expected),
                found,
                lexeme,
            } => write!(f, "expected {expected}, found {found} ({lexeme:?})"),
            Self::UnexpectedToken {
                expected: None,
                found,
                lexeme,
            } => write!(f, "unexpected {found} ({lexeme:?})"),
            Self::MissingPrefixHandler(kind) => {
                write!(f, "no expression can begin with {kind}")
            }
            Self::MissingInfixHandler(kind) => {
                write!(f, "{kind} cannot extend an expression")
            }
            Self::MissingTypeHandler(kind) => {
                write!(f, "no type can begin with {kind}")
            }
            Self::ConstantWithoutValue(name) => {
                write!(f, "constant {name:?} declared without a value")
            }
            Self::DeclarationWithoutTypeOrValue(name) => {
                write!(f, "declaration of {name:?} needs an explicit type or a value")
            }
            Self::DuplicateStructProperty(name) => {
                write!(f, "struct property {name:?} declared more than once")
            }
            Self::InvalidInstantiationTarget => {
                write!(f, "struct instantiation requires a struct name on the left")
            }
            Self::InvalidNumberLiteral(lexeme) => {
                write!(f, "invalid number literal: {lexeme}")
            }
        }
    }
}

/// A parser error with location information. Parsing is non-recovering: the
/// first syntax error aborts the parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line of the offending token.
    pub line: u32,
    /// 1-based column of the offending token.
    pub column: u32,
    /// File the source came from, if known.
    pub file: Option<String>,
    pub span: Span,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}: {}", file, self.line, self.column, self.kind),
            None => write!(f, "{}:{}: {}", self.line, self.column, self.kind),
        }
    }
}

impl std::error::Error for ParseError {}

/// A bytecode-compiler error.
///
/// Reachable from well-parsed trees only for constructs that have no bytecode
/// semantics (the compiler's safety net) and for undefined variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CompileError {}

/// A virtual-machine error. Fatal to the run; the operand stack is left
/// as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmError {
    pub message: String,
}

impl VmError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for VmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::new("@#$", 3, Span::new(10, 13));
        assert_eq!(err.to_string(), "unrecognized token near \"@#$\" (line 3)");
    }

    #[test]
    fn parse_error_display_with_file() {
        let err = ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                expected: Some(TokenKind::SemiColon),
                found: TokenKind::Eof,
                lexeme: "EOF".into(),
            },
            line: 2,
            column: 7,
            file: Some("main.servo".into()),
            span: Span::new(14, 14),
        };
        assert_eq!(
            err.to_string(),
            "main.servo:2:7: expected SemiColon, found Eof (\"EOF\")"
        );
    }

    #[test]
    fn parse_error_kind_display_contract_violations() {
        assert_eq!(
            ParseErrorKind::ConstantWithoutValue("c".into()).to_string(),
            "constant \"c\" declared without a value"
        );
        assert_eq!(
            ParseErrorKind::DuplicateStructProperty("x".into()).to_string(),
            "struct property \"x\" declared more than once"
        );
        assert_eq!(
            ParseErrorKind::MissingPrefixHandler(TokenKind::SemiColon).to_string(),
            "no expression can begin with SemiColon"
        );
    }

    #[test]
    fn compile_and_vm_error_display() {
        assert_eq!(CompileError::new("unknown operator <=").to_string(), "unknown operator <=");
        assert_eq!(VmError::new("stack overflow").to_string(), "stack overflow");
    }
}
