//! Table-driven Pratt parser for Servo.
//!
//! The parser holds the token stream and a position; everything else is
//! dispatch. Statement parsing consults the statement table by leading token
//! and falls back to an expression statement. Expression parsing is the
//! precedence-climbing loop in [`expressions`], driven by the binding-power
//! table. Parsing is non-recovering: the first error aborts.

pub(crate) mod expressions;
pub(crate) mod statements;
pub(crate) mod types;

use servo_common::{LineIndex, ParseError, ParseErrorKind, Token, TokenKind};

use crate::ast::Block;
use crate::lookups::LOOKUPS;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: Option<String>,
    line_index: LineIndex,
    /// Whether `{` after an expression may begin a struct instantiation.
    /// `if` disables this for its condition so the block is not mistaken
    /// for a struct literal; grouping parentheses re-enable it.
    pub(crate) structs_allowed: bool,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, source: &str, file: Option<String>) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
            line_index: LineIndex::new(source),
            structs_allowed: true,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// The current token. Once the stream is exhausted this stays on `Eof`.
    pub(crate) fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn has_tokens(&self) -> bool {
        self.current_kind() != TokenKind::Eof
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Consume and return the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token, requiring it to be of the given kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.current_kind() == kind {
            Ok(self.advance())
        } else {
            let found = self.current();
            Err(self.error(ParseErrorKind::UnexpectedToken {
                expected: Some(kind),
                found: found.kind,
                lexeme: found.lexeme.clone(),
            }))
        }
    }

    // ── Diagnostics ────────────────────────────────────────────────────

    /// Build a parse error anchored at the current token.
    pub(crate) fn error(&self, kind: ParseErrorKind) -> ParseError {
        let span = self.current().span;
        let (line, column) = self.line_index.line_col(span.start);
        ParseError {
            kind,
            line,
            column,
            file: self.file.clone(),
            span,
        }
    }
}

/// Dispatch one statement from its leading token, falling back to an
/// expression statement for unregistered kinds.
pub(crate) fn parse_statement(p: &mut Parser) -> Result<crate::ast::Statement, ParseError> {
    match LOOKUPS.stmt.get(&p.current_kind()) {
        Some(handler) => handler(p),
        None => statements::parse_expression_statement(p),
    }
}

/// Parse Servo source text into its top-level block.
///
/// `file` is only used for diagnostics.
pub fn parse(source: &str, file: Option<&str>) -> Result<Block, ParseError> {
    let tokens = servo_lexer::tokenize(source).map_err(|err| ParseError {
        line: err.line,
        column: 1,
        file: file.map(str::to_owned),
        span: err.span,
        kind: ParseErrorKind::Lex(err),
    })?;

    let mut p = Parser::new(tokens, source, file.map(str::to_owned));
    let mut body = Vec::new();

    while p.has_tokens() {
        body.push(parse_statement(&mut p)?);
    }

    Ok(Block { body })
}
