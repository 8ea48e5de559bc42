//! Servo lexer -- ordered regex-pattern tokenizer.
//!
//! The lexer walks the source from left to right. At each position it tries
//! an ordered list of regex patterns against the remaining input and applies
//! the first one that matches at offset 0. Pattern order is part of the
//! contract: multi-character punctuation must be tried before its single
//! character prefixes (`->` before `-`, `..` before `.`, `??=` before `?`),
//! and identifiers before punctuation never overlap because their first
//! characters are disjoint.
//!
//! Skipped input (whitespace, comments) still advances the position and the
//! line counter. Tokenization is total for covered input and fails fast with
//! a [`LexError`] carrying the unmatched prefix otherwise. The returned
//! stream always ends with exactly one `Eof` token.

use once_cell::sync::Lazy;
use regex::Regex;
use servo_common::{reserved_word, LexError, Span, Token, TokenKind};

/// How a matched pattern turns into lexer output.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Consume without emitting (whitespace, comments).
    Skip,
    /// String literal; the lexeme is the content between the quotes.
    Str,
    /// Number literal; emits `Float` if the lexeme contains a dot,
    /// `Integer` otherwise.
    Number,
    /// Identifier or reserved word, resolved via the reserved-word table.
    Symbol,
    /// Fixed token with the given kind.
    Token(TokenKind),
}

/// The ordered pattern table. Built once, read-only afterwards.
static PATTERNS: Lazy<Vec<(Regex, Rule)>> = Lazy::new(|| {
    use Rule::Token as Tok;
    use TokenKind::*;

    let table: &[(&str, Rule)] = &[
        (r"\s+", Rule::Skip),
        // Block comments match lazily and do not nest.
        (r"(?s)/\*.*?\*/", Rule::Skip),
        (r"//.*", Rule::Skip),
        (r#""[^"]*""#, Rule::Str),
        (r"[0-9]+(\.[0-9]+)?", Rule::Number),
        (r"[A-Za-z_][A-Za-z0-9_]*", Rule::Symbol),
        // Multi-character punctuation before its prefixes.
        (r"->", Tok(Pointer)),
        (r"==", Tok(Equals)),
        (r"!=", Tok(NotEquals)),
        (r"<=", Tok(LessEquals)),
        (r">=", Tok(GreaterEquals)),
        (r"\|\|", Tok(Or)),
        (r"&&", Tok(And)),
        (r"\.\.", Tok(DotDot)),
        (r"\?\?=", Tok(NullishAssignment)),
        (r"\+\+", Tok(PlusPlus)),
        (r"--", Tok(MinusMinus)),
        (r"\+=", Tok(PlusEquals)),
        (r"-=", Tok(MinusEquals)),
        (r"\*=", Tok(StarEquals)),
        (r"/=", Tok(SlashEquals)),
        (r"%=", Tok(ModEquals)),
        (r"\^=", Tok(PowEquals)),
        // Single-character punctuation.
        (r"\[", Tok(OpenBracket)),
        (r"\]", Tok(CloseBracket)),
        (r"\{", Tok(OpenCurly)),
        (r"\}", Tok(CloseCurly)),
        (r"\(", Tok(OpenParen)),
        (r"\)", Tok(CloseParen)),
        (r"=", Tok(Assignment)),
        (r"!", Tok(Not)),
        (r"<", Tok(Less)),
        (r">", Tok(Greater)),
        (r"\.", Tok(Dot)),
        (r";", Tok(SemiColon)),
        (r":", Tok(Colon)),
        (r"\?", Tok(Question)),
        (r",", Tok(Comma)),
        (r"\+", Tok(Plus)),
        (r"-", Tok(Dash)),
        (r"/", Tok(Slash)),
        (r"\*", Tok(Star)),
        (r"\^", Tok(Pow)),
        (r"%", Tok(Percent)),
    ];

    table
        .iter()
        .map(|(pattern, rule)| {
            let regex = Regex::new(pattern).unwrap_or_else(|e| {
                unreachable!("lexer pattern {pattern:?} failed to compile: {e}")
            });
            (regex, *rule)
        })
        .collect()
});

/// The Servo lexer. Converts source text into a stream of tokens.
struct Lexer<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// 1-based line of the current position, advanced on every consumed
    /// newline (whitespace, comments, and multi-line strings included).
    line: u32,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            pos: 0,
            line: 1,
        }
    }

    fn remainder(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Consume `matched` (which starts at the current position) and apply its
    /// rule. Returns the consumed length in bytes.
    fn apply(&mut self, rule: Rule, matched: &str) {
        let start = self.pos as u32;
        let end = (self.pos + matched.len()) as u32;

        match rule {
            Rule::Skip => {}
            Rule::Str => {
                // Strip the surrounding quotes; the span keeps them.
                let content = &matched[1..matched.len() - 1];
                self.push(TokenKind::String, content, start, end);
            }
            Rule::Number => {
                let kind = if matched.contains('.') {
                    TokenKind::Float
                } else {
                    TokenKind::Integer
                };
                self.push(kind, matched, start, end);
            }
            Rule::Symbol => {
                let kind = reserved_word(matched).unwrap_or(TokenKind::Identifier);
                self.push(kind, matched, start, end);
            }
            Rule::Token(kind) => {
                self.push(kind, matched, start, end);
            }
        }

        self.line += matched.bytes().filter(|&b| b == b'\n').count() as u32;
        self.pos += matched.len();
    }

    fn push(&mut self, kind: TokenKind, lexeme: &str, start: u32, end: u32) {
        self.tokens.push(Token::new(kind, lexeme, start, end));
    }
}

/// Tokenize Servo source text.
///
/// Returns the full token stream, terminated by exactly one `Eof` token, or
/// the first [`LexError`] if some input matches no pattern.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lex = Lexer::new(source);

    while !lex.at_eof() {
        let remainder = lex.remainder();
        let matched = PATTERNS.iter().find_map(|(regex, rule)| {
            let m = regex.find(remainder)?;
            (m.start() == 0).then(|| (*rule, m.as_str()))
        });

        match matched {
            Some((rule, text)) => lex.apply(rule, text),
            None => {
                let prefix: String = remainder.chars().take(16).collect();
                let start = lex.pos as u32;
                let span = Span::new(start, start + prefix.len() as u32);
                return Err(LexError::new(prefix, lex.line, span));
            }
        }
    }

    let end = source.len() as u32;
    lex.tokens.push(Token::new(TokenKind::Eof, "EOF", end, end));
    Ok(lex.tokens)
}
