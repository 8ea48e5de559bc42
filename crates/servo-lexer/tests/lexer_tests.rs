use servo_common::TokenKind;
use servo_lexer::tokenize;

/// Helper: tokenize and return the kinds, dropping the trailing Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let tokens = tokenize(source).expect("tokenize failed");
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    tokens[..tokens.len() - 1].iter().map(|t| t.kind).collect()
}

/// Helper: tokenize and return (kind, lexeme) pairs, dropping the Eof.
fn pairs(source: &str) -> Vec<(TokenKind, String)> {
    let tokens = tokenize(source).expect("tokenize failed");
    tokens[..tokens.len() - 1]
        .iter()
        .map(|t| (t.kind, t.lexeme.clone()))
        .collect()
}

#[test]
fn reserved_words_and_identifiers() {
    assert_eq!(
        kinds("let const var new function if else foreach in import from"),
        vec![
            TokenKind::Let,
            TokenKind::Const,
            TokenKind::Var,
            TokenKind::New,
            TokenKind::Function,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Foreach,
            TokenKind::In,
            TokenKind::Import,
            TokenKind::From,
        ]
    );
    assert_eq!(
        kinds("struct class public private protected static scope typeof"),
        vec![
            TokenKind::Struct,
            TokenKind::Class,
            TokenKind::Public,
            TokenKind::Private,
            TokenKind::Protected,
            TokenKind::Static,
            TokenKind::Scope,
            TokenKind::Typeof,
        ]
    );
    assert_eq!(
        kinds("foo _bar baz42 lettuce iffy"),
        vec![TokenKind::Identifier; 5]
    );
}

#[test]
fn booleans_are_reserved_words() {
    assert_eq!(
        pairs("true false"),
        vec![
            (TokenKind::Boolean, "true".to_string()),
            (TokenKind::Boolean, "false".to_string()),
        ]
    );
}

#[test]
fn integer_and_float_literals() {
    assert_eq!(
        pairs("42 0 3.14 10.0"),
        vec![
            (TokenKind::Integer, "42".to_string()),
            (TokenKind::Integer, "0".to_string()),
            (TokenKind::Float, "3.14".to_string()),
            (TokenKind::Float, "10.0".to_string()),
        ]
    );
}

#[test]
fn number_never_matches_a_leading_sign() {
    // Unary minus is the parser's concern.
    assert_eq!(
        kinds("-5"),
        vec![TokenKind::Dash, TokenKind::Integer]
    );
}

#[test]
fn string_lexeme_excludes_quotes() {
    let tokens = tokenize(r#""hello world""#).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].lexeme, "hello world");
    // The span still covers the quotes.
    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.end, 13);
}

#[test]
fn empty_string_literal() {
    let tokens = tokenize(r#""""#).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].lexeme, "");
}

#[test]
fn multi_character_punctuation_wins_over_prefixes() {
    assert_eq!(
        kinds("-> == != <= >= || && .. ??= ++ -- += -= *= /= %= ^="),
        vec![
            TokenKind::Pointer,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Or,
            TokenKind::And,
            TokenKind::DotDot,
            TokenKind::NullishAssignment,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::ModEquals,
            TokenKind::PowEquals,
        ]
    );
}

#[test]
fn single_character_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] , . : ; ? = ! < > + - * / % ^"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Colon,
            TokenKind::SemiColon,
            TokenKind::Question,
            TokenKind::Assignment,
            TokenKind::Not,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Pow,
        ]
    );
}

#[test]
fn range_of_integers_is_not_a_float() {
    assert_eq!(
        kinds("1..5"),
        vec![TokenKind::Integer, TokenKind::DotDot, TokenKind::Integer]
    );
}

#[test]
fn pointer_is_not_dash_assignment() {
    assert_eq!(
        kinds("x -> Number"),
        vec![TokenKind::Identifier, TokenKind::Pointer, TokenKind::Identifier]
    );
}

#[test]
fn declaration_statement() {
    assert_eq!(
        pairs("let x -> Number = 5 + 3;"),
        vec![
            (TokenKind::Let, "let".to_string()),
            (TokenKind::Identifier, "x".to_string()),
            (TokenKind::Pointer, "->".to_string()),
            (TokenKind::Identifier, "Number".to_string()),
            (TokenKind::Assignment, "=".to_string()),
            (TokenKind::Integer, "5".to_string()),
            (TokenKind::Plus, "+".to_string()),
            (TokenKind::Integer, "3".to_string()),
            (TokenKind::SemiColon, ";".to_string()),
        ]
    );
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds("1 // rest of line\n+ /* in the middle */ 2"),
        vec![TokenKind::Integer, TokenKind::Plus, TokenKind::Integer]
    );
}

#[test]
fn block_comment_spans_lines() {
    let err = tokenize("/* a\nb\nc */ $").unwrap_err();
    // The comment consumed two newlines before the unmatched '$'.
    assert_eq!(err.line, 3);
    assert_eq!(err.prefix, "$");
}

#[test]
fn lex_error_carries_remainder_prefix() {
    let err = tokenize("let x = @@@@;").unwrap_err();
    assert_eq!(err.prefix, "@@@@;");
    assert_eq!(err.line, 1);
    assert_eq!(err.span.start, 8);
}

#[test]
fn every_stream_ends_with_exactly_one_eof() {
    for source in ["", ";", "let x = 1;", "1 + 2 * 3"] {
        let tokens = tokenize(source).unwrap();
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        assert_eq!(eofs, 1, "source {source:?}");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn token_spans_are_byte_accurate() {
    let tokens = tokenize("let x = 42").unwrap();
    assert_eq!((tokens[0].span.start, tokens[0].span.end), (0, 3));
    assert_eq!((tokens[1].span.start, tokens[1].span.end), (4, 5));
    assert_eq!((tokens[2].span.start, tokens[2].span.end), (6, 7));
    assert_eq!((tokens[3].span.start, tokens[3].span.end), (8, 10));
}
