//! Expression handlers and the precedence-climbing loop.

use servo_common::{ParseError, ParseErrorKind, TokenKind};

use crate::ast::Expression;
use crate::lookups::{BindingPower, LOOKUPS};
use crate::parser::{statements, types, Parser};

/// The core Pratt loop.
///
/// The current token's prefix handler produces the left-hand side; infix
/// handlers then extend it for as long as the next token binds tighter than
/// `bp`. Infix handlers consume their operator token themselves and receive
/// the operator's own binding power.
pub(crate) fn parse_expression(
    p: &mut Parser,
    bp: BindingPower,
) -> Result<Expression, ParseError> {
    let kind = p.current_kind();
    let nud = LOOKUPS
        .nud
        .get(&kind)
        .copied()
        .ok_or_else(|| p.error(ParseErrorKind::MissingPrefixHandler(kind)))?;

    let mut left = nud(p)?;

    loop {
        let kind = p.current_kind();
        let power = LOOKUPS.power(kind);
        if power <= bp {
            break;
        }
        if kind == TokenKind::OpenCurly && !p.structs_allowed {
            break;
        }
        let led = LOOKUPS
            .led
            .get(&kind)
            .copied()
            .ok_or_else(|| p.error(ParseErrorKind::MissingInfixHandler(kind)))?;
        left = led(p, left, power)?;
    }

    Ok(left)
}

/// Literals and symbols. One token in, one node out.
pub(crate) fn parse_primary(p: &mut Parser) -> Result<Expression, ParseError> {
    match p.current_kind() {
        TokenKind::Number | TokenKind::Integer | TokenKind::Float => {
            let token = p.advance();
            let value: f64 = token.lexeme.parse().map_err(|_| {
                p.error(ParseErrorKind::InvalidNumberLiteral(token.lexeme.clone()))
            })?;
            Ok(Expression::Number(value))
        }
        TokenKind::String => Ok(Expression::String(p.advance().lexeme)),
        TokenKind::Boolean => Ok(Expression::Bool(p.advance().lexeme == "true")),
        TokenKind::Identifier => Ok(Expression::Symbol(p.advance().lexeme)),
        kind => Err(p.error(ParseErrorKind::UnexpectedToken {
            expected: None,
            found: kind,
            lexeme: p.current().lexeme.clone(),
        })),
    }
}

/// `-x`, `!x`, `typeof x`. The operand binds at unary power.
pub(crate) fn parse_prefix(p: &mut Parser) -> Result<Expression, ParseError> {
    let operator = p.advance();
    let right = parse_expression(p, BindingPower::Unary)?;
    Ok(Expression::Prefix {
        operator,
        right: Box::new(right),
    })
}

/// Binary operators. Recursing at the operator's own power makes equal
/// precedence associate left.
pub(crate) fn parse_binary(
    p: &mut Parser,
    left: Expression,
    bp: BindingPower,
) -> Result<Expression, ParseError> {
    let operator = p.advance();
    let right = parse_expression(p, bp)?;
    Ok(Expression::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

/// The assignment family. Right-associative: the value recurses one level
/// below assignment so `a = b = c` groups as `a = (b = c)`.
pub(crate) fn parse_assignment(
    p: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, ParseError> {
    let operator = p.advance();
    let value = parse_expression(p, BindingPower::Comma)?;
    Ok(Expression::Assignment {
        assignee: Box::new(left),
        operator,
        value: Box::new(value),
    })
}

/// `lower .. upper`, left-associative at logical power.
pub(crate) fn parse_range(
    p: &mut Parser,
    left: Expression,
    bp: BindingPower,
) -> Result<Expression, ParseError> {
    p.advance();
    let upper = parse_expression(p, bp)?;
    Ok(Expression::Range {
        lower: Box::new(left),
        upper: Box::new(upper),
    })
}

/// `object.name` and `object[index]` share one handler; the consumed
/// operator token tells them apart.
pub(crate) fn parse_member(
    p: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, ParseError> {
    let is_computed = p.advance().kind == TokenKind::OpenBracket;

    if is_computed {
        let index = parse_expression(p, BindingPower::Default)?;
        p.expect(TokenKind::CloseBracket)?;
        return Ok(Expression::Computed {
            object: Box::new(left),
            index: Box::new(index),
        });
    }

    let property = p.expect(TokenKind::Identifier)?.lexeme;
    Ok(Expression::Member {
        object: Box::new(left),
        property,
    })
}

/// `callee(arg, arg, ...)`. Arguments bind at assignment power.
pub(crate) fn parse_call(
    p: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, ParseError> {
    p.advance();
    let mut arguments = Vec::new();

    while p.has_tokens() && p.current_kind() != TokenKind::CloseParen {
        arguments.push(parse_expression(p, BindingPower::Assignment)?);

        if !p.current().is_one_of(&[TokenKind::Eof, TokenKind::CloseParen]) {
            p.expect(TokenKind::Comma)?;
        }
    }

    p.expect(TokenKind::CloseParen)?;
    Ok(Expression::Call {
        callee: Box::new(left),
        arguments,
    })
}

/// `Name { prop -> expr; ... }`. The left side must be a bare symbol, the
/// property names must be unique, and every entry except the last requires
/// a `;` terminator.
pub(crate) fn parse_struct_instantiation(
    p: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, ParseError> {
    let Expression::Symbol(name) = left else {
        return Err(p.error(ParseErrorKind::InvalidInstantiationTarget));
    };

    p.expect(TokenKind::OpenCurly)?;
    let mut properties: Vec<(String, Expression)> = Vec::new();

    while p.has_tokens() && p.current_kind() != TokenKind::CloseCurly {
        let prop = p.expect(TokenKind::Identifier)?.lexeme;
        if properties.iter().any(|(existing, _)| *existing == prop) {
            return Err(p.error(ParseErrorKind::DuplicateStructProperty(prop)));
        }
        p.expect(TokenKind::Pointer)?;
        let value = parse_expression(p, BindingPower::Logical)?;
        properties.push((prop, value));

        if p.current_kind() != TokenKind::CloseCurly {
            p.expect(TokenKind::SemiColon)?;
        }
    }

    p.expect(TokenKind::CloseCurly)?;
    Ok(Expression::StructInstantiation { name, properties })
}

/// `( expr )`. Struct instantiation is re-enabled inside the parentheses.
pub(crate) fn parse_grouping(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::OpenParen)?;
    let saved = p.structs_allowed;
    p.structs_allowed = true;
    let inner = parse_expression(p, BindingPower::Default);
    p.structs_allowed = saved;
    let inner = inner?;
    p.expect(TokenKind::CloseParen)?;
    Ok(inner)
}

/// `[a, b, c]`, `[]`, or the instantiation forms `[] Type { ... }` and
/// `[len] Type { ... }`. A type name after `]` selects instantiation.
pub(crate) fn parse_array(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::OpenBracket)?;

    // `[]` -- either an empty literal or a lengthless instantiation.
    if p.current_kind() == TokenKind::CloseBracket {
        p.advance();
        if p.current_kind() == TokenKind::Identifier {
            return parse_array_instantiation(p, None);
        }
        return Ok(Expression::ArrayLiteral { items: Vec::new() });
    }

    let first = parse_expression(p, BindingPower::Logical)?;

    // `[len] Type { ... }`
    if p.current_kind() == TokenKind::CloseBracket {
        p.advance();
        if p.current_kind() == TokenKind::Identifier {
            return parse_array_instantiation(p, Some(Box::new(first)));
        }
        return Ok(Expression::ArrayLiteral { items: vec![first] });
    }

    // Plain literal with two or more items.
    let mut items = vec![first];
    while p.has_tokens() && p.current_kind() != TokenKind::CloseBracket {
        p.expect(TokenKind::Comma)?;
        items.push(parse_expression(p, BindingPower::Logical)?);
    }
    p.expect(TokenKind::CloseBracket)?;
    Ok(Expression::ArrayLiteral { items })
}

/// The `Type { item, item }` tail of an array instantiation. Items are
/// comma-separated with no trailing comma.
fn parse_array_instantiation(
    p: &mut Parser,
    length: Option<Box<Expression>>,
) -> Result<Expression, ParseError> {
    let underlying = types::parse_type(p, BindingPower::Default)?;
    p.expect(TokenKind::OpenCurly)?;

    let mut items = Vec::new();
    if p.current_kind() != TokenKind::CloseCurly {
        loop {
            items.push(parse_expression(p, BindingPower::Logical)?);
            if p.current_kind() == TokenKind::Comma {
                p.advance();
            } else {
                break;
            }
        }
    }

    p.expect(TokenKind::CloseCurly)?;
    Ok(Expression::ArrayInstantiation {
        underlying,
        length,
        items,
    })
}

/// `function (params) -> Type { body }` in expression position.
pub(crate) fn parse_function_expression(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::Function)?;
    let (parameters, return_type, body) = statements::parse_params_and_body(p)?;
    Ok(Expression::Function {
        parameters,
        return_type,
        body,
    })
}

/// `new expr`. The operand binds at unary power so calls and member access
/// stay attached: `new Foo(1).bar`.
pub(crate) fn parse_new(p: &mut Parser) -> Result<Expression, ParseError> {
    p.expect(TokenKind::New)?;
    let target = parse_expression(p, BindingPower::Unary)?;
    Ok(Expression::New(Box::new(target)))
}
