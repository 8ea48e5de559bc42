//! The type sub-grammar: a parallel Pratt machine restricted to types.

use servo_common::{ParseError, ParseErrorKind, TokenKind};

use crate::ast::Type;
use crate::lookups::{BindingPower, TYPE_LOOKUPS};
use crate::parser::Parser;

/// The precedence-climbing loop over the type tables.
pub(crate) fn parse_type(p: &mut Parser, bp: BindingPower) -> Result<Type, ParseError> {
    let kind = p.current_kind();
    let nud = TYPE_LOOKUPS
        .nud
        .get(&kind)
        .copied()
        .ok_or_else(|| p.error(ParseErrorKind::MissingTypeHandler(kind)))?;

    let mut left = nud(p)?;

    loop {
        let kind = p.current_kind();
        if TYPE_LOOKUPS.power(kind) <= bp {
            break;
        }
        let led = TYPE_LOOKUPS
            .led
            .get(&kind)
            .copied()
            .ok_or_else(|| p.error(ParseErrorKind::MissingTypeHandler(kind)))?;
        left = led(p, left, TYPE_LOOKUPS.power(kind))?;
    }

    Ok(left)
}

/// A named type: `Number`.
pub(crate) fn parse_symbol_type(p: &mut Parser) -> Result<Type, ParseError> {
    Ok(Type::Symbol(p.expect(TokenKind::Identifier)?.lexeme))
}

/// `[]T`
pub(crate) fn parse_list_type(p: &mut Parser) -> Result<Type, ParseError> {
    p.expect(TokenKind::OpenBracket)?;
    p.expect(TokenKind::CloseBracket)?;
    let inner = parse_type(p, BindingPower::Default)?;
    Ok(Type::List(Box::new(inner)))
}

/// `T[]`
pub(crate) fn parse_array_type(
    p: &mut Parser,
    left: Type,
    _bp: BindingPower,
) -> Result<Type, ParseError> {
    p.expect(TokenKind::OpenBracket)?;
    p.expect(TokenKind::CloseBracket)?;
    Ok(Type::Array(Box::new(left)))
}
