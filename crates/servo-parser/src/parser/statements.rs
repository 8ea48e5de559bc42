//! Statement handlers, dispatched from a statement's leading token.

use servo_common::{ParseError, ParseErrorKind, TokenKind};

use crate::ast::{Block, FunctionDecl, Parameter, Statement, StructProperty, Type};
use crate::lookups::BindingPower;
use crate::parser::{expressions, parse_statement, types, Parser};

/// An expression terminated by `;`.
pub(crate) fn parse_expression_statement(p: &mut Parser) -> Result<Statement, ParseError> {
    let expression = expressions::parse_expression(p, BindingPower::Default)?;
    p.expect(TokenKind::SemiColon)?;
    Ok(Statement::Expression(expression))
}

/// `{ ... }` as a statement.
pub(crate) fn parse_block_statement(p: &mut Parser) -> Result<Statement, ParseError> {
    Ok(Statement::Block(parse_block(p)?))
}

/// `{ statements }`, shared by blocks, branches, and class bodies.
pub(crate) fn parse_block(p: &mut Parser) -> Result<Block, ParseError> {
    p.expect(TokenKind::OpenCurly)?;
    let mut body = Vec::new();

    while p.has_tokens() && p.current_kind() != TokenKind::CloseCurly {
        body.push(parse_statement(p)?);
    }

    p.expect(TokenKind::CloseCurly)?;
    Ok(Block { body })
}

/// `let`/`var`/`const` declarations.
///
/// `let name -> Type;`, `let name = value;`, or both. A constant requires a
/// value; a declaration with neither type nor value is rejected.
pub(crate) fn parse_var_decl(p: &mut Parser) -> Result<Statement, ParseError> {
    let constant = p.advance().kind == TokenKind::Const;
    let name = p.expect(TokenKind::Identifier)?.lexeme;

    let explicit_type = if p.current_kind() == TokenKind::Pointer {
        p.advance();
        Some(types::parse_type(p, BindingPower::Default)?)
    } else {
        None
    };

    let value = if p.current_kind() == TokenKind::Assignment {
        p.advance();
        Some(expressions::parse_expression(p, BindingPower::Assignment)?)
    } else {
        None
    };

    if constant && value.is_none() {
        return Err(p.error(ParseErrorKind::ConstantWithoutValue(name)));
    }
    if explicit_type.is_none() && value.is_none() {
        return Err(p.error(ParseErrorKind::DeclarationWithoutTypeOrValue(name)));
    }

    p.expect(TokenKind::SemiColon)?;
    Ok(Statement::VarDecl {
        name,
        constant,
        explicit_type,
        value,
    })
}

/// The `(params) -> Type { body }` tail shared by function declarations and
/// function expressions. Parameters are `name Type` pairs.
pub(crate) fn parse_params_and_body(
    p: &mut Parser,
) -> Result<(Vec<Parameter>, Option<Type>, Vec<Statement>), ParseError> {
    let mut parameters = Vec::new();

    p.expect(TokenKind::OpenParen)?;
    while p.has_tokens() && p.current_kind() != TokenKind::CloseParen {
        let name = p.expect(TokenKind::Identifier)?.lexeme;
        let ty = types::parse_type(p, BindingPower::Default)?;
        parameters.push(Parameter { name, ty });

        if !p.current().is_one_of(&[TokenKind::CloseParen, TokenKind::Eof]) {
            p.expect(TokenKind::Comma)?;
        }
    }
    p.expect(TokenKind::CloseParen)?;

    let return_type = if p.current_kind() == TokenKind::Pointer {
        p.advance();
        Some(types::parse_type(p, BindingPower::Default)?)
    } else {
        None
    };

    let body = parse_block(p)?.body;
    Ok((parameters, return_type, body))
}

/// `function name (params) -> Type { body }`
pub(crate) fn parse_function_decl(p: &mut Parser) -> Result<Statement, ParseError> {
    p.advance();
    let name = p.expect(TokenKind::Identifier)?.lexeme;
    let (parameters, return_type, body) = parse_params_and_body(p)?;

    Ok(Statement::FunctionDecl(FunctionDecl {
        name,
        parameters,
        return_type,
        body,
    }))
}

/// `if cond { ... } else { ... }` with `else if` chains.
///
/// Struct instantiation is disabled while the condition parses so the
/// consequent block is never mistaken for a struct literal. A single
/// trailing `;` after the statement is tolerated.
pub(crate) fn parse_if(p: &mut Parser) -> Result<Statement, ParseError> {
    p.advance();

    let saved = p.structs_allowed;
    p.structs_allowed = false;
    let condition = expressions::parse_expression(p, BindingPower::Assignment);
    p.structs_allowed = saved;
    let condition = condition?;

    let consequent = parse_block(p)?;

    let alternate = if p.current_kind() == TokenKind::Else {
        p.advance();
        let stmt = if p.current_kind() == TokenKind::If {
            parse_if(p)?
        } else {
            parse_block_statement(p)?
        };
        Some(Box::new(stmt))
    } else {
        None
    };

    if p.current_kind() == TokenKind::SemiColon {
        p.advance();
    }

    Ok(Statement::If {
        condition,
        consequent,
        alternate,
    })
}

/// `foreach (value (, index)? in iterable) { ... }`
pub(crate) fn parse_foreach(p: &mut Parser) -> Result<Statement, ParseError> {
    p.advance();
    p.expect(TokenKind::OpenParen)?;
    let value = p.expect(TokenKind::Identifier)?.lexeme;

    let with_index = if p.current_kind() == TokenKind::Comma {
        p.advance();
        p.expect(TokenKind::Identifier)?;
        true
    } else {
        false
    };

    p.expect(TokenKind::In)?;

    let saved = p.structs_allowed;
    p.structs_allowed = false;
    let iterable = expressions::parse_expression(p, BindingPower::Default);
    p.structs_allowed = saved;
    let iterable = iterable?;

    p.expect(TokenKind::CloseParen)?;
    let body = parse_block(p)?;

    Ok(Statement::Foreach {
        value,
        with_index,
        iterable,
        body,
    })
}

/// `import name (from "path")? ;`
pub(crate) fn parse_import(p: &mut Parser) -> Result<Statement, ParseError> {
    p.advance();
    let name = p.expect(TokenKind::Identifier)?.lexeme;

    let from = if p.current_kind() == TokenKind::From {
        p.advance();
        Some(p.expect(TokenKind::String)?.lexeme)
    } else {
        None
    };

    p.expect(TokenKind::SemiColon)?;
    Ok(Statement::Import { name, from })
}

/// `scope a.b.c ;`
pub(crate) fn parse_scope(p: &mut Parser) -> Result<Statement, ParseError> {
    p.advance();
    let mut path = vec![p.expect(TokenKind::Identifier)?.lexeme];

    while p.current_kind() == TokenKind::Dot {
        p.advance();
        path.push(p.expect(TokenKind::Identifier)?.lexeme);
    }

    p.expect(TokenKind::SemiColon)?;
    Ok(Statement::Scope { path })
}

/// `struct Name { prop -> Type; ... }`. Function declarations inside the
/// body become methods; property names must be unique.
pub(crate) fn parse_struct_decl(p: &mut Parser) -> Result<Statement, ParseError> {
    p.advance();
    let name = p.expect(TokenKind::Identifier)?.lexeme;
    p.expect(TokenKind::OpenCurly)?;

    let mut properties: Vec<StructProperty> = Vec::new();
    let mut methods = Vec::new();

    while p.has_tokens() && p.current_kind() != TokenKind::CloseCurly {
        if p.current_kind() == TokenKind::Function {
            match parse_function_decl(p)? {
                Statement::FunctionDecl(decl) => methods.push(decl),
                _ => unreachable!("function declarations always produce FunctionDecl"),
            }
            continue;
        }

        let prop = p.expect(TokenKind::Identifier)?.lexeme;
        if properties.iter().any(|existing| existing.name == prop) {
            return Err(p.error(ParseErrorKind::DuplicateStructProperty(prop)));
        }
        p.expect(TokenKind::Pointer)?;
        let ty = types::parse_type(p, BindingPower::Default)?;
        p.expect(TokenKind::SemiColon)?;
        properties.push(StructProperty { name: prop, ty });
    }

    p.expect(TokenKind::CloseCurly)?;
    Ok(Statement::StructDecl {
        name,
        properties,
        methods,
    })
}

/// `class Name { ... }`
pub(crate) fn parse_class_decl(p: &mut Parser) -> Result<Statement, ParseError> {
    p.advance();
    let name = p.expect(TokenKind::Identifier)?.lexeme;
    let body = parse_block(p)?;
    Ok(Statement::ClassDecl { name, body })
}

/// `public`/`private`/`protected`/`static` wrap the following declaration.
pub(crate) fn parse_modifier(p: &mut Parser) -> Result<Statement, ParseError> {
    let keyword = p.advance();
    let inner = Box::new(parse_statement(p)?);

    Ok(match keyword.kind {
        TokenKind::Public => Statement::Public(inner),
        TokenKind::Private => Statement::Private(inner),
        TokenKind::Protected => Statement::Protected(inner),
        TokenKind::Static => Statement::Static(inner),
        kind => unreachable!("modifier handler registered for {kind}"),
    })
}
