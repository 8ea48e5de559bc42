//! Pratt dispatch tables.
//!
//! Four tables drive expression and statement parsing: null-denotation
//! (prefix) handlers, left-denotation (infix) handlers, binding powers, and
//! statement handlers, all keyed by token kind. A parallel pair of tables
//! drives the type sub-grammar. The tables are built once at first use and
//! are read-only afterwards.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use servo_common::{ParseError, TokenKind};

use crate::ast::{Expression, Statement, Type};
use crate::parser::{expressions, statements, types, Parser};

/// Precedence of a token when it appears as an operator. Higher binds
/// tighter. Kinds missing from the binding-power table implicitly have
/// `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BindingPower {
    Default,
    Comma,
    Assignment,
    Logical,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Member,
    Primary,
}

pub(crate) type StmtHandler = fn(&mut Parser) -> Result<Statement, ParseError>;
pub(crate) type NudHandler = fn(&mut Parser) -> Result<Expression, ParseError>;
pub(crate) type LedHandler =
    fn(&mut Parser, Expression, BindingPower) -> Result<Expression, ParseError>;
pub(crate) type TypeNudHandler = fn(&mut Parser) -> Result<Type, ParseError>;
pub(crate) type TypeLedHandler =
    fn(&mut Parser, Type, BindingPower) -> Result<Type, ParseError>;

/// The expression/statement dispatch tables.
pub(crate) struct Lookups {
    pub nud: FxHashMap<TokenKind, NudHandler>,
    pub led: FxHashMap<TokenKind, LedHandler>,
    pub bp: FxHashMap<TokenKind, BindingPower>,
    pub stmt: FxHashMap<TokenKind, StmtHandler>,
}

impl Lookups {
    /// Binding power of a token kind; unregistered kinds are `Default`.
    pub fn power(&self, kind: TokenKind) -> BindingPower {
        self.bp.get(&kind).copied().unwrap_or(BindingPower::Default)
    }

    fn led(&mut self, kind: TokenKind, bp: BindingPower, handler: LedHandler) {
        self.bp.insert(kind, bp);
        self.led.insert(kind, handler);
    }

    /// Register a prefix handler. The binding-power slot is only filled when
    /// no infix registration claimed it already, so `-` stays additive and
    /// `(` stays at call power.
    fn nud(&mut self, kind: TokenKind, handler: NudHandler) {
        self.bp.entry(kind).or_insert(BindingPower::Primary);
        self.nud.insert(kind, handler);
    }

    fn stmt(&mut self, kind: TokenKind, handler: StmtHandler) {
        self.stmt.insert(kind, handler);
    }
}

/// The type-grammar dispatch tables.
pub(crate) struct TypeLookups {
    pub nud: FxHashMap<TokenKind, TypeNudHandler>,
    pub led: FxHashMap<TokenKind, TypeLedHandler>,
    pub bp: FxHashMap<TokenKind, BindingPower>,
}

impl TypeLookups {
    pub fn power(&self, kind: TokenKind) -> BindingPower {
        self.bp.get(&kind).copied().unwrap_or(BindingPower::Default)
    }
}

pub(crate) static LOOKUPS: Lazy<Lookups> = Lazy::new(|| {
    use BindingPower as Bp;
    use TokenKind::*;

    let mut lu = Lookups {
        nud: FxHashMap::default(),
        led: FxHashMap::default(),
        bp: FxHashMap::default(),
        stmt: FxHashMap::default(),
    };

    // Assignment family (right-associative inside the handler).
    lu.led(Assignment, Bp::Assignment, expressions::parse_assignment);
    lu.led(PlusEquals, Bp::Assignment, expressions::parse_assignment);
    lu.led(MinusEquals, Bp::Assignment, expressions::parse_assignment);
    lu.led(StarEquals, Bp::Assignment, expressions::parse_assignment);
    lu.led(SlashEquals, Bp::Assignment, expressions::parse_assignment);
    lu.led(ModEquals, Bp::Assignment, expressions::parse_assignment);
    lu.led(PowEquals, Bp::Assignment, expressions::parse_assignment);
    lu.led(NullishAssignment, Bp::Assignment, expressions::parse_assignment);

    // Logical, and range at the same level.
    lu.led(And, Bp::Logical, expressions::parse_binary);
    lu.led(Or, Bp::Logical, expressions::parse_binary);
    lu.led(DotDot, Bp::Logical, expressions::parse_range);

    // Relational.
    lu.led(Less, Bp::Relational, expressions::parse_binary);
    lu.led(LessEquals, Bp::Relational, expressions::parse_binary);
    lu.led(Greater, Bp::Relational, expressions::parse_binary);
    lu.led(GreaterEquals, Bp::Relational, expressions::parse_binary);
    lu.led(Equals, Bp::Relational, expressions::parse_binary);
    lu.led(NotEquals, Bp::Relational, expressions::parse_binary);

    // Additive and multiplicative.
    lu.led(Plus, Bp::Additive, expressions::parse_binary);
    lu.led(Dash, Bp::Additive, expressions::parse_binary);
    lu.led(Star, Bp::Multiplicative, expressions::parse_binary);
    lu.led(Slash, Bp::Multiplicative, expressions::parse_binary);
    lu.led(Percent, Bp::Multiplicative, expressions::parse_binary);
    lu.led(Pow, Bp::Multiplicative, expressions::parse_binary);

    // Member / computed / call / struct instantiation.
    lu.led(Dot, Bp::Member, expressions::parse_member);
    lu.led(OpenBracket, Bp::Member, expressions::parse_member);
    lu.led(OpenParen, Bp::Call, expressions::parse_call);
    lu.led(OpenCurly, Bp::Call, expressions::parse_struct_instantiation);

    // Literals and symbols.
    lu.nud(Number, expressions::parse_primary);
    lu.nud(Integer, expressions::parse_primary);
    lu.nud(Float, expressions::parse_primary);
    lu.nud(Boolean, expressions::parse_primary);
    lu.nud(String, expressions::parse_primary);
    lu.nud(Identifier, expressions::parse_primary);

    // Unary prefix.
    lu.nud(Typeof, expressions::parse_prefix);
    lu.nud(Dash, expressions::parse_prefix);
    lu.nud(Not, expressions::parse_prefix);

    // Grouping and the remaining prefix forms.
    lu.nud(OpenParen, expressions::parse_grouping);
    lu.nud(OpenBracket, expressions::parse_array);
    lu.nud(Function, expressions::parse_function_expression);
    lu.nud(New, expressions::parse_new);

    // Statements, dispatched from the leading token.
    lu.stmt(OpenCurly, statements::parse_block_statement);
    lu.stmt(Let, statements::parse_var_decl);
    lu.stmt(Var, statements::parse_var_decl);
    lu.stmt(Const, statements::parse_var_decl);
    lu.stmt(Function, statements::parse_function_decl);
    lu.stmt(If, statements::parse_if);
    lu.stmt(Foreach, statements::parse_foreach);
    lu.stmt(Import, statements::parse_import);
    lu.stmt(Scope, statements::parse_scope);
    lu.stmt(Struct, statements::parse_struct_decl);
    lu.stmt(Class, statements::parse_class_decl);
    lu.stmt(Public, statements::parse_modifier);
    lu.stmt(Private, statements::parse_modifier);
    lu.stmt(Protected, statements::parse_modifier);
    lu.stmt(Static, statements::parse_modifier);

    lu
});

pub(crate) static TYPE_LOOKUPS: Lazy<TypeLookups> = Lazy::new(|| {
    use TokenKind::*;

    let mut lu = TypeLookups {
        nud: FxHashMap::default(),
        led: FxHashMap::default(),
        bp: FxHashMap::default(),
    };

    // Named types: `Number`.
    lu.nud.insert(Identifier, types::parse_symbol_type as TypeNudHandler);
    lu.bp.insert(Identifier, BindingPower::Primary);

    // `[]T`
    lu.nud.insert(OpenBracket, types::parse_list_type as TypeNudHandler);

    // `T[]`
    lu.led.insert(OpenBracket, types::parse_array_type as TypeLedHandler);
    lu.bp.insert(OpenBracket, BindingPower::Call);

    lu
});
