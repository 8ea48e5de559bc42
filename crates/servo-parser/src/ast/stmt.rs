use serde::Serialize;

use crate::ast::{Expression, Parameter, Type};

/// An ordered sequence of statements. The whole program is one of these;
/// `{ ... }` statements and function bodies reuse it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub body: Vec<Statement>,
}

/// Any statement node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// `{ ... }`
    Block(Block),
    /// An expression terminated by `;`.
    Expression(Expression),
    /// `let`/`var`/`const` declaration. A constant must carry a value; every
    /// declaration carries at least one of explicit type and value.
    VarDecl {
        name: String,
        constant: bool,
        explicit_type: Option<Type>,
        value: Option<Expression>,
    },
    /// `function name (params) -> Type { body }`
    FunctionDecl(FunctionDecl),
    /// `if expr block (else (if ... | block))?`
    If {
        condition: Expression,
        consequent: Block,
        alternate: Option<Box<Statement>>,
    },
    /// `foreach (value (, index)? in iterable) block`
    Foreach {
        value: String,
        with_index: bool,
        iterable: Expression,
        body: Block,
    },
    /// `import name (from "path")? ;`
    Import {
        name: String,
        from: Option<String>,
    },
    /// `scope a.b.c ;`
    Scope { path: Vec<String> },
    /// `struct Name { prop -> Type; ... }` with optional method declarations.
    StructDecl {
        name: String,
        properties: Vec<StructProperty>,
        methods: Vec<FunctionDecl>,
    },
    /// `class Name { ... }`
    ClassDecl { name: String, body: Block },
    /// Access-modifier wrappers around the next declaration.
    Public(Box<Statement>),
    Private(Box<Statement>),
    Protected(Box<Statement>),
    Static(Box<Statement>),
}

/// A named function declaration (also reused for struct methods).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: Vec<Statement>,
}

/// A struct property: `name -> Type;`. Names are unique within a struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructProperty {
    pub name: String,
    pub ty: Type,
}
