use serde::Serialize;

/// A type annotation.
///
/// Both array spellings survive in the grammar: `[]T` produces `List` and
/// `T[]` produces `Array`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    /// A named type, e.g. `Number`.
    Symbol(String),
    /// `T[]`
    Array(Box<Type>),
    /// `[]T`
    List(Box<Type>),
}
