//! Runtime object model for the Servo VM.
//!
//! A closed variant set. Values flow through the VM as `Rc<Object>`;
//! constants, globals, and stack slots all share the same allocations, so
//! the identity comparison `==`/`!=` uses on non-integers falls out of
//! `Rc::ptr_eq`.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use servo_common::VmError;

/// Signature of a native function exposed to the VM.
pub type BuiltinFn = fn(Vec<Rc<Object>>) -> Result<Rc<Object>, VmError>;

/// Any Servo runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Array(Vec<Rc<Object>>),
    Hash(FxHashMap<HashKey, HashPair>),
    Null,
    /// A native function. Part of the closed set; the bytecode currently has
    /// no call opcode, so nothing constructs one.
    Builtin(BuiltinFn),
}

impl Object {
    /// The immutable type tag, used in error messages and by `typeof`.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Str(_) => "STRING",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Null => "NULL",
            Object::Builtin(_) => "BUILTIN",
        }
    }

    /// Human-readable rendering of the value.
    pub fn inspect(&self) -> String {
        match self {
            Object::Integer(value) => value.to_string(),
            Object::Boolean(value) => value.to_string(),
            Object::Str(value) => value.clone(),
            Object::Array(elements) => {
                let rendered: Vec<_> = elements.iter().map(|e| e.inspect()).collect();
                format!("[{}]", rendered.join(", "))
            }
            Object::Hash(pairs) => {
                let mut rendered: Vec<_> = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key.inspect(), pair.value.inspect()))
                    .collect();
                rendered.sort();
                format!("{{{}}}", rendered.join(", "))
            }
            Object::Null => "null".to_string(),
            Object::Builtin(_) => "builtin function".to_string(),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

/// The hashable capability: only integers, booleans, and strings may key a
/// hash. The VM rejects anything else at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    Str(String),
}

impl HashKey {
    /// Try to derive a hash key from a runtime value.
    pub fn from_object(obj: &Object) -> Result<HashKey, VmError> {
        match obj {
            Object::Integer(value) => Ok(HashKey::Integer(*value)),
            Object::Boolean(value) => Ok(HashKey::Boolean(*value)),
            Object::Str(value) => Ok(HashKey::Str(value.clone())),
            other => Err(VmError::new(format!(
                "unusable as hash key: {}",
                other.type_tag()
            ))),
        }
    }
}

/// A key/value entry. The original key object is kept so `inspect` can
/// render it.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

thread_local! {
    static TRUE_OBJ: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE_OBJ: Rc<Object> = Rc::new(Object::Boolean(false));
    static NULL_OBJ: Rc<Object> = Rc::new(Object::Null);
}

/// The shared `true` singleton. All trues are the same allocation, so
/// identity comparison doubles as value comparison.
pub fn true_value() -> Rc<Object> {
    TRUE_OBJ.with(Rc::clone)
}

/// The shared `false` singleton.
pub fn false_value() -> Rc<Object> {
    FALSE_OBJ.with(Rc::clone)
}

/// The shared `null` singleton.
pub fn null_value() -> Rc<Object> {
    NULL_OBJ.with(Rc::clone)
}

/// Select the shared boolean singleton for a native bool.
pub fn bool_value(value: bool) -> Rc<Object> {
    if value {
        true_value()
    } else {
        false_value()
    }
}
