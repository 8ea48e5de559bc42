//! The Servo virtual machine.
//!
//! A register-less interpreter: one operand stack of fixed size, one global
//! slot array, and a fetch-decode-execute loop over the instruction buffer.
//! Operand reads advance the instruction pointer; jump opcodes assign it to
//! absolute byte offsets that the compiler back-patched in.
//!
//! The globals array can be passed in from outside (and taken back out) so a
//! driver like the REPL can persist state across runs.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use servo_code::{read_u16, Instructions, Opcode};
use servo_common::VmError;
use servo_compiler::Bytecode;
use servo_object::{
    bool_value, false_value, null_value, true_value, HashKey, HashPair, Object,
};

/// Maximum operand-stack depth.
pub const STACK_SIZE: usize = 2048;
/// Number of global slots.
pub const GLOBALS_SIZE: usize = 65536;

/// A fresh global store, every slot null.
pub fn new_globals() -> Vec<Rc<Object>> {
    vec![null_value(); GLOBALS_SIZE]
}

pub struct Vm {
    constants: Vec<Rc<Object>>,
    instructions: Instructions,
    stack: Vec<Rc<Object>>,
    globals: Vec<Rc<Object>>,
    last_popped: Option<Rc<Object>>,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Self {
        Self::with_global_store(bytecode, new_globals())
    }

    /// Run against an externally owned global store. The caller gets it back
    /// through [`Vm::into_global_store`] after the run.
    pub fn with_global_store(bytecode: Bytecode, mut globals: Vec<Rc<Object>>) -> Self {
        if globals.len() < GLOBALS_SIZE {
            globals.resize(GLOBALS_SIZE, null_value());
        }
        Self {
            constants: bytecode.constants,
            instructions: bytecode.instructions,
            stack: Vec::with_capacity(STACK_SIZE),
            globals,
            last_popped: None,
        }
    }

    /// The value most recently popped off the stack; null before any pop.
    ///
    /// Expression statements pop their value last, so after a successful run
    /// this is the program's result.
    pub fn last_popped(&self) -> Rc<Object> {
        self.last_popped.clone().unwrap_or_else(null_value)
    }

    /// Surrender the global store for the next run.
    pub fn into_global_store(self) -> Vec<Rc<Object>> {
        self.globals
    }

    /// The fetch-decode-execute loop.
    pub fn run(&mut self) -> Result<(), VmError> {
        let mut ip = 0;

        while ip < self.instructions.len() {
            let op = Opcode::try_from(self.instructions.0[ip])
                .map_err(|byte| VmError::new(format!("unknown opcode {byte}")))?;
            ip += 1;

            match op {
                Opcode::Constant => {
                    let index = self.operand(&mut ip);
                    let constant = self
                        .constants
                        .get(index)
                        .cloned()
                        .ok_or_else(|| {
                            VmError::new(format!("constant index {index} out of range"))
                        })?;
                    self.push(constant)?;
                }

                Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::Pow => self.execute_binary_operation(op)?,

                Opcode::Equal | Opcode::NotEqual | Opcode::GreaterThan => {
                    self.execute_comparison(op)?
                }

                Opcode::True => self.push(true_value())?,
                Opcode::False => self.push(false_value())?,
                Opcode::Null => self.push(null_value())?,

                Opcode::Bang => self.execute_bang_operator()?,
                Opcode::Minus => self.execute_minus_operator()?,

                Opcode::Jump => {
                    ip = self.operand(&mut ip);
                }
                Opcode::JumpNotTruthy => {
                    let target = self.operand(&mut ip);
                    let condition = self.pop()?;
                    if !is_truthy(&condition) {
                        ip = target;
                    }
                }

                Opcode::Pop => {
                    self.pop()?;
                }

                Opcode::SetGlobal => {
                    let index = self.operand(&mut ip);
                    self.globals[index] = self.pop()?;
                }
                Opcode::GetGlobal => {
                    let index = self.operand(&mut ip);
                    self.push(Rc::clone(&self.globals[index]))?;
                }

                Opcode::Array => {
                    let count = self.operand(&mut ip);
                    let elements = self.take(count)?;
                    self.push(Rc::new(Object::Array(elements)))?;
                }
                Opcode::Hash => {
                    let count = self.operand(&mut ip);
                    let hash = self.build_hash(count)?;
                    self.push(Rc::new(hash))?;
                }
            }
        }

        Ok(())
    }

    // ── Stack discipline ───────────────────────────────────────────────

    fn push(&mut self, object: Rc<Object>) -> Result<(), VmError> {
        if self.stack.len() >= STACK_SIZE {
            return Err(VmError::new("stack overflow"));
        }
        self.stack.push(object);
        Ok(())
    }

    fn pop(&mut self) -> Result<Rc<Object>, VmError> {
        let object = self
            .stack
            .pop()
            .ok_or_else(|| VmError::new("stack underflow"))?;
        self.last_popped = Some(Rc::clone(&object));
        Ok(object)
    }

    /// Remove the top `count` values, preserving stack order.
    fn take(&mut self, count: usize) -> Result<Vec<Rc<Object>>, VmError> {
        if self.stack.len() < count {
            return Err(VmError::new("stack underflow"));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    /// Read the u16 operand at `ip` and advance past it.
    fn operand(&self, ip: &mut usize) -> usize {
        let value = read_u16(&self.instructions.0[*ip..]) as usize;
        *ip += 2;
        value
    }

    // ── Operators ──────────────────────────────────────────────────────

    fn execute_binary_operation(&mut self, op: Opcode) -> Result<(), VmError> {
        let right = self.pop()?;
        let left = self.pop()?;

        match (left.as_ref(), right.as_ref()) {
            (Object::Integer(l), Object::Integer(r)) => {
                self.execute_binary_integer_operation(op, *l, *r)
            }
            (Object::Str(l), _) if op == Opcode::Add => {
                let result = match right.as_ref() {
                    Object::Str(r) => format!("{l}{r}"),
                    Object::Integer(r) => format!("{l}{r}"),
                    other => {
                        return Err(VmError::new(format!(
                            "unsupported types for binary operation: STRING {}",
                            other.type_tag()
                        )))
                    }
                };
                self.push(Rc::new(Object::Str(result)))
            }
            (Object::Str(l), Object::Integer(r)) if op == Opcode::Sub => {
                let length = l.chars().count();
                if *r < 0 || *r as usize > length {
                    return Err(VmError::new(format!(
                        "cannot truncate {r} characters from a string of length {length}"
                    )));
                }
                let kept: String = l.chars().take(length - *r as usize).collect();
                self.push(Rc::new(Object::Str(kept)))
            }
            (l, r) => Err(VmError::new(format!(
                "unsupported types for binary operation: {} {}",
                l.type_tag(),
                r.type_tag()
            ))),
        }
    }

    /// Integer arithmetic wraps; division and modulo by zero are errors;
    /// exponentiation goes through f64 and truncates back.
    fn execute_binary_integer_operation(
        &mut self,
        op: Opcode,
        left: i64,
        right: i64,
    ) -> Result<(), VmError> {
        let result = match op {
            Opcode::Add => left.wrapping_add(right),
            Opcode::Sub => left.wrapping_sub(right),
            Opcode::Mul => left.wrapping_mul(right),
            Opcode::Div => {
                if right == 0 {
                    return Err(VmError::new("division by zero"));
                }
                left.wrapping_div(right)
            }
            Opcode::Mod => {
                if right == 0 {
                    return Err(VmError::new("division by zero"));
                }
                left.wrapping_rem(right)
            }
            Opcode::Pow => (left as f64).powf(right as f64) as i64,
            _ => {
                return Err(VmError::new(format!(
                    "unknown integer operation: {}",
                    op.name()
                )))
            }
        };
        self.push(Rc::new(Object::Integer(result)))
    }

    /// Integers compare numerically; everything else compares by identity,
    /// which is sound because booleans and null are singletons.
    fn execute_comparison(&mut self, op: Opcode) -> Result<(), VmError> {
        let right = self.pop()?;
        let left = self.pop()?;

        if let (Object::Integer(l), Object::Integer(r)) = (left.as_ref(), right.as_ref()) {
            let result = match op {
                Opcode::Equal => l == r,
                Opcode::NotEqual => l != r,
                Opcode::GreaterThan => l > r,
                _ => {
                    return Err(VmError::new(format!(
                        "unknown comparison operator: {}",
                        op.name()
                    )))
                }
            };
            return self.push(bool_value(result));
        }

        match op {
            Opcode::Equal => self.push(bool_value(Rc::ptr_eq(&left, &right))),
            Opcode::NotEqual => self.push(bool_value(!Rc::ptr_eq(&left, &right))),
            _ => Err(VmError::new(format!(
                "unknown comparison operator: {} ({} {})",
                op.name(),
                left.type_tag(),
                right.type_tag()
            ))),
        }
    }

    fn execute_bang_operator(&mut self) -> Result<(), VmError> {
        let operand = self.pop()?;
        let result = match operand.as_ref() {
            Object::Boolean(true) => false_value(),
            Object::Boolean(false) => true_value(),
            Object::Null => true_value(),
            _ => false_value(),
        };
        self.push(result)
    }

    fn execute_minus_operator(&mut self) -> Result<(), VmError> {
        let operand = self.pop()?;
        let Object::Integer(value) = operand.as_ref() else {
            return Err(VmError::new(format!(
                "unsupported type for negation: {}",
                operand.type_tag()
            )));
        };
        self.push(Rc::new(Object::Integer(value.wrapping_neg())))
    }

    /// Pair the top `count` stack values (alternating key/value) into a
    /// hash. Every key must be hashable.
    fn build_hash(&mut self, count: usize) -> Result<Object, VmError> {
        let entries = self.take(count)?;
        let mut pairs = FxHashMap::default();

        for entry in entries.chunks_exact(2) {
            let key = Rc::clone(&entry[0]);
            let value = Rc::clone(&entry[1]);
            let hash_key = HashKey::from_object(&key)?;
            pairs.insert(hash_key, HashPair { key, value });
        }

        Ok(Object::Hash(pairs))
    }
}

/// The canonical truthiness mapping used by conditional jumps.
///
/// Booleans are themselves, null is false, and an integer is truthy exactly
/// when it is non-negative. Everything else is truthy.
pub fn is_truthy(object: &Object) -> bool {
    match object {
        Object::Boolean(value) => *value,
        Object::Integer(value) => *value >= 0,
        Object::Null => false,
        _ => true,
    }
}

/// Run a compiled program and return the last-popped value.
///
/// Pass a global store to persist state across runs; otherwise a fresh one
/// is used and discarded.
pub fn run(
    bytecode: Bytecode,
    globals: Option<Vec<Rc<Object>>>,
) -> Result<Rc<Object>, VmError> {
    let mut vm = match globals {
        Some(globals) => Vm::with_global_store(bytecode, globals),
        None => Vm::new(bytecode),
    };
    vm.run()?;
    Ok(vm.last_popped())
}
