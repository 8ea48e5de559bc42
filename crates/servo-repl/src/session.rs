//! REPL session state.
//!
//! Tracks the symbol table, constant pool, and global store across
//! evaluations so one line can use the previous line's definitions. The
//! compiler appends to the carried constants during compilation only, and
//! the VM owns the globals for the duration of each run.

use std::fmt;
use std::mem;
use std::rc::Rc;

use servo_common::{CompileError, ParseError, VmError};
use servo_compiler::{Compiler, SymbolTable};
use servo_object::Object;
use servo_vm::{new_globals, Vm};

/// Why an evaluation failed. The session survives; later lines still see
/// every definition made before the failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplError {
    Parse(ParseError),
    Compile(CompileError),
    Vm(VmError),
}

impl fmt::Display for ReplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplError::Parse(err) => write!(f, "{err}"),
            ReplError::Compile(err) => write!(f, "compile error: {err}"),
            ReplError::Vm(err) => write!(f, "runtime error: {err}"),
        }
    }
}

/// Persistent state for a REPL session.
pub struct ReplSession {
    symbols: SymbolTable,
    constants: Vec<Rc<Object>>,
    globals: Vec<Rc<Object>>,
}

impl ReplSession {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            constants: Vec::new(),
            globals: new_globals(),
        }
    }

    /// Tokenize, parse, compile, and run one line; returns the last-popped
    /// value.
    pub fn eval(&mut self, source: &str) -> Result<Rc<Object>, ReplError> {
        let program = servo_parser::parse(source, None).map_err(ReplError::Parse)?;

        let symbols = mem::take(&mut self.symbols);
        let constants = mem::take(&mut self.constants);
        let mut compiler = Compiler::with_state(symbols, constants);

        let compiled = compiler.compile(&program);
        let bytecode = compiler.bytecode();
        (self.symbols, self.constants) = compiler.into_state();
        compiled.map_err(ReplError::Compile)?;

        let mut vm = Vm::with_global_store(bytecode, mem::take(&mut self.globals));
        let outcome = vm.run();
        let result = vm.last_popped();
        self.globals = vm.into_global_store();
        outcome.map_err(ReplError::Vm)?;

        Ok(result)
    }
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new()
    }
}
