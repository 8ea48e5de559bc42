//! Servo bytecode compiler.
//!
//! A single recursive walk over the typed AST. Every statement leaves the
//! operand stack balanced; every compiled expression leaves exactly one
//! value. Integer and string literals are interned into the constant pool;
//! names resolve through the symbol table to global slots.
//!
//! Constructs the language parses but the VM has no semantics for (member
//! access, calls, foreach, ranges, ...) are rejected with a [`CompileError`]
//! naming the construct.

mod symbol_table;

use std::rc::Rc;

use servo_code::{make, Instructions, Opcode};
use servo_common::{CompileError, TokenKind};
use servo_object::Object;
use servo_parser::ast::{Block, Expression, Statement};

pub use symbol_table::{Symbol, SymbolTable};

/// The compiled artifact: a flat instruction buffer plus its constant pool.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Rc<Object>>,
}

/// Tracks the most recently emitted instruction so a branch's trailing
/// `OpPop` can be dropped when the branch must yield a value.
#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Rc<Object>>,
    symbol_table: SymbolTable,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_state(SymbolTable::new(), Vec::new())
    }

    /// Resume with a symbol table and constant pool carried over from an
    /// earlier compilation (the REPL does this every turn).
    pub fn with_state(symbol_table: SymbolTable, constants: Vec<Rc<Object>>) -> Self {
        Self {
            instructions: Instructions::new(),
            constants,
            symbol_table,
            last_instruction: None,
            previous_instruction: None,
        }
    }

    /// Compile a whole program.
    pub fn compile(&mut self, program: &Block) -> Result<(), CompileError> {
        for statement in &program.body {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    /// The compiled artifact so far.
    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.instructions.clone(),
            constants: self.constants.clone(),
        }
    }

    /// Surrender the carry-over state for the next compilation.
    pub fn into_state(self) -> (SymbolTable, Vec<Rc<Object>>) {
        (self.symbol_table, self.constants)
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Block(block) => {
                for statement in &block.body {
                    self.compile_statement(statement)?;
                }
                Ok(())
            }
            Statement::Expression(expression) => {
                self.compile_expression(expression)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Statement::VarDecl { name, value, .. } => {
                let symbol = self.symbol_table.define(name);
                match value {
                    Some(expression) => self.compile_expression(expression)?,
                    // Type-only declaration: the slot starts out null.
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                }
                self.emit(Opcode::SetGlobal, &[symbol.index]);
                Ok(())
            }
            Statement::If {
                condition,
                consequent,
                alternate,
            } => self.compile_if(condition, consequent, alternate.as_deref()),
            Statement::FunctionDecl(decl) => Err(CompileError::new(format!(
                "no bytecode semantics for function declaration {:?}",
                decl.name
            ))),
            Statement::Foreach { .. } => {
                Err(CompileError::new("no bytecode semantics for foreach"))
            }
            Statement::Import { .. } => {
                Err(CompileError::new("no bytecode semantics for import"))
            }
            Statement::Scope { .. } => {
                Err(CompileError::new("no bytecode semantics for scope"))
            }
            Statement::StructDecl { name, .. } => Err(CompileError::new(format!(
                "no bytecode semantics for struct declaration {name:?}"
            ))),
            Statement::ClassDecl { name, .. } => Err(CompileError::new(format!(
                "no bytecode semantics for class declaration {name:?}"
            ))),
            Statement::Public(_)
            | Statement::Private(_)
            | Statement::Protected(_)
            | Statement::Static(_) => {
                Err(CompileError::new("no bytecode semantics for access modifiers"))
            }
        }
    }

    /// Conditional lowering with absolute back-patched jumps.
    ///
    /// Each branch yields a value: a branch ending in an expression
    /// statement keeps that value by dropping its trailing `OpPop`, and a
    /// missing else yields null. The statement closes with one `OpPop` to
    /// stay stack-balanced.
    fn compile_if(
        &mut self,
        condition: &Expression,
        consequent: &Block,
        alternate: Option<&Statement>,
    ) -> Result<(), CompileError> {
        self.compile_expression(condition)?;

        // Placeholder operand, patched once the else position is known.
        let jump_not_truthy = self.emit(Opcode::JumpNotTruthy, &[9999]);

        for statement in &consequent.body {
            self.compile_statement(statement)?;
        }
        if self.last_instruction_is(Opcode::Pop) {
            self.remove_last_pop();
        }

        let jump = self.emit(Opcode::Jump, &[9999]);
        let else_pos = self.instructions.len();
        self.change_operand(jump_not_truthy, else_pos);

        match alternate {
            Some(statement) => {
                self.compile_statement(statement)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_pop();
                }
            }
            None => {
                self.emit(Opcode::Null, &[]);
            }
        }

        let end_pos = self.instructions.len();
        self.change_operand(jump, end_pos);

        self.emit(Opcode::Pop, &[]);
        Ok(())
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompileError> {
        match expression {
            Expression::Number(value) => {
                let integral = value.fract() == 0.0
                    && *value >= i64::MIN as f64
                    && *value <= i64::MAX as f64;
                if !integral {
                    return Err(CompileError::new(format!(
                        "non-integral number constant {value} is not supported"
                    )));
                }
                let index = self.add_constant(Object::Integer(*value as i64));
                self.emit(Opcode::Constant, &[index]);
                Ok(())
            }
            Expression::String(value) => {
                let index = self.add_constant(Object::Str(value.clone()));
                self.emit(Opcode::Constant, &[index]);
                Ok(())
            }
            Expression::Bool(value) => {
                self.emit(if *value { Opcode::True } else { Opcode::False }, &[]);
                Ok(())
            }
            Expression::Symbol(name) => {
                let symbol = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| CompileError::new(format!("undefined variable {name}")))?
                    .clone();
                self.emit(Opcode::GetGlobal, &[symbol.index]);
                Ok(())
            }
            Expression::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator.kind {
                    TokenKind::Not => {
                        self.emit(Opcode::Bang, &[]);
                    }
                    TokenKind::Dash => {
                        self.emit(Opcode::Minus, &[]);
                    }
                    _ => {
                        return Err(CompileError::new(format!(
                            "unknown operator {}",
                            operator.lexeme
                        )))
                    }
                }
                Ok(())
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => self.compile_binary(left, operator.kind, &operator.lexeme, right),
            Expression::Assignment {
                assignee,
                operator,
                value,
            } => {
                if operator.kind != TokenKind::Assignment {
                    return Err(CompileError::new(format!(
                        "unknown operator {}",
                        operator.lexeme
                    )));
                }
                let Expression::Symbol(name) = assignee.as_ref() else {
                    return Err(CompileError::new(
                        "assignment target must be a variable name",
                    ));
                };
                let symbol = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| CompileError::new(format!("undefined variable {name}")))?
                    .clone();
                self.compile_expression(value)?;
                self.emit(Opcode::SetGlobal, &[symbol.index]);
                // The assignment is itself an expression; read the slot back
                // so one value is left on the stack.
                self.emit(Opcode::GetGlobal, &[symbol.index]);
                Ok(())
            }
            Expression::ArrayLiteral { items } => {
                for item in items {
                    self.compile_expression(item)?;
                }
                self.emit(Opcode::Array, &[items.len()]);
                Ok(())
            }
            Expression::StructInstantiation { properties, .. } => {
                // The language's hash-shaped literal: property names become
                // string keys, values compile in source order.
                for (name, value) in properties {
                    let index = self.add_constant(Object::Str(name.clone()));
                    self.emit(Opcode::Constant, &[index]);
                    self.compile_expression(value)?;
                }
                self.emit(Opcode::Hash, &[properties.len() * 2]);
                Ok(())
            }
            Expression::Member { .. } => {
                Err(CompileError::new("no bytecode semantics for member access"))
            }
            Expression::Computed { .. } => {
                Err(CompileError::new("no bytecode semantics for computed access"))
            }
            Expression::Call { .. } => {
                Err(CompileError::new("no bytecode semantics for call expressions"))
            }
            Expression::Function { .. } => {
                Err(CompileError::new("no bytecode semantics for function expressions"))
            }
            Expression::ArrayInstantiation { .. } => {
                Err(CompileError::new("no bytecode semantics for array instantiation"))
            }
            Expression::Range { .. } => {
                Err(CompileError::new("no bytecode semantics for range expressions"))
            }
            Expression::New(_) => {
                Err(CompileError::new("no bytecode semantics for new expressions"))
            }
        }
    }

    fn compile_binary(
        &mut self,
        left: &Expression,
        kind: TokenKind,
        lexeme: &str,
        right: &Expression,
    ) -> Result<(), CompileError> {
        // The VM only implements greater-than; `x < y` compiles as `y > x`.
        if kind == TokenKind::Less {
            self.compile_expression(right)?;
            self.compile_expression(left)?;
            self.emit(Opcode::GreaterThan, &[]);
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;

        let op = match kind {
            TokenKind::Plus => Opcode::Add,
            TokenKind::Dash => Opcode::Sub,
            TokenKind::Star => Opcode::Mul,
            TokenKind::Slash => Opcode::Div,
            TokenKind::Percent => Opcode::Mod,
            TokenKind::Pow => Opcode::Pow,
            TokenKind::Greater => Opcode::GreaterThan,
            TokenKind::Equals => Opcode::Equal,
            TokenKind::NotEquals => Opcode::NotEqual,
            _ => return Err(CompileError::new(format!("unknown operator {lexeme}"))),
        };
        self.emit(op, &[]);
        Ok(())
    }

    // ── Emission ───────────────────────────────────────────────────────

    fn add_constant(&mut self, object: Object) -> usize {
        self.constants.push(Rc::new(object));
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let position = self.instructions.push(&make(op, operands));
        self.previous_instruction = self.last_instruction;
        self.last_instruction = Some(EmittedInstruction {
            opcode: op,
            position,
        });
        position
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        self.last_instruction
            .map(|last| last.opcode == op)
            .unwrap_or(false)
    }

    fn remove_last_pop(&mut self) {
        if let Some(last) = self.last_instruction {
            self.instructions.0.truncate(last.position);
            self.last_instruction = self.previous_instruction;
        }
    }

    /// Back-patch the u16 operand of the instruction at `position`.
    fn change_operand(&mut self, position: usize, operand: usize) {
        let encoded = (operand as u16).to_be_bytes();
        self.instructions.0[position + 1] = encoded[0];
        self.instructions.0[position + 2] = encoded[1];
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a parsed program into a fresh bytecode artifact.
pub fn compile(program: &Block) -> Result<Bytecode, CompileError> {
    let mut compiler = Compiler::new();
    compiler.compile(program)?;
    Ok(compiler.bytecode())
}
