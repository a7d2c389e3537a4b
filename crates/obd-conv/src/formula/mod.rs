//! Conversion formulas
//!
//! A PID's formula is an infix arithmetic expression over operand letters
//! (`A` is the first raw payload byte, `B` the second, ...), decimal literals,
//! `+ - * /` and parentheses. It is compiled once, at schema load, into a
//! postfix token sequence that the evaluator walks for every frame.

mod compile;
mod eval;

use std::fmt;

pub use compile::compile;

/// Token limit shared by the compiler and evaluator stacks
pub const MAX_FORMULA_TOKENS: usize = 32;

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Binding strength; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }

    /// Apply to two operands. Division by zero follows IEEE-754 (infinity or NaN).
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
            Operator::Div => lhs / rhs,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }
}

/// One element of a compiled formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// Index into the raw payload bytes (A = 0)
    Operand(u8),
    /// Numeric literal
    Literal(f64),
    /// Binary operator
    Operator(Operator),
}

// Filler for unused stack slots
impl Default for Token {
    fn default() -> Self {
        Token::Literal(0.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Operand(index) => write!(f, "{}", char::from(b'A' + index)),
            Token::Literal(value) => write!(f, "{}", value),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
        }
    }
}

/// Postfix token sequence produced by [`compile`]
///
/// An empty sequence is the identity formula: the raw bytes, most significant
/// first, taken as the value itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledFormula {
    tokens: Vec<Token>,
    operands: usize,
}

impl CompiledFormula {
    /// Identity (pass-through) formula
    ///
    /// Raw bytes are read as a big-endian integer, the wire order of
    /// multi-byte PIDs (`A*256+B`), not the host's native order.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Postfix tokens in evaluation order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of distinct operand letters referenced
    pub fn operand_count(&self) -> usize {
        self.operands
    }
}

impl fmt::Display for CompiledFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str("<identity>");
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}
