//! Postfix evaluation against raw payload bytes

use super::{CompiledFormula, Token, MAX_FORMULA_TOKENS};
use crate::error::EvalError;
use crate::stack::TokenStack;

impl CompiledFormula {
    /// Evaluate against raw payload bytes (`raw[0]` is operand `A`)
    ///
    /// The identity formula combines every byte of `raw`, most significant
    /// first. Division by zero yields infinity (or NaN for `0/0`) rather
    /// than an error.
    pub fn evaluate(&self, raw: &[u8]) -> Result<f64, EvalError> {
        let needed = if self.is_identity() {
            1
        } else {
            self.operands
        };
        if raw.len() < needed {
            return Err(EvalError::InsufficientBytes {
                needed,
                available: raw.len(),
            });
        }

        if self.is_identity() {
            let value = raw
                .iter()
                .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
            return Ok(value as f64);
        }

        // Compiled sequences never exceed the token limit, so neither can the stack
        let mut stack: TokenStack<f64, MAX_FORMULA_TOKENS> = TokenStack::new();
        for token in &self.tokens {
            match *token {
                Token::Operand(index) => stack.push(f64::from(raw[usize::from(index)])),
                Token::Literal(value) => stack.push(value),
                Token::Operator(op) => {
                    let rhs = stack.pop();
                    let lhs = stack.pop();
                    stack.push(op.apply(lhs, rhs));
                }
            }
        }

        assert_eq!(stack.len(), 1, "malformed compiled formula");
        Ok(stack.pop())
    }
}
