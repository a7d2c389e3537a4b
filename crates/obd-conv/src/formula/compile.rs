//! Infix to postfix compilation (shunting-yard)

use tracing::trace;

use super::{CompiledFormula, Operator, Token, MAX_FORMULA_TOKENS};
use crate::error::CompileError;
use crate::stack::TokenStack;

/// Entry on the pending-operator stack
#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Pending {
    #[default]
    LeftParen,
    Operator(Operator),
}

/// Scanner state: what the grammar accepts next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Operand, literal or `(`
    AwaitingOperand,
    /// Operator or `)`
    Scanning,
}

struct Compiler {
    output: TokenStack<Token, MAX_FORMULA_TOKENS>,
    pending: TokenStack<Pending, MAX_FORMULA_TOKENS>,
    state: ScanState,
    /// Index of the next operand letter not yet bound
    next_operand: u8,
}

/// Compile a formula into postfix order
///
/// Blank input compiles to [`CompiledFormula::identity`].
///
/// # Example
///
/// ```rust
/// use obd_conv::formula::{compile, Operator, Token};
///
/// let formula = compile("A*256+B").unwrap();
/// assert_eq!(
///     formula.tokens(),
///     &[
///         Token::Operand(0),
///         Token::Literal(256.0),
///         Token::Operator(Operator::Mul),
///         Token::Operand(1),
///         Token::Operator(Operator::Add),
///     ]
/// );
/// ```
pub fn compile(source: &str) -> Result<CompiledFormula, CompileError> {
    if source.trim().is_empty() {
        return Ok(CompiledFormula::identity());
    }

    let mut compiler = Compiler::new();
    let mut chars = source.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            c if c.is_ascii_whitespace() => {}
            'A'..='Z' => compiler.operand(position, c)?,
            '0'..='9' | '.' => {
                let mut end = position + 1;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &source[position..end];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| CompileError::InvalidLiteral(text.to_string()))?;
                compiler.literal(position, value)?;
            }
            '+' => compiler.operator(position, Operator::Add)?,
            '-' => compiler.operator(position, Operator::Sub)?,
            '*' => compiler.operator(position, Operator::Mul)?,
            '/' => compiler.operator(position, Operator::Div)?,
            '(' => compiler.left_paren(position)?,
            ')' => compiler.right_paren(position)?,
            _ => return Err(CompileError::UnknownToken { token: c, position }),
        }
    }

    let formula = compiler.finish()?;
    trace!(source, postfix = %formula, "Compiled formula");
    Ok(formula)
}

impl Compiler {
    fn new() -> Self {
        Self {
            output: TokenStack::new(),
            pending: TokenStack::new(),
            state: ScanState::AwaitingOperand,
            next_operand: 0,
        }
    }

    fn expect(&self, state: ScanState, position: usize) -> Result<(), CompileError> {
        if self.state == state {
            Ok(())
        } else {
            Err(CompileError::UnexpectedToken { position })
        }
    }

    fn emit(&mut self, token: Token) -> Result<(), CompileError> {
        if self.output.is_full() {
            return Err(CompileError::TokenOverflow {
                limit: self.output.capacity(),
            });
        }
        self.output.push(token);
        Ok(())
    }

    fn defer(&mut self, entry: Pending) -> Result<(), CompileError> {
        if self.pending.is_full() {
            return Err(CompileError::TokenOverflow {
                limit: self.pending.capacity(),
            });
        }
        self.pending.push(entry);
        Ok(())
    }

    fn operand(&mut self, position: usize, letter: char) -> Result<(), CompileError> {
        self.expect(ScanState::AwaitingOperand, position)?;

        let index = letter as u8 - b'A';
        if index > self.next_operand {
            return Err(CompileError::NonContiguousOperand {
                expected: char::from(b'A' + self.next_operand),
                found: letter,
            });
        }
        if index == self.next_operand {
            self.next_operand += 1;
        }

        self.emit(Token::Operand(index))?;
        self.state = ScanState::Scanning;
        Ok(())
    }

    fn literal(&mut self, position: usize, value: f64) -> Result<(), CompileError> {
        self.expect(ScanState::AwaitingOperand, position)?;
        self.emit(Token::Literal(value))?;
        self.state = ScanState::Scanning;
        Ok(())
    }

    fn operator(&mut self, position: usize, op: Operator) -> Result<(), CompileError> {
        self.expect(ScanState::Scanning, position)?;

        // Left-associative: equal precedence pops too
        while let Some(Pending::Operator(top)) = self.pending.peek() {
            if top.precedence() < op.precedence() {
                break;
            }
            self.pending.pop();
            self.emit(Token::Operator(top))?;
        }

        self.defer(Pending::Operator(op))?;
        self.state = ScanState::AwaitingOperand;
        Ok(())
    }

    fn left_paren(&mut self, position: usize) -> Result<(), CompileError> {
        self.expect(ScanState::AwaitingOperand, position)?;
        self.defer(Pending::LeftParen)
    }

    fn right_paren(&mut self, position: usize) -> Result<(), CompileError> {
        self.expect(ScanState::Scanning, position)?;

        loop {
            match self.pending.peek() {
                None => return Err(CompileError::UnbalancedParens),
                Some(Pending::LeftParen) => {
                    self.pending.pop();
                    return Ok(());
                }
                Some(Pending::Operator(op)) => {
                    self.pending.pop();
                    self.emit(Token::Operator(op))?;
                }
            }
        }
    }

    fn finish(mut self) -> Result<CompiledFormula, CompileError> {
        if self.state == ScanState::AwaitingOperand {
            return Err(CompileError::UnexpectedEnd);
        }

        while !self.pending.is_empty() {
            match self.pending.pop() {
                Pending::LeftParen => return Err(CompileError::UnbalancedParens),
                Pending::Operator(op) => self.emit(Token::Operator(op))?,
            }
        }

        // Output storage is already in postfix order, oldest first
        Ok(CompiledFormula {
            tokens: self.output.to_vec(),
            operands: usize::from(self.next_operand),
        })
    }
}
