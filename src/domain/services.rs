//! Expression evaluation services for the calculator.
//!
//! This module provides the evaluation engine that turns raw user input into
//! a [`Number`]. Input is parsed by the restricted grammar in
//! [`parser`](super::parser); only a tree that parsed completely is ever
//! evaluated.

use super::errors::{EvalError, EvalResult};
use super::models::Number;
use super::parser::{BinaryOp, Expr, Parser, UnaryOp};

/// Evaluates calculator expressions.
///
/// Supported features:
/// - Integer and float literals: `42`, `3.14`, `.5`, `1e3`
/// - Arithmetic operators: `+`, `-`, `*`, `/`, `//`, `%`, `**`
/// - Unary `+` and `-`
/// - Parentheses
///
/// Everything else (names, calls, comparisons, strings, collections) is
/// rejected with [`EvalError::InvalidExpression`].
///
/// # Examples
///
/// ```
/// use tcalc::domain::ExpressionEvaluator;
///
/// let evaluator = ExpressionEvaluator::new();
/// assert_eq!(evaluator.evaluate("2*3+4").unwrap().to_string(), "10");
/// assert_eq!(evaluator.evaluate("10/4").unwrap().to_string(), "2.5");
/// assert!(evaluator.evaluate("abs(-1)").is_err());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Parses and evaluates `text`.
    ///
    /// # Errors
    ///
    /// - [`EvalError::InvalidExpression`] if `text` is empty or not derivable
    ///   from the arithmetic grammar
    /// - [`EvalError::DivisionByZero`] for `/`, `//` or `%` by zero, and for
    ///   zero raised to a negative power
    /// - [`EvalError::Overflow`] / [`EvalError::NotReal`] for results the
    ///   numeric model cannot represent
    pub fn evaluate(&self, text: &str) -> EvalResult<Number> {
        let ast = Parser::new(text)?.parse()?;
        tracing::debug!(expression = text, tree = %ast, "parsed expression");

        let result = self.evaluate_expr(&ast);
        match &result {
            Ok(value) => tracing::debug!(expression = text, %value, "evaluated expression"),
            Err(err) => tracing::debug!(expression = text, %err, "evaluation failed"),
        }
        result
    }

    /// Evaluates an already parsed tree, left operand first.
    pub fn evaluate_expr(&self, expr: &Expr) -> EvalResult<Number> {
        match expr {
            Expr::Number(value) => Ok(value.clone()),

            Expr::Unary { operator, operand } => {
                let value = self.evaluate_expr(operand)?;
                match operator {
                    UnaryOp::Plus => Ok(value),
                    UnaryOp::Minus => Ok(-value),
                }
            }

            Expr::Chain { first, rest } => {
                let mut value = self.evaluate_expr(first)?;
                for (operator, operand) in rest {
                    let right_val = self.evaluate_expr(operand)?;
                    value = apply(*operator, &value, &right_val)?;
                }
                Ok(value)
            }

            Expr::Binary { left, operator, right } => {
                let left_val = self.evaluate_expr(left)?;
                let right_val = self.evaluate_expr(right)?;
                apply(*operator, &left_val, &right_val)
            }
        }
    }
}

fn apply(operator: BinaryOp, left: &Number, right: &Number) -> EvalResult<Number> {
    match operator {
        BinaryOp::Add => left.add(right),
        BinaryOp::Subtract => left.subtract(right),
        BinaryOp::Multiply => left.multiply(right),
        BinaryOp::Divide => left.divide(right),
        BinaryOp::FloorDivide => left.floor_divide(right),
        BinaryOp::Modulo => left.modulo(right),
        BinaryOp::Power => left.power(right),
    }
}

/// Evaluates `text` with a default [`ExpressionEvaluator`].
pub fn evaluate(text: &str) -> Result<Number, EvalError> {
    ExpressionEvaluator::new().evaluate(text)
}
