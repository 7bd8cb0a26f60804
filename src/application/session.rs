//! The evaluate-then-record flow shared by the keypad and the command line.

use crate::domain::{EvalResult, ExpressionEvaluator, Number};
use crate::infrastructure::EvaluationLogger;

/// Evaluates `text` and, on success, appends it to `logger`.
///
/// Failed evaluations are never recorded. Recording is best-effort: a
/// [`LogError`](crate::infrastructure::LogError) is reported through
/// `tracing` and dropped, so the caller only sees evaluation failures.
pub fn evaluate_and_record(text: &str, logger: Option<&EvaluationLogger>) -> EvalResult<Number> {
    let value = ExpressionEvaluator::new().evaluate(text)?;

    if let Some(logger) = logger {
        if let Err(err) = logger.record(text, &value) {
            tracing::warn!(%err, "evaluation log unavailable, continuing without it");
        }
    }

    Ok(value)
}
