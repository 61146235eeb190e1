//! Arithmetic expression evaluation for the calculator tool, backed by `meval`.

use crate::error::{MathGptError, Result};

/// Longest expression accepted, in characters.
const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest parenthesis nesting or run of sign operators accepted.
const MAX_NESTING: usize = 256;

/// Evaluation context: `meval` built-ins plus the names models tend to write.
fn context<'a>() -> meval::Context<'a> {
    let mut ctx = meval::Context::new();
    ctx.var("tau", std::f64::consts::TAU)
        .func("log", f64::ln)
        .func("log10", f64::log10)
        .func("log2", f64::log2)
        .func2("pow", f64::powf);
    ctx
}

/// Rewrite operator spellings `meval` does not know.
fn normalize(expression: &str) -> String {
    expression
        .trim()
        .to_lowercase()
        .replace("**", "^")
        .replace('×', "*")
        .replace('÷', "/")
        .replace('−', "-")
}

/// Reject input whose size or nesting is out of bounds before parsing it.
fn check_bounds(expression: &str) -> Result<()> {
    let len = expression.chars().count();
    if len > MAX_EXPRESSION_LEN {
        return Err(MathGptError::Evaluation(format!(
            "expression too long ({} characters, limit {})",
            len, MAX_EXPRESSION_LEN
        )));
    }

    let mut depth = 0usize;
    let mut signs = 0usize;
    for c in expression.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        signs = if c == '+' || c == '-' { signs + 1 } else { 0 };

        if depth > MAX_NESTING || signs > MAX_NESTING {
            return Err(MathGptError::Evaluation(format!(
                "expression nested too deeply (limit {})",
                MAX_NESTING
            )));
        }
    }

    Ok(())
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64> {
    let expression = normalize(expression);
    if expression.is_empty() {
        return Err(MathGptError::Evaluation("empty expression".to_string()));
    }
    check_bounds(&expression)?;

    let value = meval::eval_str_with_context(&expression, &context())
        .map_err(|e| MathGptError::Evaluation(e.to_string()))?;

    if !value.is_finite() {
        return Err(MathGptError::Evaluation(format!(
            "result of '{}' is not a finite number",
            expression
        )));
    }

    Ok(value)
}

/// Format a result: integral values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
