//! Arithmetic evaluation tool
//!
//! The expression passes a character allow-list first, then a real
//! recursive-descent parser; there is no dynamic code evaluation anywhere.

mod expr;

pub(crate) use expr::{evaluate, format_value};

use super::{Tool, ToolOutput};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::LazyLock;

/// Characters an expression may contain: digits, the four operators,
/// parentheses, decimal points, and whitespace
static ALLOWED_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-*/().\s]+$").expect("static regex"));

/// Full-match check against the expression allow-list
pub(crate) fn is_allowed_expression(expression: &str) -> bool {
    !expression.trim().is_empty() && ALLOWED_EXPRESSION.is_match(expression)
}

/// Produce the user-facing text for an expression, total on bad input
pub(crate) fn calculate(expression: &str) -> String {
    if !is_allowed_expression(expression) {
        return "I can only calculate basic mathematical expressions with numbers and operators (+, -, *, /, parentheses).".to_string();
    }
    match evaluate(expression) {
        Ok(value) => format!(
            "The result of {} is: {}",
            expression.trim(),
            format_value(value)
        ),
        Err(e) => format!("I couldn't calculate that expression. Error: {e}"),
    }
}

pub struct CalculatorTool;

#[derive(Debug, Deserialize)]
struct CalcInput {
    expression: String,
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculate_math"
    }

    fn description(&self) -> String {
        "Calculate a mathematical expression safely.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["expression"],
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Arithmetic expression using numbers, +, -, *, /, and parentheses"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        match serde_json::from_value::<CalcInput>(input) {
            Ok(args) => ToolOutput::success(calculate(&args.expression)),
            Err(e) => ToolOutput::error(format!("Invalid input: {e}")),
        }
    }
}
