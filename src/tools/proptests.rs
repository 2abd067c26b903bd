//! Property-based tests for the calculator pipeline
//!
//! Invariants covered:
//! - the evaluator agrees with a reference AST interpretation
//! - calculation is total over arbitrary input
//! - anything outside the character allow-list is refused, never evaluated
//! - extracted expressions always satisfy the allow-list

use super::calculator::{calculate, is_allowed_expression};
use crate::extract::{extract_city, extract_expression};
use proptest::prelude::*;

/// Reference expression tree, rendered to text and re-evaluated
#[derive(Debug, Clone)]
enum Ast {
    Num(i64),
    Add(Box<Ast>, Box<Ast>),
    Sub(Box<Ast>, Box<Ast>),
    Mul(Box<Ast>, Box<Ast>),
}

impl Ast {
    fn value(&self) -> f64 {
        match self {
            Ast::Num(n) => *n as f64,
            Ast::Add(a, b) => a.value() + b.value(),
            Ast::Sub(a, b) => a.value() - b.value(),
            Ast::Mul(a, b) => a.value() * b.value(),
        }
    }

    fn render(&self) -> String {
        match self {
            Ast::Num(n) => n.to_string(),
            Ast::Add(a, b) => format!("({} + {})", a.render(), b.render()),
            Ast::Sub(a, b) => format!("({} - {})", a.render(), b.render()),
            Ast::Mul(a, b) => format!("({} * {})", a.render(), b.render()),
        }
    }
}

fn arb_ast() -> impl Strategy<Value = Ast> {
    let leaf = (0i64..50).prop_map(Ast::Num);
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::Sub(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Ast::Mul(Box::new(a), Box::new(b))),
        ]
    })
}

proptest! {
    #[test]
    fn evaluator_matches_reference(ast in arb_ast()) {
        let rendered = ast.render();
        let evaluated = super::calculator::evaluate(&rendered).unwrap();
        // All generated values are integral and well within f64's exact range
        prop_assert!((evaluated - ast.value()).abs() < 1e-9, "{rendered}");
    }

    #[test]
    fn calculate_is_total(input in ".*") {
        let reply = calculate(&input);
        prop_assert!(!reply.is_empty());
    }

    #[test]
    fn disallowed_characters_are_refused(input in ".*[a-zA-Z^%$#@!].*") {
        let reply = calculate(&input);
        prop_assert!(reply.contains("only calculate basic"));
    }

    #[test]
    fn extracted_expressions_satisfy_allow_list(input in ".*") {
        if let Some(expression) = extract_expression(&input) {
            prop_assert!(is_allowed_expression(&expression));
        }
    }

    #[test]
    fn extract_city_is_total(input in ".*") {
        if let Some(city) = extract_city(&input) {
            prop_assert!(!city.trim().is_empty());
        }
    }
}
