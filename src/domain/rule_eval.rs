//! Predicate evaluation.
//!
//! Evaluates a parsed [`Predicate`] against a single augmented bar.
//!
//! # Evaluation Semantics
//!
//! - Fields resolve to the bar's price or indicator value; an indicator still
//!   in warmup resolves to nothing
//! - A comparison with an unresolved operand, or whose arithmetic produces a
//!   non-finite number, is [`Truth::Unknown`]
//! - `and` / `or` / `not` follow Kleene three-valued logic
//! - Only [`Truth::True`] counts as firing

use crate::domain::indicator::AugmentedBar;
use crate::domain::rule::{ArithOp, CmpOp, Expr, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    fn from_bool(b: bool) -> Self {
        if b { Truth::True } else { Truth::False }
    }

    fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }

    fn or(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::True, _) | (_, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            _ => Truth::Unknown,
        }
    }

    fn not(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }
}

pub fn evaluate(predicate: &Predicate, bar: &AugmentedBar) -> Truth {
    match predicate {
        Predicate::Compare { op, left, right } => {
            match (evaluate_expr(left, bar), evaluate_expr(right, bar)) {
                (Some(l), Some(r)) => Truth::from_bool(compare(*op, l, r)),
                _ => Truth::Unknown,
            }
        }
        Predicate::And(a, b) => {
            let left = evaluate(a, bar);
            if left == Truth::False {
                return Truth::False;
            }
            left.and(evaluate(b, bar))
        }
        Predicate::Or(a, b) => {
            let left = evaluate(a, bar);
            if left == Truth::True {
                return Truth::True;
            }
            left.or(evaluate(b, bar))
        }
        Predicate::Not(inner) => evaluate(inner, bar).not(),
    }
}

/// True only when the predicate definitely holds on this bar.
pub fn fires(predicate: &Predicate, bar: &AugmentedBar) -> bool {
    evaluate(predicate, bar).is_true()
}

pub fn evaluate_expr(expr: &Expr, bar: &AugmentedBar) -> Option<f64> {
    let value = match expr {
        Expr::Constant(v) => *v,
        Expr::Field(field) => field.resolve(bar)?,
        Expr::Neg(inner) => -evaluate_expr(inner, bar)?,
        Expr::Binary { op, left, right } => {
            let l = evaluate_expr(left, bar)?;
            let r = evaluate_expr(right, bar)?;
            match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
            }
        }
    };
    value.is_finite().then_some(value)
}

fn compare(op: CmpOp, l: f64, r: f64) -> bool {
    match op {
        CmpOp::Gt => l > r,
        CmpOp::Lt => l < r,
        CmpOp::Ge => l >= r,
        CmpOp::Le => l <= r,
        CmpOp::Eq => l == r,
        CmpOp::Ne => l != r,
    }
}
