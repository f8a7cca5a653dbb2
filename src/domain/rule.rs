//! Predicate AST data structures.
//!
//! This module defines the abstract syntax tree for buy/sell conditions:
//! - `Field`: the closed set of named bar and indicator values
//! - `Expr`: numeric expressions over fields and constants
//! - `Predicate`: comparisons combined with `and` / `or` / `not`

use std::fmt;

use crate::domain::indicator::AugmentedBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
    ShortMa,
    LongMa,
    Rsi,
    Macd,
    MacdSignal,
    BbUpper,
    BbLower,
    BbMiddle,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::ShortMa,
        Field::LongMa,
        Field::Rsi,
        Field::Macd,
        Field::MacdSignal,
        Field::BbUpper,
        Field::BbLower,
        Field::BbMiddle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::ShortMa => "short_ma",
            Field::LongMa => "long_ma",
            Field::Rsi => "rsi",
            Field::Macd => "macd",
            Field::MacdSignal => "macd_signal",
            Field::BbUpper => "bb_upper",
            Field::BbLower => "bb_lower",
            Field::BbMiddle => "bb_middle",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Value of this field on a bar; `None` while an indicator is warming up.
    pub fn resolve(self, bar: &AugmentedBar) -> Option<f64> {
        let ind = &bar.indicators;
        match self {
            Field::Open => Some(bar.bar.open),
            Field::High => Some(bar.bar.high),
            Field::Low => Some(bar.bar.low),
            Field::Close => Some(bar.bar.close),
            Field::Volume => Some(bar.bar.volume),
            Field::ShortMa => ind.short_ma,
            Field::LongMa => ind.long_ma,
            Field::Rsi => ind.rsi,
            Field::Macd => ind.macd,
            Field::MacdSignal => ind.macd_signal,
            Field::BbUpper => ind.bb_upper,
            Field::BbLower => ind.bb_lower,
            Field::BbMiddle => ind.bb_middle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Sub => '-',
            ArithOp::Mul => '*',
            ArithOp::Div => '/',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    Field(Field),
    Neg(Box<Expr>),
    Binary {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        op: CmpOp,
        left: Expr,
        right: Expr,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Every field the predicate reads, in first-use order without duplicates.
    pub fn fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        collect_predicate_fields(self, &mut out);
        out
    }
}

fn collect_predicate_fields(pred: &Predicate, out: &mut Vec<Field>) {
    match pred {
        Predicate::Compare { left, right, .. } => {
            collect_expr_fields(left, out);
            collect_expr_fields(right, out);
        }
        Predicate::And(a, b) | Predicate::Or(a, b) => {
            collect_predicate_fields(a, out);
            collect_predicate_fields(b, out);
        }
        Predicate::Not(inner) => collect_predicate_fields(inner, out),
    }
}

fn collect_expr_fields(expr: &Expr, out: &mut Vec<Field>) {
    match expr {
        Expr::Constant(_) => {}
        Expr::Field(f) => {
            if !out.contains(f) {
                out.push(*f);
            }
        }
        Expr::Neg(inner) => collect_expr_fields(inner, out),
        Expr::Binary { left, right, .. } => {
            collect_expr_fields(left, out);
            collect_expr_fields(right, out);
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(v) => write!(f, "{}", v),
            Expr::Field(field) => write!(f, "{}", field),
            Expr::Neg(inner) => write!(f, "-({})", inner),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Predicate::And(a, b) => write!(f, "({} and {})", a, b),
            Predicate::Or(a, b) => write!(f, "({} or {})", a, b),
            Predicate::Not(inner) => write!(f, "not ({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(op: CmpOp, left: Expr, right: Expr) -> Predicate {
        Predicate::Compare { op, left, right }
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("sma"), None);
        assert_eq!(Field::from_name("Close"), None);
    }

    #[test]
    fn display_comparison() {
        let p = cmp(CmpOp::Ge, Expr::Field(Field::Rsi), Expr::Constant(70.0));
        assert_eq!(p.to_string(), "rsi >= 70");
    }

    #[test]
    fn display_nested() {
        let p = Predicate::Not(Box::new(Predicate::And(
            Box::new(cmp(
                CmpOp::Gt,
                Expr::Field(Field::ShortMa),
                Expr::Field(Field::LongMa),
            )),
            Box::new(cmp(
                CmpOp::Lt,
                Expr::Field(Field::Close),
                Expr::Binary {
                    op: ArithOp::Mul,
                    left: Box::new(Expr::Field(Field::BbUpper)),
                    right: Box::new(Expr::Constant(1.01)),
                },
            )),
        )));
        assert_eq!(
            p.to_string(),
            "not ((short_ma > long_ma and close < (bb_upper * 1.01)))"
        );
    }

    #[test]
    fn fields_deduplicated_in_order() {
        let p = Predicate::Or(
            Box::new(cmp(
                CmpOp::Gt,
                Expr::Field(Field::Close),
                Expr::Field(Field::BbUpper),
            )),
            Box::new(cmp(CmpOp::Lt, Expr::Field(Field::Close), Expr::Constant(1.0))),
        );
        assert_eq!(p.fields(), vec![Field::Close, Field::BbUpper]);
    }
}
