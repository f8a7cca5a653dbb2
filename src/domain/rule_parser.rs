//! Predicate parser.
//!
//! Recursive descent parser for buy/sell conditions. Converts text to AST with
//! meaningful error messages including character offset, expected/found tokens.
//!
//! Grammar (keywords are case-insensitive):
//!
//! ```text
//! predicate  := and_expr (("or" | "|") and_expr)*
//! and_expr   := not_expr (("and" | "&") not_expr)*
//! not_expr   := ("not" | "~") not_expr | "(" predicate ")" | comparison
//! comparison := arith (">" | "<" | ">=" | "<=" | "==" | "!=") arith
//! arith      := term (("+" | "-") term)*
//! term       := factor (("*" | "/") factor)*
//! factor     := number | field | "-" factor | "(" arith ")"
//! ```
//!
//! Only the fields listed in [`Field`] are accepted; anything else is a parse
//! error, so no expression can reach beyond the bar it is evaluated against.

use crate::domain::error::ParseError;
use crate::domain::rule::{ArithOp, CmpOp, Expr, Field, Predicate};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            position: self.pos,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn peek_word(&self) -> &'a str {
        let rest = self.remaining();
        let end = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    }

    fn describe_next(&self) -> String {
        let word = self.peek_word();
        if !word.is_empty() {
            word.to_string()
        } else {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        }
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        if self.peek_word().eq_ignore_ascii_case(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    /// Consume a single-character operator unless it is the start of `unless`.
    fn consume_symbol(&mut self, symbol: char, unless: Option<&str>) -> bool {
        self.skip_whitespace();
        if let Some(longer) = unless {
            if self.remaining().starts_with(longer) {
                return false;
            }
        }
        if self.peek() == Some(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_and()?;
        while self.consume_keyword("or") || self.consume_symbol('|', None) {
            let right = self.parse_and()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_not()?;
        while self.consume_keyword("and") || self.consume_symbol('&', None) {
            let right = self.parse_not()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Predicate, ParseError> {
        if self.consume_keyword("not") || self.consume_symbol('~', None) {
            let inner = self.parse_not()?;
            return Ok(Predicate::Not(Box::new(inner)));
        }

        self.skip_whitespace();
        if self.peek() != Some('(') {
            return self.parse_comparison();
        }

        // A parenthesis may open either a grouped predicate or an arithmetic
        // sub-expression on the left of a comparison. When both readings
        // fail, the error that got further into the input is reported.
        let start = self.pos;
        self.advance();
        let group_err = match self.parse_or() {
            Ok(inner) => match self.expect_char(')') {
                Ok(()) if !self.at_comparison_continuation() => return Ok(inner),
                Ok(()) => None,
                Err(e) => Some(e),
            },
            Err(e) => Some(e),
        };

        self.pos = start;
        self.parse_comparison().map_err(|arith_err| match group_err {
            Some(group_err) if group_err.position >= arith_err.position => group_err,
            _ => arith_err,
        })
    }

    /// True when the next token continues an arithmetic/comparison expression,
    /// meaning a preceding parenthesised group was numeric, not boolean.
    fn at_comparison_continuation(&mut self) -> bool {
        self.skip_whitespace();
        matches!(
            self.peek(),
            Some('>' | '<' | '=' | '!' | '+' | '-' | '*' | '/')
        )
    }

    fn parse_comparison(&mut self) -> Result<Predicate, ParseError> {
        let left = self.parse_arith()?;
        self.skip_whitespace();
        let op = self.parse_cmp_op()?;
        let right = self.parse_arith()?;
        Ok(Predicate::Compare { op, left, right })
    }

    fn parse_cmp_op(&mut self) -> Result<CmpOp, ParseError> {
        let ops = [
            (">=", CmpOp::Ge),
            ("<=", CmpOp::Le),
            ("==", CmpOp::Eq),
            ("!=", CmpOp::Ne),
            (">", CmpOp::Gt),
            ("<", CmpOp::Lt),
        ];
        for (text, op) in ops {
            if self.remaining().starts_with(text) {
                self.pos += text.len();
                return Ok(op);
            }
        }
        if self.remaining().starts_with('=') {
            return Err(self.error("expected comparison operator, found '=' (use '==')".into()));
        }
        Err(self.error(format!(
            "expected comparison operator (>, <, >=, <=, ==, !=), found '{}'",
            self.describe_next()
        )))
    }

    fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = if self.consume_symbol('+', None) {
                ArithOp::Add
            } else if self.consume_symbol('-', None) {
                ArithOp::Sub
            } else {
                break;
            };
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = if self.consume_symbol('*', Some("**")) {
                ArithOp::Mul
            } else if self.consume_symbol('/', Some("//")) {
                ArithOp::Div
            } else {
                break;
            };
            let right = self.parse_factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('-') => {
                self.advance();
                let inner = self.parse_factor()?;
                Ok(match inner {
                    Expr::Constant(v) => Expr::Constant(-v),
                    other => Expr::Neg(Box::new(other)),
                })
            }
            Some('(') => {
                self.advance();
                let inner = self.parse_arith()?;
                self.expect_char(')')?;
                Ok(inner)
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.parse_number().map(Expr::Constant),
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.parse_field().map(Expr::Field),
            _ => Err(self.error(format!(
                "expected number or field, found '{}'",
                self.describe_next()
            ))),
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let word = self.peek_word();
        let field = Field::from_name(&word.to_ascii_lowercase()).ok_or_else(|| {
            let known: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
            self.error(format!(
                "unknown field '{}' (expected one of: {})",
                word,
                known.join(", ")
            ))
        })?;
        self.pos += word.len();
        self.skip_whitespace();
        if self.peek() == Some('(') || self.peek() == Some('.') || self.peek() == Some('[') {
            return Err(self.error(format!(
                "unexpected '{}' after field '{}'",
                self.describe_next(),
                word
            )));
        }
        Ok(field)
    }

    fn parse(&mut self) -> Result<Predicate, ParseError> {
        self.skip_whitespace();
        if self.remaining().is_empty() {
            return Err(self.error("empty condition".to_string()));
        }
        let predicate = self.parse_or()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!(
                "unexpected input after condition: '{}'",
                self.remaining()
            )));
        }
        Ok(predicate)
    }
}

pub fn parse(input: &str) -> Result<Predicate, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
