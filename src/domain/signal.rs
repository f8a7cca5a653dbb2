//! Signal evaluation.
//!
//! Turns augmented bars into per-bar trade signals using the compiled buy and
//! sell predicates. When both predicates fire on the same bar the sell signal
//! wins.

use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::error::SignalTraderError;
use crate::domain::indicator::AugmentedBar;
use crate::domain::rule::Predicate;
use crate::domain::rule_eval::fires;
use crate::domain::rule_parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }

    pub fn from_flags(buy: bool, sell: bool) -> Self {
        if sell {
            Signal::Sell
        } else if buy {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignaledBar {
    pub bar: AugmentedBar,
    pub signal: Signal,
}

/// Buy and sell predicates parsed once, before any bar is seen.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledLogic {
    pub buy: Predicate,
    pub sell: Predicate,
}

impl CompiledLogic {
    pub fn compile(buy_condition: &str, sell_condition: &str) -> Result<Self, SignalTraderError> {
        let buy = compile_one("buy", buy_condition)?;
        let sell = compile_one("sell", sell_condition)?;
        Ok(Self { buy, sell })
    }

    pub fn signal_for(&self, bar: &AugmentedBar) -> Signal {
        Signal::from_flags(fires(&self.buy, bar), fires(&self.sell, bar))
    }
}

fn compile_one(name: &str, input: &str) -> Result<Predicate, SignalTraderError> {
    rule_parser::parse(input).map_err(|source| SignalTraderError::RuleParse {
        name: name.to_string(),
        input: input.to_string(),
        source,
    })
}

/// Evaluate both predicates on every bar, grouped by ticker.
///
/// Output is ticker-ordered, and time-ordered within a ticker.
pub fn evaluate_signals(bars: Vec<AugmentedBar>, logic: &CompiledLogic) -> Vec<SignaledBar> {
    let mut groups: BTreeMap<String, Vec<AugmentedBar>> = BTreeMap::new();
    for bar in bars {
        groups.entry(bar.bar.ticker.clone()).or_default().push(bar);
    }

    let mut out = Vec::new();
    for (_, mut series) in groups {
        series.sort_by_key(|b| b.bar.timestamp);
        out.extend(series.into_iter().map(|bar| {
            let signal = logic.signal_for(&bar);
            if signal != Signal::Hold {
                trace!(
                    ticker = %bar.bar.ticker,
                    at = %bar.bar.timestamp,
                    signal = signal.as_i8(),
                    "signal"
                );
            }
            SignaledBar { bar, signal }
        }));
    }
    out
}
