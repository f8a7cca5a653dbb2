//! Shared cash pool and open positions.

use std::collections::BTreeMap;

use super::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub realized_pnl: f64,
    pub open_positions: BTreeMap<String, Position>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            realized_pnl: 0.0,
            open_positions: BTreeMap::new(),
        }
    }

    pub fn get_position(&self, ticker: &str) -> Option<&Position> {
        self.open_positions.get(ticker)
    }

    pub fn has_position(&self, ticker: &str) -> bool {
        self.open_positions.contains_key(ticker)
    }

    pub fn position_count(&self) -> usize {
        self.open_positions.len()
    }

    /// Move `allocated_cash` out of the pool into a new position.
    pub fn add_position(&mut self, position: Position) {
        self.cash -= position.allocated_cash;
        self.open_positions.insert(position.ticker.clone(), position);
    }

    /// Remove a position and return its allocation plus `pnl` to the pool.
    pub fn settle_position(&mut self, ticker: &str, pnl: f64) -> Option<Position> {
        let position = self.open_positions.remove(ticker)?;
        self.cash += position.allocated_cash + pnl;
        self.realized_pnl += pnl;
        Some(position)
    }

    pub fn allocated(&self) -> f64 {
        self.open_positions.values().map(|p| p.allocated_cash).sum()
    }

    /// `cash + allocated == initial_capital + realized_pnl`, within `tolerance`.
    pub fn is_conserved(&self, tolerance: f64) -> bool {
        let lhs = self.cash + self.allocated();
        let rhs = self.initial_capital + self.realized_pnl;
        (lhs - rhs).abs() <= tolerance
    }
}
