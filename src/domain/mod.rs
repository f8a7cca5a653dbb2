//! Core domain types and logic.

pub mod bar;
pub mod numeric;
pub mod indicator;
pub mod rule;
pub mod rule_parser;
pub mod rule_eval;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod simulator;
pub mod strategy;
pub mod config_validation;
pub mod metrics;
pub mod backtest;
pub mod error;
