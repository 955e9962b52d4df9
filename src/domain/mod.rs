//! Core domain types and logic.

pub mod candle;
pub mod indicator;
pub mod analysis;
pub mod signal;
pub mod strategy;
pub mod backtest;
pub mod selector;
pub mod position;
pub mod notification;
pub mod shutdown;
pub mod trader;
pub mod settings;
pub mod error;
