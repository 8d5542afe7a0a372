use std::fmt;

use chrono::{DateTime, Utc};

/// Per-bar crossover outcome.
///
/// The raw encoding is inverted relative to the names: `Buy` is `-1` and
/// `Sell` is `+1`. Downstream consumers that compare against recorded runs
/// rely on that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn raw(&self) -> i8 {
        match self {
            Signal::Buy => -1,
            Signal::Sell => 1,
            Signal::Hold => 0,
        }
    }

    pub fn from_raw(value: i8) -> Self {
        match value {
            -1 => Signal::Buy,
            1 => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// `Above` when the slow EMA is strictly above the fast EMA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverState {
    Above,
    NotAbove,
}

impl CrossoverState {
    pub fn from_emas(fast: f64, slow: f64) -> Self {
        if slow > fast {
            CrossoverState::Above
        } else {
            CrossoverState::NotAbove
        }
    }

    pub fn raw(&self) -> i8 {
        match self {
            CrossoverState::Above => 1,
            CrossoverState::NotAbove => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleDirection {
    Bullish,
    Bearish,
}

impl CandleDirection {
    pub fn raw(&self) -> i8 {
        match self {
            CandleDirection::Bullish => 1,
            CandleDirection::Bearish => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub signal: Signal,
}
