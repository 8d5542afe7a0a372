use chrono::{DateTime, Utc};

use crate::indicator::ema::Ema;
use crate::model::bar::{Bar, BarInterval, BarSeries};
use crate::model::signal::{CandleDirection, CrossoverState, Signal, SignalEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub bar: Bar,
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub crossover: CrossoverState,
    pub prev_crossover: Option<CrossoverState>,
    pub candle: CandleDirection,
    pub prev_candle: Option<CandleDirection>,
    pub signal: Signal,
}

/// Per-bar annotations computed from one [`BarSeries`].
///
/// Built once by [`compute`] and never modified afterwards.
#[derive(Debug, Clone)]
pub struct DerivedSeries {
    symbol: String,
    interval: BarInterval,
    fast_span: usize,
    slow_span: usize,
    rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> BarInterval {
        self.interval
    }

    pub fn fast_span(&self) -> usize {
        self.fast_span
    }

    pub fn slow_span(&self) -> usize {
        self.slow_span
    }

    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn signals(&self) -> impl Iterator<Item = Signal> + '_ {
        self.rows.iter().map(|r| r.signal)
    }

    /// Every row whose signal is not `Hold`, in bar order.
    pub fn events(&self) -> impl Iterator<Item = SignalEvent> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.signal.is_actionable())
            .map(|(index, r)| SignalEvent {
                index,
                timestamp: r.bar.timestamp,
                signal: r.signal,
            })
    }

    /// The last `n` events tagged `wanted`, oldest first.
    pub fn last_events(&self, wanted: Signal, n: usize) -> Vec<SignalEvent> {
        let matching: Vec<SignalEvent> = self.events().filter(|e| e.signal == wanted).collect();
        let skip = matching.len().saturating_sub(n);
        matching.into_iter().skip(skip).collect()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.last().map(|r| r.bar.timestamp)
    }
}

fn classify(
    crossover: CrossoverState,
    prev_crossover: CrossoverState,
    prev_candle: CandleDirection,
) -> Signal {
    use CandleDirection::{Bearish, Bullish};
    use CrossoverState::{Above, NotAbove};

    match (crossover, prev_crossover, prev_candle) {
        (Above, NotAbove, Bearish) => Signal::Buy,
        (NotAbove, Above, Bullish) => Signal::Sell,
        _ => Signal::Hold,
    }
}

/// Annotate `series` with fast/slow EMAs, crossover state, candle direction and
/// the gated crossover signal.
///
/// Fewer than two bars yields an empty result.
///
/// # Panics
///
/// Panics if either span is zero and the series has at least two bars.
/// Configuration validation rejects zero spans before they reach here.
pub fn compute(series: &BarSeries, fast_span: usize, slow_span: usize) -> DerivedSeries {
    let mut derived = DerivedSeries {
        symbol: series.symbol().to_string(),
        interval: series.interval(),
        fast_span,
        slow_span,
        rows: Vec::new(),
    };
    if series.len() < 2 {
        return derived;
    }

    let mut fast = Ema::new(fast_span);
    let mut slow = Ema::new(slow_span);
    let mut rows: Vec<DerivedRow> = Vec::with_capacity(series.len());

    for bar in series.bars() {
        let fast_ema = fast.push(bar.close);
        let slow_ema = slow.push(bar.close);
        let crossover = CrossoverState::from_emas(fast_ema, slow_ema);
        let candle = if bar.is_bullish() {
            CandleDirection::Bullish
        } else {
            CandleDirection::Bearish
        };

        let prev = rows.last();
        let prev_crossover = prev.map(|p| p.crossover);
        let prev_candle = prev.map(|p| p.candle);
        let signal = match (prev_crossover, prev_candle) {
            (Some(pc), Some(pd)) => classify(crossover, pc, pd),
            _ => Signal::Hold,
        };

        rows.push(DerivedRow {
            bar: bar.clone(),
            fast_ema,
            slow_ema,
            crossover,
            prev_crossover,
            candle,
            prev_candle,
            signal,
        });
    }

    derived.rows = rows;
    derived
}
