/// Exponential Moving Average seeded with the first observed value.
///
/// Uses the recursive form `ema = prev + alpha * (value - prev)` with
/// `alpha = 2 / (span + 1)` and no bias correction, so every pushed value
/// yields an output.
#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    alpha: f64,
    ema: Option<f64>,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "EMA span must be > 0");
        Self {
            span,
            alpha: 2.0 / (span as f64 + 1.0),
            ema: None,
        }
    }

    /// Push a new value, return the updated EMA.
    pub fn push(&mut self, value: f64) -> f64 {
        let next = match self.ema {
            Some(prev) => prev + self.alpha * (value - prev),
            None => value,
        };
        self.ema = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.ema
    }

    pub fn span(&self) -> usize {
        self.span
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// EMA of every prefix of `values`.
pub fn ema_series<I>(values: I, span: usize) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut ema = Ema::new(span);
    values.into_iter().map(|v| ema.push(v)).collect()
}
