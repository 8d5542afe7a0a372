use chrono::NaiveDate;

use crate::error::AppError;
use crate::model::bar::{BarInterval, BarSeries};

/// Supplier of OHLCV bars.
///
/// `end` is exclusive. Every failure, including an empty result, comes back as
/// [`AppError::DataUnavailable`].
pub trait BarSource {
    fn name(&self) -> &str;

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: BarInterval,
    ) -> Result<BarSeries, AppError>;
}

pub(crate) fn check_range(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::data_unavailable(
            symbol,
            format!("start {} must precede end {}", start, end),
        ));
    }
    Ok(())
}
