use crate::error::AppError;
use crate::model::bar::BarSeries;

/// Sample standard deviation of close-to-close percentage changes.
///
/// Needs two bars for a single return. With exactly one return the sample
/// statistic has no degrees of freedom left and the result is NaN.
pub fn estimate(series: &BarSeries) -> Result<f64, AppError> {
    if series.len() < 2 {
        return Err(AppError::InsufficientData {
            required: 2,
            actual: series.len(),
        });
    }

    let closes: Vec<f64> = series.closes().collect();
    let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

    Ok(sample_std(&returns))
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}
