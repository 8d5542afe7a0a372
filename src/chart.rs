use std::error::Error;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::error::AppError;
use crate::model::signal::SignalEvent;
use crate::sink::ChartSink;
use crate::strategy::ema_crossover::{DerivedRow, DerivedSeries};

const CHART_SIZE: (u32, u32) = (1280, 720);

/// Writes a standalone HTML page with an inline SVG chart.
///
/// Each render replaces the file at `path`.
#[derive(Debug, Clone)]
pub struct HtmlChartSink {
    path: PathBuf,
    title: String,
}

impl HtmlChartSink {
    pub fn new(path: impl Into<PathBuf>, title: &str) -> Self {
        Self {
            path: path.into(),
            title: title.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn price_bounds(rows: &[DerivedRow]) -> (f64, f64) {
    let min = rows
        .iter()
        .flat_map(|r| [r.bar.low, r.fast_ema, r.slow_ema])
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min);
    let max = rows
        .iter()
        .flat_map(|r| [r.bar.high, r.fast_ema, r.slow_ema])
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let range = max - min;
    let pad = if range < 0.01 { 1.0 } else { range * 0.05 };
    (min - pad, max + pad)
}

fn time_label(rows: &[DerivedRow], x: f64, intraday: bool) -> String {
    let idx = x.round();
    if idx < 0.0 {
        return String::new();
    }
    let fmt = if intraday { "%m-%d %H:%M" } else { "%Y-%m-%d" };
    rows.get(idx as usize)
        .map(|r| r.bar.timestamp.format(fmt).to_string())
        .unwrap_or_default()
}

fn render_svg(
    title: &str,
    derived: &DerivedSeries,
    buys: &[SignalEvent],
    sells: &[SignalEvent],
) -> Result<String, Box<dyn Error>> {
    let rows = derived.rows();
    let x_range = if rows.is_empty() {
        0.0..1.0
    } else {
        -0.5..rows.len() as f64 - 0.5
    };
    let (y_min, y_max) = price_bounds(rows);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_min..y_max)?;

        let intraday = derived.interval().is_intraday();
        let x_fmt = |x: &f64| time_label(rows, *x, intraday);
        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc("Price")
            .x_labels(10)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&|y: &f64| format!("{:.2}", y))
            .draw()?;

        chart
            .draw_series(rows.iter().enumerate().map(|(i, r)| {
                CandleStick::new(
                    i as f64,
                    r.bar.open,
                    r.bar.high,
                    r.bar.low,
                    r.bar.close,
                    GREEN.filled(),
                    RED.filled(),
                    4,
                )
            }))?
            .label("Candles")
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], GREEN.filled()));

        chart
            .draw_series(LineSeries::new(
                rows.iter().enumerate().map(|(i, r)| (i as f64, r.slow_ema)),
                GREEN.stroke_width(2),
            ))?
            .label(format!("{}EMA", derived.slow_span()))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.stroke_width(2)));

        chart
            .draw_series(LineSeries::new(
                rows.iter().enumerate().map(|(i, r)| (i as f64, r.fast_ema)),
                RED.stroke_width(2),
            ))?
            .label(format!("{}EMA", derived.fast_span()))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

        chart
            .draw_series(buys.iter().filter_map(|e| {
                rows.get(e.index)
                    .map(|r| Circle::new((e.index as f64, r.bar.low), 6, GREEN.filled()))
            }))?
            .label("Buy Signals")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, GREEN.filled()));

        chart
            .draw_series(sells.iter().filter_map(|e| {
                rows.get(e.index)
                    .map(|r| Circle::new((e.index as f64, r.bar.high), 6, RED.filled()))
            }))?
            .label("Sell Signals")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }
    Ok(svg)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn event_rows(derived: &DerivedSeries, events: &[SignalEvent]) -> String {
    let mut out = String::new();
    for e in events {
        let price = derived
            .rows()
            .get(e.index)
            .map(|r| r.bar.close)
            .unwrap_or(f64::NAN);
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
            e.signal,
            e.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            price
        );
    }
    out
}

pub(crate) fn render_html(
    title: &str,
    derived: &DerivedSeries,
    buys: &[SignalEvent],
    sells: &[SignalEvent],
) -> Result<String, AppError> {
    let svg = render_svg(title, derived, buys, sells)
        .map_err(|e| AppError::sink_failure("chart", format!("render failed: {}", e)))?;
    let title = escape_html(title);
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{svg}\n<table>\n<tr><th>Signal</th><th>Time</th><th>Close</th></tr>\n{buys}{sells}</table>\n</body>\n</html>\n",
        title = title,
        svg = svg,
        buys = event_rows(derived, buys),
        sells = event_rows(derived, sells),
    ))
}

impl ChartSink for HtmlChartSink {
    fn render(
        &self,
        derived: &DerivedSeries,
        buys: &[SignalEvent],
        sells: &[SignalEvent],
    ) -> Result<PathBuf, AppError> {
        let html = render_html(&self.title, derived, buys, sells)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::sink_failure("chart", format!("create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(&self.path, html).map_err(|e| {
            AppError::sink_failure("chart", format!("write {}: {}", self.path.display(), e))
        })?;
        Ok(self.path.clone())
    }
}
