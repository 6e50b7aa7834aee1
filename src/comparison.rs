//! Derived aggregates over a parsed [`ReportModel`]: the global daily trend
//! series and the trailing 7-day vs 7-day period comparison.

use std::cmp::Ordering;

use crate::model::{ComparisonReport, PeriodLabel, ReportModel, UnitComparison};

/// Number of date columns in each comparison window.
const WINDOW_DAYS: usize = 7;

/// Per-date sums across all units, aligned with `model.dates`.
pub fn daily_trend(model: &ReportModel) -> Vec<f64> {
    let mut aggregated = vec![0.0; model.dates.len()];
    for unit in &model.units {
        for (i, v) in unit.daily_totals.iter().enumerate() {
            if i < aggregated.len() {
                aggregated[i] += v;
            }
        }
    }
    aggregated
}

/// Trailing two-window comparison: previous 7 days vs current 7 days.
///
/// Windows are index ranges over `model.dates`: with N dates, the current
/// window is `[max(0, N-7), N)` and the previous one ends where the current
/// begins. With fewer than 14 dates the previous window simply has fewer
/// days; with fewer than 2 the comparison is unavailable and `None` is
/// returned.
pub fn compare_periods(model: &ReportModel) -> Option<ComparisonReport> {
    let n = model.dates.len();
    if n < 2 {
        return None;
    }

    let curr_start = n.saturating_sub(WINDOW_DAYS);
    let prev_start = curr_start.saturating_sub(WINDOW_DAYS);

    let mut total_prev = 0.0;
    let mut total_curr = 0.0;
    let mut units = Vec::with_capacity(model.units.len());
    let mut prev_daily = [0.0; WINDOW_DAYS];
    let mut curr_daily = [0.0; WINDOW_DAYS];

    for unit in &model.units {
        let prev = window_sum(&unit.daily_totals, prev_start, curr_start);
        let curr = window_sum(&unit.daily_totals, curr_start, n);

        total_prev += prev;
        total_curr += curr;

        add_window(&mut prev_daily, &unit.daily_totals, prev_start, curr_start);
        add_window(&mut curr_daily, &unit.daily_totals, curr_start, n);

        units.push(UnitComparison {
            name: unit.name.clone(),
            prev,
            curr,
            change: curr - prev,
            percent: percent_change(prev, curr),
        });
    }

    units.sort_by(|a, b| b.curr.partial_cmp(&a.curr).unwrap_or(Ordering::Equal));

    Some(ComparisonReport {
        prev_period: period_label(&model.dates, prev_start, curr_start),
        curr_period: period_label(&model.dates, curr_start, n),
        total_prev,
        total_curr,
        growth: percent_change(total_prev, total_curr),
        units,
        prev_daily,
        curr_daily,
    })
}

/// Zero-guarded percentage change: 0 whenever the previous sum is not
/// strictly positive, so no infinity or NaN ever reaches a consumer.
fn percent_change(prev: f64, curr: f64) -> f64 {
    if prev > 0.0 {
        (curr - prev) / prev * 100.0
    } else {
        0.0
    }
}

/// Sum of `values[start..end)`, clamped to the slice length. Units parsed
/// under an earlier, shorter header can have fewer slots than the model has
/// dates; out-of-range indices contribute nothing.
fn window_sum(values: &[f64], start: usize, end: usize) -> f64 {
    let len = values.len();
    values[start.min(len)..end.min(len)].iter().sum()
}

/// Add `values[start..end)` into the window slots, slot 0 = window start.
/// Short windows fill leading slots and leave the rest at 0.
fn add_window(slots: &mut [f64; WINDOW_DAYS], values: &[f64], start: usize, end: usize) {
    let len = values.len();
    for (i, v) in values[start.min(len)..end.min(len)].iter().enumerate() {
        if i < WINDOW_DAYS {
            slots[i] += v;
        }
    }
}

fn period_label(dates: &[String], start: usize, end: usize) -> PeriodLabel {
    let window = &dates[start.min(dates.len())..end.min(dates.len())];
    PeriodLabel {
        start: window.first().cloned().unwrap_or_default(),
        end: window.last().cloned().unwrap_or_default(),
    }
}
