use chrono::{DateTime, Utc};
use serde::Serialize;

// Domain model built by the parser

/// One individual's per-date cash totals within a unit.
///
/// A teller only exists in the model if at least one of its daily values is
/// strictly positive; all-zero/blank rows are dropped during parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Teller {
    pub name: String,
    /// Daily values aligned positionally with the model's `dates`.
    pub daily: Vec<f64>,
    pub total: f64,
}

/// An organizational group of tellers, one section of the sheet export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub name: String,
    pub tellers: Vec<Teller>,
    pub total: f64,
    /// Per-date sums across this unit's tellers; same length as `dates`.
    pub daily_totals: Vec<f64>,
}

/// Normalized snapshot of one full sheet export.
///
/// Rebuilt from scratch on every successful fetch and swapped in atomically;
/// readers hold an `Arc` to it and never see partial state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    pub units: Vec<Unit>,
    /// Date column labels as they appear in the sheet, not parsed as dates.
    pub dates: Vec<String>,
    pub overall_total: f64,
    pub total_tellers: usize,
    pub avg_daily: f64,
}

// API response DTOs (to avoid circular dependency between services and api modules)

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub overall_total: f64,
    pub total_tellers: usize,
    pub avg_daily: f64,
    /// First and last date labels, e.g. "01/02 - 01/15". None when no dates.
    pub date_range: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitCard {
    pub name: String,
    pub total: f64,
    pub teller_count: usize,
    /// Top tellers by total, descending, capped at three for the card view.
    pub top_tellers: Vec<TellerTotal>,
    /// Tellers beyond the top three, shown as "+ N more" by the view.
    pub more_tellers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TellerTotal {
    pub name: String,
    pub total: f64,
}

/// One row of the flat teller table (teller + owning unit).
#[derive(Debug, Clone, Serialize)]
pub struct TellerRow {
    pub teller: String,
    pub unit: String,
    pub daily: Vec<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendResponse {
    pub dates: Vec<String>,
    /// Per-date sums across all units, aligned with `dates`.
    pub daily_totals: Vec<f64>,
}

/// Trailing 7-day vs 7-day comparison, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub prev_period: PeriodLabel,
    pub curr_period: PeriodLabel,
    pub total_prev: f64,
    pub total_curr: f64,
    /// Period-over-period growth percent; 0 when the previous total is 0.
    pub growth: f64,
    /// Per-unit rows sorted descending by current-window sum.
    pub units: Vec<UnitComparison>,
    /// Per-day sums across all units for each window slot. Always 7 slots;
    /// a short window fills its leading slots and leaves the rest at 0.
    pub prev_daily: [f64; 7],
    pub curr_daily: [f64; 7],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodLabel {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitComparison {
    pub name: String,
    pub prev: f64,
    pub curr: f64,
    pub change: f64,
    /// `change / prev * 100`, or 0 when `prev` is 0.
    pub percent: f64,
}
