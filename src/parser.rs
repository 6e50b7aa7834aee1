//! Sheet-export parser
//!
//! Turns the published CSV export into a [`ReportModel`]. The export is a
//! human-maintained spreadsheet: unit sections are delimited only by a
//! repeating "Teller" header row and an optional "Total" row, and rows may be
//! ragged or partially blank. Classification and parsing are therefore
//! tolerant throughout: malformed rows degrade to skips, never errors.

use csv::ReaderBuilder;
use tracing::{debug, instrument, warn};

use crate::model::{ReportModel, Teller, Unit};

/// Classification of one raw row of the export.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind<'a> {
    /// First cell empty or missing; the row is ignored entirely.
    Empty,
    /// Second cell is "Teller" (case-insensitive): opens a new unit section
    /// and declares the date column labels for the whole model.
    UnitHeader {
        name: &'a str,
        dates: Vec<&'a str>,
    },
    /// First cell is "Total" (case-insensitive). Informational only; totals
    /// are always recomputed rather than trusted from the sheet.
    TotalMarker,
    /// Anything else: a teller row, meaningful only inside an open section.
    DataRow {
        name: &'a str,
        /// Cells from index 2 onward; unparsable or missing values become 0.
        values: Vec<f64>,
    },
}

/// Classify a single row of cells.
///
/// Order matters: the "Teller" header check wins over the "Total" marker
/// check, so a unit named "Total" still opens a section correctly.
pub fn classify(row: &[String]) -> RowKind<'_> {
    let first = match row.first() {
        Some(cell) if !cell.is_empty() => cell.as_str(),
        _ => return RowKind::Empty,
    };

    if row.get(1).is_some_and(|c| c.eq_ignore_ascii_case("teller")) {
        let dates = row[2..]
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.as_str())
            .collect();
        return RowKind::UnitHeader { name: first, dates };
    }

    if first.eq_ignore_ascii_case("total") {
        return RowKind::TotalMarker;
    }

    let values = row
        .get(2..)
        .unwrap_or(&[])
        .iter()
        .map(|c| c.trim().parse::<f64>().unwrap_or(0.0))
        .collect();
    RowKind::DataRow {
        name: first,
        values,
    }
}

/// Build a [`ReportModel`] from pre-tokenized rows.
///
/// Every UnitHeader overwrites the global date labels; earlier units keep
/// `daily_totals` sized to the labels in force when their section opened.
/// (Sheets with inconsistent headers can therefore misalign earlier units
/// against the final labels; this matches the deployed behavior.)
///
/// Teller rows whose values are all zero or blank are placeholder lines in
/// the sheet and are dropped. Values beyond the declared date count are kept
/// on the teller but excluded from the unit's `daily_totals`.
#[instrument(skip(rows), fields(row_count = rows.len()))]
pub fn parse_rows(rows: &[Vec<String>]) -> ReportModel {
    let mut units: Vec<Unit> = Vec::new();
    let mut current: Option<Unit> = None;
    let mut dates: Vec<String> = Vec::new();
    let mut skipped_blank = 0;

    for row in rows {
        match classify(row) {
            RowKind::Empty | RowKind::TotalMarker => {}
            RowKind::UnitHeader {
                name,
                dates: labels,
            } => {
                if let Some(unit) = current.take() {
                    units.push(unit);
                }
                dates = labels.iter().map(|d| d.to_string()).collect();
                debug!("Opening unit section '{}' with {} dates", name, dates.len());
                current = Some(Unit {
                    name: name.to_string(),
                    tellers: Vec::new(),
                    total: 0.0,
                    daily_totals: vec![0.0; dates.len()],
                });
            }
            RowKind::DataRow { name, values } => {
                let Some(unit) = current.as_mut() else {
                    debug!("Ignoring data row '{}' outside any unit section", name);
                    continue;
                };
                if !values.iter().any(|v| *v > 0.0) {
                    skipped_blank += 1;
                    continue;
                }
                let total: f64 = values.iter().sum();
                unit.total += total;
                for (i, v) in values.iter().enumerate() {
                    if i < unit.daily_totals.len() {
                        unit.daily_totals[i] += v;
                    }
                }
                unit.tellers.push(Teller {
                    name: name.to_string(),
                    daily: values,
                    total,
                });
            }
        }
    }

    if let Some(unit) = current.take() {
        units.push(unit);
    }

    if skipped_blank > 0 {
        debug!("Dropped {} all-blank teller rows", skipped_blank);
    }

    let overall_total: f64 = units.iter().map(|u| u.total).sum();
    let total_tellers: usize = units.iter().map(|u| u.tellers.len()).sum();
    let avg_daily = if dates.is_empty() {
        0.0
    } else {
        overall_total / dates.len() as f64
    };

    debug!(
        "Parsed {} units, {} tellers, overall total {:.2}",
        units.len(),
        total_tellers,
        overall_total
    );

    ReportModel {
        units,
        dates,
        overall_total,
        total_tellers,
        avg_daily,
    }
}

/// Tokenize raw CSV text and build the model.
///
/// Quoting and escaping are the `csv` crate's concern; rows are read in
/// flexible mode since the export is ragged by nature.
pub fn parse_csv(text: &str) -> Result<ReportModel, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(rec) => rows.push(rec.iter().map(|c| c.to_string()).collect()),
            Err(e) => {
                warn!("Skipping unreadable CSV record: {}", e);
            }
        }
    }

    Ok(parse_rows(&rows))
}
