use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::fetch_error::FetchError;
use crate::fetcher::SheetFetcher;
use crate::model::{ReportModel, SummaryResponse, TellerRow, TellerTotal, UnitCard};
use crate::parser::parse_csv;

/// How many tellers a unit card lists before collapsing to "+ N more".
const CARD_TOP_TELLERS: usize = 3;

/// Owns the latest report snapshot and drives the fetch/parse cycle.
///
/// The snapshot is an `Arc<ReportModel>` swapped atomically under a write
/// lock; readers clone the `Arc` and keep working against the version they
/// grabbed even while a refresh replaces it.
#[derive(Clone)]
pub struct ReportService {
    fetcher: Arc<SheetFetcher>,
    state: Arc<RwLock<SyncState>>,
}

#[derive(Default)]
struct SyncState {
    model: Option<Arc<ReportModel>>,
    last_synced_at: Option<DateTime<Utc>>,
}

impl ReportService {
    pub fn new(fetcher: SheetFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(RwLock::new(SyncState::default())),
        }
    }

    /// Run one full fetch → parse → swap cycle and return the new snapshot.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<ReportModel>, FetchError> {
        let csv_text = self.fetcher.fetch_csv().await?;
        let model = parse_csv(&csv_text)?;
        info!(
            "Refresh complete: {} units, {} tellers, {} dates, overall total {:.2}",
            model.units.len(),
            model.total_tellers,
            model.dates.len(),
            model.overall_total
        );
        Ok(self.replace_snapshot(model).await)
    }

    /// Atomically install a freshly parsed model as the current snapshot.
    pub async fn replace_snapshot(&self, model: ReportModel) -> Arc<ReportModel> {
        let snapshot = Arc::new(model);
        let mut state = self.state.write().await;
        state.model = Some(snapshot.clone());
        state.last_synced_at = Some(Utc::now());
        snapshot
    }

    /// The current snapshot, if any fetch has succeeded yet.
    pub async fn snapshot(&self) -> Option<Arc<ReportModel>> {
        self.state.read().await.model.clone()
    }

    pub async fn summary(&self) -> Option<SummaryResponse> {
        let state = self.state.read().await;
        let model = state.model.as_deref()?;
        Some(SummaryResponse {
            overall_total: model.overall_total,
            total_tellers: model.total_tellers,
            avg_daily: model.avg_daily,
            date_range: date_range(&model.dates),
            last_synced_at: state.last_synced_at,
        })
    }
}

fn date_range(dates: &[String]) -> Option<String> {
    let first = dates.first()?;
    let last = dates.last()?;
    Some(format!("{} - {}", first, last))
}

/// Unit cards for the overview: each unit's total plus its top tellers.
pub fn build_unit_cards(model: &ReportModel) -> Vec<UnitCard> {
    model
        .units
        .iter()
        .map(|unit| {
            let mut ranked: Vec<&crate::model::Teller> = unit.tellers.iter().collect();
            ranked.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));

            let top_tellers = ranked
                .iter()
                .take(CARD_TOP_TELLERS)
                .map(|t| TellerTotal {
                    name: t.name.clone(),
                    total: t.total,
                })
                .collect();

            UnitCard {
                name: unit.name.clone(),
                total: unit.total,
                teller_count: unit.tellers.len(),
                top_tellers,
                more_tellers: unit.tellers.len().saturating_sub(CARD_TOP_TELLERS),
            }
        })
        .collect()
}

/// Flat teller table rows, optionally filtered by a case-insensitive search
/// term matched against teller and unit names.
pub fn build_teller_rows(model: &ReportModel, search: &str) -> Vec<TellerRow> {
    let term = search.trim().to_lowercase();
    let mut rows = Vec::new();

    for unit in &model.units {
        for teller in &unit.tellers {
            if !term.is_empty()
                && !teller.name.to_lowercase().contains(&term)
                && !unit.name.to_lowercase().contains(&term)
            {
                continue;
            }
            rows.push(TellerRow {
                teller: teller.name.clone(),
                unit: unit.name.clone(),
                daily: teller.daily.clone(),
                total: teller.total,
            });
        }
    }

    rows
}
