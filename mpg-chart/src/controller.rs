//! Filter → fetch → project → publish sequencing
//!
//! The controller owns the filter selection, the last fetched record set and
//! the published chart view. Filter changes are classified by comparing the
//! old and new selection:
//!
//! - positions, ranking criterion or limit changed: the backend would select
//!   different records, so a new fetch is issued
//! - only an axis changed: the current records are re-projected locally
//! - nothing changed: no work
//!
//! Record-relevant changes are judged against the query whose records are
//! held (or awaited), not against the previous selection alone. After a
//! failed fetch the selection keeps the user's choice while the records stay
//! those of the last successful query, so choosing the failed selection again
//! or moving an axis retries the fetch.
//!
//! Fetches are tagged with a monotonically increasing sequence number. Only
//! the completion carrying the most recently issued number is applied; older
//! completions are dropped without touching state. There is no network
//! cancellation, only result suppression.
//!
//! Every failure leaves the selection and the published view as they were.

use crate::display::{ChartDisplay, ChartView};
use crate::events::{ChartEvent, ChartEventBus, PublishCause};
use crate::fetcher::{DataFetcher, FetchError};
use crate::filter::{FilterState, InvalidFilterError};
use crate::projector::{Dataset, Projector};
use crate::query::{serialize, QueryParams};
use crate::record::Record;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One discrete action from the filter input boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetPositions(Vec<String>),
    SetRankingCriterion(String),
    SetAxisX(String),
    SetAxisY(String),
    SetLimit(i64),
}

impl FilterAction {
    /// Apply to `state`, producing the validated successor
    pub fn apply(self, state: FilterState) -> Result<FilterState, InvalidFilterError> {
        match self {
            FilterAction::SetPositions(codes) => state.set_positions(codes),
            FilterAction::SetRankingCriterion(field) => state.set_ranking_criterion(&field),
            FilterAction::SetAxisX(field) => state.set_axis_x(&field),
            FilterAction::SetAxisY(field) => state.set_axis_y(&field),
            FilterAction::SetLimit(n) => state.set_limit(n),
        }
    }
}

/// Work required by a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Record set invalidated
    Refetch,
    /// Same records, different attributes plotted
    Reproject,
    Unchanged,
}

impl ChangeKind {
    /// Refetch wins when both the record selection and the axes changed
    pub fn classify(old: &FilterState, new: &FilterState) -> Self {
        if old.selects_different_records(new) {
            ChangeKind::Refetch
        } else if old.plots_different_axes(new) {
            ChangeKind::Reproject
        } else {
            ChangeKind::Unchanged
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    /// Waiting on the completion of fetch `seq`
    Fetching { seq: u64 },
    Projecting,
}

/// An issued fetch that has not yet run
///
/// Holds no borrow on the controller, so several may be outstanding and
/// resolve in any order.
pub struct PendingFetch {
    seq: u64,
    query: QueryParams,
    fetcher: DataFetcher,
}

impl PendingFetch {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Perform the request; hand the completion to [`SyncController::complete`]
    pub async fn run(self) -> FetchCompletion {
        let result = self.fetcher.fetch(&self.query).await;
        FetchCompletion {
            seq: self.seq,
            result,
        }
    }
}

/// Outcome of a fetch, tagged with its sequence number
#[derive(Debug)]
pub struct FetchCompletion {
    pub seq: u64,
    pub result: Result<Vec<Record>, FetchError>,
}

/// Next step after a filter action was accepted
pub enum Step {
    /// Run the fetch, then complete it
    Fetch(PendingFetch),
    /// Handled synchronously
    Done(SyncOutcome),
}

/// What a controller step did
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A new view was published
    Published {
        cause: PublishCause,
        series: usize,
        skipped: usize,
    },
    /// Selection change required no work
    Unchanged,
    /// Completion superseded by a newer fetch; dropped
    Stale { seq: u64 },
    /// Fetch failed; previous view kept
    FetchFailed { seq: u64, error: FetchError },
    /// No record could be plotted; previous view kept
    EmptyResult { dropped: usize },
}

/// Owner of filter, records and published view
pub struct SyncController {
    fetcher: DataFetcher,
    projector: Projector,
    events: ChartEventBus,
    filters: FilterState,
    records: Arc<Vec<Record>>,
    /// Query that produced `records`
    fetched_query: Option<QueryParams>,
    /// Query of the latest issued fetch, until it completes
    requested_query: Option<QueryParams>,
    view: ChartView,
    state: ControllerState,
    issued_seq: u64,
}

impl SyncController {
    /// Controller with default filters and an empty view
    pub fn new(fetcher: DataFetcher, projector: Projector, events: ChartEventBus) -> Self {
        let filters = FilterState::new();
        let view = ChartView {
            dataset: Arc::new(Dataset::default()),
            display: ChartDisplay::for_axes(filters.axis_x(), filters.axis_y()),
        };

        Self {
            fetcher,
            projector,
            events,
            filters,
            records: Arc::new(Vec::new()),
            fetched_query: None,
            requested_query: None,
            view,
            state: ControllerState::Idle,
            issued_seq: 0,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Last successfully fetched records
    pub fn records(&self) -> Arc<Vec<Record>> {
        Arc::clone(&self.records)
    }

    /// Currently published view
    pub fn view(&self) -> &ChartView {
        &self.view
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.view.dataset)
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Sequence number of the most recently issued fetch (0 before any)
    pub fn latest_seq(&self) -> u64 {
        self.issued_seq
    }

    pub fn events(&self) -> &ChartEventBus {
        &self.events
    }

    /// Validate and classify `action`
    ///
    /// A rejected action leaves the selection unchanged and is reported on
    /// the event bus as well as returned.
    pub fn begin(&mut self, action: FilterAction) -> Result<Step, InvalidFilterError> {
        let next = match action.apply(self.filters.clone()) {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "Filter update rejected");
                self.events.emit_lossy(ChartEvent::FilterRejected {
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        let query = serialize(&next);
        let kind = self.change_kind(&next, &query);
        self.filters = next;
        debug!(?kind, "Filter updated");

        Ok(match kind {
            ChangeKind::Refetch => Step::Fetch(self.issue_fetch(query)),
            ChangeKind::Reproject => Step::Done(self.reproject()),
            ChangeKind::Unchanged => Step::Done(SyncOutcome::Unchanged),
        })
    }

    /// Issue a fetch for the current selection (initial load, manual retry)
    pub fn refresh(&mut self) -> PendingFetch {
        let query = serialize(&self.filters);
        self.issue_fetch(query)
    }

    /// Apply a fetch completion if it is the latest issued
    pub fn complete(&mut self, completion: FetchCompletion) -> SyncOutcome {
        let FetchCompletion { seq, result } = completion;

        if seq != self.issued_seq {
            debug!(seq, latest = self.issued_seq, "Discarding stale fetch result");
            return SyncOutcome::Stale { seq };
        }

        self.state = ControllerState::Idle;
        let query = self.requested_query.take();

        match result {
            Ok(records) => {
                self.records = Arc::new(records);
                self.fetched_query = query;
                self.publish(PublishCause::Fetched { seq })
            }
            Err(error) => {
                warn!(seq, error = %error, "Keeping previous dataset after fetch failure");
                self.events.emit_lossy(ChartEvent::FetchFailed {
                    seq,
                    error: error.to_string(),
                    timestamp: Utc::now(),
                });
                SyncOutcome::FetchFailed { seq, error }
            }
        }
    }

    /// Apply `action` and, if needed, run its fetch to completion
    pub async fn dispatch(&mut self, action: FilterAction) -> Result<SyncOutcome, InvalidFilterError> {
        match self.begin(action)? {
            Step::Fetch(pending) => {
                let completion = pending.run().await;
                Ok(self.complete(completion))
            }
            Step::Done(outcome) => Ok(outcome),
        }
    }

    /// Fetch and publish the current selection
    pub async fn load(&mut self) -> SyncOutcome {
        let completion = self.refresh().run().await;
        self.complete(completion)
    }

    /// Refetch whenever `query` differs from the one held or awaited
    fn change_kind(&self, next: &FilterState, query: &QueryParams) -> ChangeKind {
        let kind = ChangeKind::classify(&self.filters, next);
        match self.requested_query.as_ref().or(self.fetched_query.as_ref()) {
            Some(current) if current != query => ChangeKind::Refetch,
            _ => kind,
        }
    }

    fn issue_fetch(&mut self, query: QueryParams) -> PendingFetch {
        self.issued_seq += 1;
        let seq = self.issued_seq;

        debug!(seq, query = %query, "Issuing fetch");
        self.state = ControllerState::Fetching { seq };
        self.events.emit_lossy(ChartEvent::FetchStarted {
            seq,
            query: query.to_query_string(),
            timestamp: Utc::now(),
        });

        self.requested_query = Some(query.clone());

        PendingFetch {
            seq,
            query,
            fetcher: self.fetcher.clone(),
        }
    }

    fn reproject(&mut self) -> SyncOutcome {
        // An outstanding fetch stays outstanding across a local projection
        let resume = self.state;
        self.state = ControllerState::Projecting;
        let outcome = self.publish(PublishCause::Reprojected);
        self.state = resume;
        outcome
    }

    fn publish(&mut self, cause: PublishCause) -> SyncOutcome {
        let axis_x = self.filters.axis_x();
        let axis_y = self.filters.axis_y();
        let projection = self.projector.project(&self.records, axis_x, axis_y);

        if projection.all_dropped() {
            let dropped = projection.skipped.len();
            warn!(dropped, %axis_x, %axis_y, "No record has both plotted fields");
            self.events.emit_lossy(ChartEvent::EmptyResult {
                dropped,
                timestamp: Utc::now(),
            });
            return SyncOutcome::EmptyResult { dropped };
        }

        let series = projection.dataset.len();
        let skipped = projection.skipped.len();

        self.view = ChartView {
            dataset: Arc::new(projection.dataset),
            display: ChartDisplay::for_axes(axis_x, axis_y),
        };

        info!(series, skipped, ?cause, "Dataset published");
        self.events.emit_lossy(ChartEvent::DatasetPublished {
            view: self.view.clone(),
            cause,
            skipped,
            timestamp: Utc::now(),
        });

        SyncOutcome::Published {
            cause,
            series,
            skipped,
        }
    }
}
