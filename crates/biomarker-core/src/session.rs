//! Trend request session.
//!
//! Selecting a biomarker starts an asynchronous fetch; by the time it
//! resolves the user may have selected something else. Each request gets a
//! ticket from a generation counter, and a response is only turned into a
//! series while its ticket is still the newest one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::interpret::Interpreter;
use crate::models::{RawTrendPoint, TrendQuery, TrendSeries};

/// A trend fetch in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendRequest {
    pub ticket: u64,
    pub query: TrendQuery,
    /// Earliest sample date the fetcher should return
    pub since: DateTime<Utc>,
}

/// Result of completing a request.
#[derive(Debug, Clone, PartialEq)]
pub enum TrendOutcome {
    Ready(TrendSeries),
    /// A newer request (or a cancel) arrived while this one was in flight.
    Superseded,
}

impl TrendOutcome {
    pub fn into_series(self) -> Option<TrendSeries> {
        match self {
            TrendOutcome::Ready(series) => Some(series),
            TrendOutcome::Superseded => None,
        }
    }
}

/// Tracks the current biomarker selection and discards stale responses.
#[derive(Debug, Default)]
pub struct TrendSession {
    interpreter: Interpreter,
    generation: AtomicU64,
    selected: Mutex<Option<String>>,
}

impl TrendSession {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            generation: AtomicU64::new(0),
            selected: Mutex::new(None),
        }
    }

    /// Start a request for `biomarker`, superseding any earlier one.
    pub fn begin(&self, biomarker: &str, months: Option<u32>) -> TrendRequest {
        self.begin_at(biomarker, months, Utc::now())
    }

    /// Like [`Self::begin`], with the query window ending at `now`.
    pub fn begin_at(&self, biomarker: &str, months: Option<u32>, now: DateTime<Utc>) -> TrendRequest {
        let query = self.interpreter.trend_query(biomarker, months);
        let since = query.window_start(now);

        // Ticket and selection move together under the selection lock
        let ticket = self.with_selected(|selected| {
            *selected = Some(biomarker.to_string());
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        });

        TrendRequest {
            ticket,
            query,
            since,
        }
    }

    /// Check if `request` is still the newest one.
    pub fn is_current(&self, request: &TrendRequest) -> bool {
        self.generation.load(Ordering::SeqCst) == request.ticket
    }

    /// Drop the selection; every outstanding request becomes stale.
    pub fn cancel(&self) {
        self.with_selected(|selected| {
            *selected = None;
            self.generation.fetch_add(1, Ordering::SeqCst);
        });
    }

    /// Biomarker of the newest request, if any.
    pub fn selected(&self) -> Option<String> {
        self.with_selected(|selected| selected.clone())
    }

    /// Biomarker and ticket of the newest request, read together.
    pub fn current(&self) -> (Option<String>, u64) {
        self.with_selected(|selected| {
            (selected.clone(), self.generation.load(Ordering::SeqCst))
        })
    }

    /// Build the series for a fetched response if the request is still current.
    pub fn complete(&self, request: &TrendRequest, raw_points: &[RawTrendPoint]) -> TrendOutcome {
        if !self.is_current(request) {
            debug!(
                ticket = request.ticket,
                biomarker = %request.query.biomarker,
                "discarding superseded trend response"
            );
            return TrendOutcome::Superseded;
        }
        TrendOutcome::Ready(self.interpreter.build_trend(raw_points))
    }

    /// Await the collaborator's fetch, then continue with [`Self::complete`].
    ///
    /// Fetch errors are returned untouched; retries and timeouts belong to
    /// the fetcher.
    pub async fn run<Fut, E>(&self, request: TrendRequest, fetch: Fut) -> Result<TrendOutcome, E>
    where
        Fut: Future<Output = Result<Vec<RawTrendPoint>, E>>,
    {
        let raw_points = fetch.await?;
        Ok(self.complete(&request, &raw_points))
    }

    fn with_selected<R>(&self, f: impl FnOnce(&mut Option<String>) -> R) -> R {
        let mut guard = match self.selected.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::executor::block_on;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn raw_points() -> Vec<RawTrendPoint> {
        vec![
            RawTrendPoint::new(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), 150.0)
                .with_reference_range("<100"),
            RawTrendPoint::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 160.0)
                .with_reference_range("<100"),
        ]
    }

    #[test]
    fn test_current_request_completes() {
        let session = TrendSession::default();
        let request = session.begin("LDL", None);

        assert_eq!(request.query.months, 12);
        assert_eq!(session.selected(), Some("LDL".to_string()));

        let series = session.complete(&request, &raw_points()).into_series().unwrap();
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].value, 160.0);
    }

    #[test]
    fn test_newer_request_supersedes() {
        let session = TrendSession::default();
        let first = session.begin("LDL", Some(6));
        let second = session.begin("HDL", Some(6));

        assert!(!session.is_current(&first));
        assert!(session.is_current(&second));
        assert_eq!(session.complete(&first, &raw_points()), TrendOutcome::Superseded);
        assert!(matches!(session.complete(&second, &[]), TrendOutcome::Ready(_)));
        assert_eq!(session.selected(), Some("HDL".to_string()));
    }

    #[test]
    fn test_cancel_invalidates() {
        let session = TrendSession::default();
        let request = session.begin("LDL", None);

        session.cancel();

        assert!(!session.is_current(&request));
        assert_eq!(session.selected(), None);
        assert_eq!(session.complete(&request, &raw_points()), TrendOutcome::Superseded);
    }

    #[test]
    fn test_run_continues_after_fetch() {
        let session = TrendSession::default();
        let request = session.begin("LDL", None);

        let fetch = async { Ok::<_, String>(raw_points()) };
        let outcome = block_on(session.run(request, fetch)).unwrap();

        let series = outcome.into_series().unwrap();
        assert_eq!(series.points.len(), 2);
        assert!(series.normal_range.is_some());
    }

    #[test]
    fn test_run_superseded_mid_fetch() {
        let session = TrendSession::default();
        let request = session.begin("LDL", None);

        let fetch = async {
            // User picks another biomarker before the response lands
            session.begin("HDL", None);
            Ok::<_, String>(raw_points())
        };
        let outcome = block_on(session.run(request, fetch)).unwrap();

        assert_eq!(outcome, TrendOutcome::Superseded);
    }

    #[test]
    fn test_run_propagates_fetch_error() {
        let session = TrendSession::default();
        let request = session.begin("LDL", None);

        let fetch = async { Err::<Vec<RawTrendPoint>, _>("network down".to_string()) };
        let result = block_on(session.run(request, fetch));

        assert_eq!(result, Err("network down".to_string()));
    }

    #[test]
    fn test_request_carries_window_start() {
        let session = TrendSession::default();
        let now = Utc.with_ymd_and_hms(2024, 12, 15, 8, 0, 0).unwrap();

        let request = session.begin_at("LDL", Some(6), now);

        assert_eq!(request.since, Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_concurrent_begin_keeps_selection_in_step() {
        let mut mismatches = 0;

        for _ in 0..2_000 {
            let session = Arc::new(TrendSession::default());
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = ["LDL", "HDL"]
                .into_iter()
                .map(|name| {
                    let session = Arc::clone(&session);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        session.begin(name, None)
                    })
                })
                .collect();

            let requests: Vec<TrendRequest> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            let newest = requests.iter().find(|r| session.is_current(r)).unwrap();
            if session.selected().as_deref() != Some(newest.query.biomarker.as_str()) {
                mismatches += 1;
            }
        }

        assert_eq!(mismatches, 0);
    }

    #[test]
    fn test_current_reads_selection_and_ticket() {
        let session = TrendSession::default();
        assert_eq!(session.current(), (None, 0));

        let request = session.begin("LDL", None);
        assert_eq!(session.current(), (Some("LDL".to_string()), request.ticket));

        session.cancel();
        assert_eq!(session.current(), (None, request.ticket + 1));
    }
}
