use crate::query::compose_query;
use crate::render::{OutputRegion, RenderState};
use crate::tools::AnalysisBackend;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub ticket: u64,
    pub query: String,
    pub state: RenderState,
    /// False when a newer dispatch started before this one finished, in
    /// which case the final fragment was not written to the region.
    pub applied: bool,
}

/// Turns the two time fields into a query, sends it, and renders the answer.
///
/// Clones share the backend and the ticket sequence, so only the most
/// recently started dispatch across all clones may write its final fragment.
#[derive(Clone)]
pub struct QueryDispatcher {
    backend: Arc<dyn AnalysisBackend>,
    latest: Arc<Mutex<u64>>,
}

impl QueryDispatcher {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            latest: Arc::new(Mutex::new(0)),
        }
    }

    #[instrument(skip(self, region), fields(request_id = %Uuid::new_v4()))]
    pub async fn dispatch(
        &self,
        time_value: Option<&str>,
        time_unit: Option<&str>,
        region: &dyn OutputRegion,
    ) -> DispatchOutcome {
        let query = compose_query(time_value, time_unit);
        let ticket = self.begin(region);
        info!(ticket, %query, "Dispatching analysis query");

        let state = self.resolve(&query).await;
        let applied = self.finish(ticket, &state, region);
        if applied {
            info!(ticket, ?state, "Rendered analysis result");
        } else {
            debug!(ticket, "Dropped result of superseded dispatch");
        }

        DispatchOutcome {
            ticket,
            query,
            state,
            applied,
        }
    }

    /// Asks the backend and maps whatever happens to a final render state.
    pub async fn resolve(&self, query: &str) -> RenderState {
        match self.backend.analyze(query).await {
            Ok(result) => RenderState::from_result(&result),
            Err(e) => {
                warn!(kind = e.kind(), "Analysis failed: {}", e);
                RenderState::Errored
            }
        }
    }

    fn begin(&self, region: &dyn OutputRegion) -> u64 {
        let mut latest = self.latest.lock().unwrap_or_else(|p| p.into_inner());
        *latest += 1;
        region.write(&RenderState::Loading.fragment());
        *latest
    }

    fn finish(&self, ticket: u64, state: &RenderState, region: &dyn OutputRegion) -> bool {
        let latest = self.latest.lock().unwrap_or_else(|p| p.into_inner());
        if *latest != ticket {
            return false;
        }
        region.write(&state.fragment());
        true
    }
}
