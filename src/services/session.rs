use crate::models::PredictionResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Proof that a computation cycle was started; only the latest one may publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket(u64);

/// The single "last prediction" slot of one dashboard session
///
/// Each submit starts a new cycle that clears the slot. A result is only
/// stored if its cycle is still the latest, so a slow computation can never
/// overwrite the outcome of a newer one.
#[derive(Debug, Default)]
pub struct DashboardSession {
    last: Option<PredictionResult>,
    generation: u64,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_cycle(&mut self) -> CycleTicket {
        self.generation += 1;
        self.last = None;
        CycleTicket(self.generation)
    }

    /// Publish a result; returns false when the ticket is stale
    pub fn complete(&mut self, ticket: CycleTicket, result: PredictionResult) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!("Dropping stale prediction from cycle {} (current {})", ticket.0, self.generation);
            return false;
        }
        self.last = Some(result);
        true
    }

    /// Record a failed cycle; the slot stays empty
    pub fn fail(&mut self, ticket: CycleTicket) {
        if ticket.0 == self.generation {
            self.last = None;
        }
    }

    pub fn last(&self) -> Option<&PredictionResult> {
        self.last.as_ref()
    }
}

pub type SharedSession = Arc<Mutex<DashboardSession>>;

/// In-memory sessions keyed by id; idle sessions expire and nothing is persisted
#[derive(Clone)]
pub struct SessionStore {
    sessions: moka::future::Cache<Uuid, SharedSession>,
}

impl SessionStore {
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_idle(idle_timeout)
            .build();
        Self { sessions }
    }

    /// Look up a session, creating it when the id is absent or unknown
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedSession) {
        let id = id.unwrap_or_else(Uuid::new_v4);
        let session = self
            .sessions
            .get_with(id, async { Arc::new(Mutex::new(DashboardSession::new())) })
            .await;
        (id, session)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::Schema;
    use crate::core::features::{build, Selections};

    fn result(amount_usd: f64) -> PredictionResult {
        let features = build(
            &Selections::new()
                .with(Schema::ExperienceLevel, "Mid-Level")
                .with(Schema::EmploymentType, "Full-Time")
                .with(Schema::JobTitle, "Data Engineer")
                .with(Schema::CompanyLocation, "DE")
                .with(Schema::CompanySize, "Large"),
        )
        .unwrap();
        PredictionResult {
            amount_usd,
            features,
            predicted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_cycle_replaces_result() {
        let mut session = DashboardSession::new();
        let first = session.begin_cycle();
        assert!(session.complete(first, result(1.0)));
        assert_eq!(session.last().map(|r| r.amount_usd), Some(1.0));

        let second = session.begin_cycle();
        assert!(session.last().is_none(), "new cycle clears the slot");
        assert!(session.complete(second, result(2.0)));
        assert_eq!(session.last().map(|r| r.amount_usd), Some(2.0));
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut session = DashboardSession::new();
        let slow = session.begin_cycle();
        let fast = session.begin_cycle();

        assert!(session.complete(fast, result(2.0)));
        assert!(!session.complete(slow, result(1.0)));
        assert_eq!(session.last().map(|r| r.amount_usd), Some(2.0));
    }

    #[test]
    fn test_failure_clears_previous_result() {
        let mut session = DashboardSession::new();
        let ok = session.begin_cycle();
        session.complete(ok, result(1.0));

        let failing = session.begin_cycle();
        session.fail(failing);
        assert!(session.last().is_none());
    }

    #[test]
    fn test_store_reuses_sessions() {
        tokio_test::block_on(async {
            let store = SessionStore::new(100, Duration::from_secs(60));
            let (id, created) = store.get_or_create(None).await;
            let (same_id, again) = store.get_or_create(Some(id)).await;

            assert_eq!(id, same_id);
            assert!(Arc::ptr_eq(&created, &again));
            assert!(store.get(&Uuid::new_v4()).await.is_none());
        });
    }
}
