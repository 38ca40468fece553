//! The engagement ledger: race-safe toggling of engagement edges with
//! consistent derived counters.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{EngagementKind, EngagementState, ToggleOutcome};
use crate::error::Result;
use crate::store::{AcquireOutcome, EngagementRepository};

pub struct EngagementLedger {
    edges: Arc<dyn EngagementRepository>,
}

impl std::fmt::Debug for EngagementLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementLedger").finish_non_exhaustive()
    }
}

impl EngagementLedger {
    pub fn new(edges: Arc<dyn EngagementRepository>) -> Self {
        Self { edges }
    }

    /// Flip the (actor, subject, kind) edge and return the new state plus
    /// the subject's counter as of the same atomic operation.
    ///
    /// The store's conditional delete/insert is the sole race-resolution
    /// mechanism: a duplicate request that loses the insert race is absorbed
    /// as "already active" rather than surfaced as an error or counted twice.
    /// Edge existence is authoritative, never the number of calls.
    pub async fn toggle(
        &self,
        actor_id: Uuid,
        subject_id: Uuid,
        kind: EngagementKind,
    ) -> Result<ToggleOutcome> {
        if let Some(counter) = self.edges.release_edge(actor_id, subject_id, kind).await? {
            return Ok(ToggleOutcome {
                state: EngagementState::Inactive,
                counter,
            });
        }

        let counter = match self.edges.acquire_edge(actor_id, subject_id, kind).await? {
            AcquireOutcome::Inserted(counter) => counter,
            AcquireOutcome::AlreadyHeld(counter) => {
                debug!(%actor_id, %subject_id, kind = kind.as_str(),
                    "duplicate toggle absorbed");
                counter
            }
        };
        Ok(ToggleOutcome {
            state: EngagementState::Active,
            counter,
        })
    }

    /// Recompute the derived counters of one kind from the live edges,
    /// correcting any drift. Never touches edges.
    pub async fn reconcile(&self, kind: EngagementKind) -> Result<u64> {
        let corrected = self.edges.reconcile_counters(kind).await?;
        if corrected > 0 {
            debug!(kind = kind.as_str(), corrected, "counters reconciled");
        }
        Ok(corrected)
    }

    /// Reconcile every kind; returns the total number of corrected subjects.
    pub async fn reconcile_all(&self) -> Result<u64> {
        let mut corrected = 0;
        for kind in EngagementKind::ALL {
            corrected += self.reconcile(kind).await?;
        }
        Ok(corrected)
    }
}
