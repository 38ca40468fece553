use std::{fmt, sync::Arc};

use vidra_core::auth::{Hasher, TokenService};
use vidra_core::store::{EngagementRepository, IdentityRepository, VideoRepository};
use vidra_core::{EngagementLedger, StatsAggregator};

use crate::infra::config::Config;

/// Everything a handler needs, wired once at startup. Components get their
/// store dependencies here; nothing reaches for a global handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identities: Arc<dyn IdentityRepository>,
    pub videos: Arc<dyn VideoRepository>,
    pub hasher: Arc<dyn Hasher>,
    pub tokens: Arc<TokenService>,
    pub ledger: Arc<EngagementLedger>,
    pub stats: Arc<StatsAggregator>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn assemble(
        config: Arc<Config>,
        identities: Arc<dyn IdentityRepository>,
        edges: Arc<dyn EngagementRepository>,
        videos: Arc<dyn VideoRepository>,
        hasher: Arc<dyn Hasher>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            identities.clone(),
            &config.auth.jwt_secret,
            config.auth.access_ttl_secs,
        ));
        let ledger = Arc::new(EngagementLedger::new(edges));
        let stats = Arc::new(StatsAggregator::new(identities.clone(), videos.clone()));

        Self {
            config,
            identities,
            videos,
            hasher,
            tokens,
            ledger,
            stats,
        }
    }
}
