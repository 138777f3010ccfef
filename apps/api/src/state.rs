use std::sync::Arc;

use crate::config::Config;
use crate::parsing::vocabulary::VocabularyAccumulator;
use crate::ranking::service::RankingService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Corpus, feature engineer and scorer. Read-only after startup.
    pub ranking: Arc<RankingService>,
    /// Same accumulator the response parser records into.
    pub vocabulary: Arc<VocabularyAccumulator>,
    pub config: Config,
}
