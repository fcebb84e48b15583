use axum::extract::FromRef;

use crate::pipeline::ScriptPipeline;
use crate::script_store::SessionStore;
use crate::search::SearchProvider;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedPipeline = Arc<ScriptPipeline>;
pub type GuardedSessionStore = Arc<dyn SessionStore>;
pub type GuardedSearchProvider = Arc<dyn SearchProvider>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub pipeline: GuardedPipeline,
    pub sessions: GuardedSessionStore,
    pub search: GuardedSearchProvider,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        pipeline: GuardedPipeline,
        sessions: GuardedSessionStore,
        search: GuardedSearchProvider,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            pipeline,
            sessions,
            search,
        }
    }
}

impl FromRef<ServerState> for GuardedPipeline {
    fn from_ref(input: &ServerState) -> Self {
        input.pipeline.clone()
    }
}

impl FromRef<ServerState> for GuardedSessionStore {
    fn from_ref(input: &ServerState) -> Self {
        input.sessions.clone()
    }
}

impl FromRef<ServerState> for GuardedSearchProvider {
    fn from_ref(input: &ServerState) -> Self {
        input.search.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
