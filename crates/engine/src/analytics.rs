use tracing::instrument;

use tutormatch_core::{
    MatchResult,
    models::{
        identity::{Caller, Role},
        match_log::MatchAnalytics,
    },
};

use crate::MatchEngine;

impl MatchEngine {
    #[instrument(skip(self), fields(caller_id = %caller.id))]
    pub async fn match_analytics(&self, caller: &Caller) -> MatchResult<MatchAnalytics> {
        caller.require(Role::Coordinator)?;
        let logs = self.store.match_logs().await?;
        Ok(MatchAnalytics::from_logs(&logs))
    }
}
