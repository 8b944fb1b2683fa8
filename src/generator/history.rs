use std::future::Future;

use color_eyre::Result;

use crate::db::{Db, NewPerformance, NewQuestionHistory};

/// Write-once analytics records produced by the pipeline and by answer
/// submissions. Each call is a single-row insert.
#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore: Send + Sync {
    fn record_question(
        &self,
        record: &NewQuestionHistory,
    ) -> impl Future<Output = Result<String>> + Send;

    fn record_performance(
        &self,
        record: &NewPerformance,
    ) -> impl Future<Output = Result<String>> + Send;
}

impl HistoryStore for Db {
    async fn record_question(&self, record: &NewQuestionHistory) -> Result<String> {
        self.insert_question_history(record).await
    }

    async fn record_performance(&self, record: &NewPerformance) -> Result<String> {
        self.insert_performance(record).await
    }
}
