//! インメモリ Poll History Repository 実装
//!
//! 確定した投票の記録をプロセス内の Vec に保持する。永続化（DB・ファイル）は
//! スコープ外だが、受け渡しのインターフェースはここで確立しておく。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{FinalizedPoll, PollHistoryRepository, RepositoryError};

/// インメモリ Poll History Repository 実装
pub struct InMemoryPollHistoryRepository {
    records: Arc<Mutex<Vec<FinalizedPoll>>>,
}

impl InMemoryPollHistoryRepository {
    /// 新しい InMemoryPollHistoryRepository を作成
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for InMemoryPollHistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PollHistoryRepository for InMemoryPollHistoryRepository {
    async fn save(&self, record: FinalizedPoll) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().await;
        records.push(record);
        Ok(())
    }

    async fn list(&self) -> Vec<FinalizedPoll> {
        let records = self.records.lock().await;
        records.clone()
    }
}
