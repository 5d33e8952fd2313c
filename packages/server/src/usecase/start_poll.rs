//! UseCase: 回答受付開始処理
//!
//! waiting 状態の投票を active に遷移させる。締め切りタイマーの発火処理は
//! UI 層が `StartedPoll` の通し番号と制限時間をもとに仕込む。

use std::sync::Arc;

use crate::domain::{ClassroomRepository, DerivedStats, PollOverview};

use super::error::StartPollError;

/// 回答受付を開始した投票のスナップショット
#[derive(Debug, Clone)]
pub struct StartedPoll {
    pub overview: PollOverview,
    pub stats: DerivedStats,
}

/// 回答受付開始のユースケース
pub struct StartPollUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
}

impl StartPollUseCase {
    /// 新しい StartPollUseCase を作成
    pub fn new(repository: Arc<dyn ClassroomRepository>) -> Self {
        Self { repository }
    }

    /// 回答受付開始を実行
    ///
    /// # Returns
    ///
    /// * `Ok(StartedPoll)` - 開始成功
    /// * `Err(StartPollError)` - 投票がない、または waiting でない
    pub async fn execute(&self) -> Result<StartedPoll, StartPollError> {
        let overview = self
            .repository
            .start_poll()
            .await
            .ok_or(StartPollError::NotStartable)?;
        let stats = self.repository.derived_stats().await;

        Ok(StartedPoll { overview, stats })
    }
}
