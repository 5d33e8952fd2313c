//! UseCase: スナップショット取得処理
//!
//! 状態を変更しない読み取り系のクエリをまとめる。結果はすべて問い合わせの
//! たびに再計算される（キャッシュしない）。

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ClassroomRepository, DerivedStats, FinalizedPoll, Participant,
    PollHistoryRepository, PollOverview, PollResults,
};

/// 接続直後に送るスナップショット
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub poll: Option<PollOverview>,
    pub stats: DerivedStats,
    pub participants: Vec<Participant>,
    pub chat_history: Vec<ChatMessage>,
}

/// スナップショット取得のユースケース
pub struct GetSnapshotUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
    /// 確定済み投票の履歴ストア
    history_repository: Arc<dyn PollHistoryRepository>,
}

impl GetSnapshotUseCase {
    /// 新しい GetSnapshotUseCase を作成
    pub fn new(
        repository: Arc<dyn ClassroomRepository>,
        history_repository: Arc<dyn PollHistoryRepository>,
    ) -> Self {
        Self {
            repository,
            history_repository,
        }
    }

    /// 接続直後に送る全体スナップショットを取得
    pub async fn session_state(&self) -> SessionSnapshot {
        SessionSnapshot {
            poll: self.repository.poll_overview().await,
            stats: self.repository.derived_stats().await,
            participants: self.repository.participants().await,
            chat_history: self.repository.chat_history().await,
        }
    }

    /// 現在の投票のスナップショットと派生統計を取得
    pub async fn poll_status(&self) -> (Option<PollOverview>, DerivedStats) {
        (
            self.repository.poll_overview().await,
            self.repository.derived_stats().await,
        )
    }

    /// 現在の投票の集計結果と派生統計を取得
    pub async fn results(&self) -> (Option<PollResults>, DerivedStats) {
        (
            self.repository.poll_results().await,
            self.repository.derived_stats().await,
        )
    }

    /// チャット履歴を取得
    pub async fn chat_history(&self) -> Vec<ChatMessage> {
        self.repository.chat_history().await
    }

    /// 確定済み投票の履歴を取得
    pub async fn poll_history(&self) -> Vec<FinalizedPoll> {
        self.history_repository.list().await
    }
}
