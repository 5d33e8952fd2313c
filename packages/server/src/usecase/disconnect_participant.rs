//! UseCase: 参加者切断処理
//!
//! トランスポートレベルの切断時のクリーンアップ。レジストリと roster の
//! 両方から参加者を取り除き、退出のシステム通知を追記する。
//! 強制退出済みの接続にはレジストリのレコードが残っていないため、
//! その後の切断イベントは何も起こさない（退出通知の二重送信は起きない）。

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ClassroomRepository, ConnectionId, DerivedStats, MessagePusher, Participant,
};

/// 切断クリーンアップの結果
#[derive(Debug, Clone)]
pub struct DisconnectOutcome {
    pub participant: Participant,
    pub notice: ChatMessage,
    pub stats: DerivedStats,
}

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn ClassroomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 切断クリーンアップを実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 切断された接続の ID
    ///
    /// # Returns
    ///
    /// * `Some(DisconnectOutcome)` - 学生として参加していた接続の切断
    /// * `None` - 参加していない接続（教師、または強制退出済み）。
    ///   ブロードキャストは不要。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<DisconnectOutcome> {
        self.message_pusher.unregister_connection(connection_id).await;

        let participant = self.repository.remove_by_connection(connection_id).await?;
        let notice = self
            .repository
            .post_system_notice(format!("{} left the classroom", participant.name.as_str()))
            .await;
        let stats = self.repository.derived_stats().await;

        Some(DisconnectOutcome {
            participant,
            notice,
            stats,
        })
    }
}
