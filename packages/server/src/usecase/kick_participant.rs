//! UseCase: 強制退出処理
//!
//! 参加者をレジストリと roster から取り除き、本人への個別通知と接続の
//! クローズを提供する。個別通知 → クローズ → 全体ブロードキャストの順序は
//! UI 層が守る（本人が自分の removal ブロードキャストを見ないように）。

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ClassroomRepository, ConnectionId, DerivedStats, MessagePusher, Participant,
    ParticipantId,
};

use super::error::KickError;

/// 強制退出の結果
#[derive(Debug, Clone)]
pub struct KickOutcome {
    pub participant: Participant,
    pub reason: Option<String>,
    pub notice: ChatMessage,
    pub stats: DerivedStats,
}

/// 強制退出のユースケース
pub struct KickParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl KickParticipantUseCase {
    /// 新しい KickParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn ClassroomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 強制退出を実行
    ///
    /// レジストリからレコードが消えるため、この接続があとで流す切断イベントは
    /// no-op になる（退出通知の二重送信は起きない）。
    ///
    /// # Arguments
    ///
    /// * `participant_id` - 退出させる参加者の ID
    /// * `reason` - 理由（任意、ブロードキャストにそのまま載る）
    ///
    /// # Returns
    ///
    /// * `Ok(KickOutcome)` - 退出成功
    /// * `Err(KickError)` - 参加者が存在しない
    pub async fn execute(
        &self,
        participant_id: &ParticipantId,
        reason: Option<String>,
    ) -> Result<KickOutcome, KickError> {
        let participant = self
            .repository
            .remove_participant(participant_id)
            .await
            .ok_or(KickError::UnknownParticipant)?;

        let notice = self
            .repository
            .post_system_notice(format!(
                "{} was removed from the classroom",
                participant.name.as_str()
            ))
            .await;
        let stats = self.repository.derived_stats().await;

        Ok(KickOutcome {
            participant,
            reason,
            notice,
            stats,
        })
    }

    /// 退出させられた本人に個別通知を届けてから接続を閉じる
    ///
    /// sender の破棄前に積まれたメッセージは受信側で先に配送されるため、
    /// 通知はクローズより先に届く。
    pub async fn deliver_notice_and_close(&self, connection_id: &ConnectionId, message: &str) {
        if let Err(e) = self.message_pusher.push_to(connection_id, message).await {
            tracing::warn!(
                "Failed to deliver kick notice to connection '{}': {}",
                connection_id,
                e
            );
        }
        self.message_pusher.unregister_connection(connection_id).await;
    }
}
