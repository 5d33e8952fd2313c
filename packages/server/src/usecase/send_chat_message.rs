//! UseCase: チャットメッセージ送信処理
//!
//! 本文の検証（トリム・空・500 文字超）は境界であるこのユースケースで行い、
//! フィード自体は検証済みの値だけを受け取る。

use std::sync::Arc;

use crate::domain::{ChatMessage, ClassroomRepository, MessageBody, SenderRole};

use super::error::ChatError;

/// チャットメッセージ送信のユースケース
pub struct SendChatMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
}

impl SendChatMessageUseCase {
    /// 新しい SendChatMessageUseCase を作成
    pub fn new(repository: Arc<dyn ClassroomRepository>) -> Self {
        Self { repository }
    }

    /// チャットメッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_role` - 送信者の種別（接続の自己申告に基づく）
    /// * `sender_name` - 送信時点の表示名
    /// * `raw_message` - メッセージ本文（未検証）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 追記されたメッセージ
    /// * `Err(ChatError)` - 本文が不正
    pub async fn execute(
        &self,
        sender_role: SenderRole,
        sender_name: String,
        raw_message: String,
    ) -> Result<ChatMessage, ChatError> {
        let body = MessageBody::new(raw_message)?;
        let message = self
            .repository
            .post_message(sender_role, sender_name, body)
            .await;
        Ok(message)
    }
}
