//! UseCase: チャット履歴消去処理

use std::sync::Arc;

use crate::domain::{ChatMessage, ClassroomRepository};

/// 消去後のスナップショット
#[derive(Debug, Clone)]
pub struct ClearedChat {
    /// 消去直後に追記されるシステム通知
    pub notice: ChatMessage,
}

/// チャット履歴消去のユースケース
pub struct ClearChatUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
}

impl ClearChatUseCase {
    /// 新しい ClearChatUseCase を作成
    pub fn new(repository: Arc<dyn ClassroomRepository>) -> Self {
        Self { repository }
    }

    /// チャット履歴消去を実行
    ///
    /// 消去のあとにシステム通知を追記するため、消去後の履歴には
    /// 通知 1 件だけが残る。
    pub async fn execute(&self) -> ClearedChat {
        self.repository.clear_chat().await;
        let notice = self
            .repository
            .post_system_notice("Chat history was cleared".to_string())
            .await;
        ClearedChat { notice }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Classroom, SenderRole},
        infrastructure::repository::InMemoryClassroomRepository,
    };
    use anketo_shared::time::FixedClock;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_clear_chat_leaves_only_notice() {
        // テスト項目: 消去後の履歴にはシステム通知 1 件だけが残る
        // given (前提条件):
        let repository = Arc::new(InMemoryClassroomRepository::new(
            Arc::new(Mutex::new(Classroom::new())),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        ));
        let usecase = ClearChatUseCase::new(repository.clone());
        repository
            .post_system_notice("old notice".to_string())
            .await;

        // when (操作):
        let cleared = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(cleared.notice.sender_role, SenderRole::System);
        let history = repository.chat_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].body, "Chat history was cleared");
    }
}
