//! UseCase: 投票終了処理
//!
//! タイムアウト・手動終了・全員回答の 3 経路がここに合流する。
//! 状態遷移そのもの（1 セッションにつき 1 回だけ成立）はドメイン層の
//! `end` が保証するため、このユースケースが返す `EndedPoll` も
//! 1 セッションにつき 1 回しか生まれない。呼び出し側はそれを
//! そのまま 1 回のブロードキャストに対応させればよい。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 手動終了が 1 回だけ成立すること
//! - 世代（通し番号）が合わないタイマー発火が no-op になること
//! - 確定データが履歴ストアにちょうど 1 回保存されること
//! - 履歴保存の失敗がメモリ上の確定をロールバックしないこと

use std::sync::Arc;

use crate::domain::{
    results, ChatMessage, ClassroomRepository, DerivedStats, FinalizedPoll, PollHistoryRepository,
    PollResults,
};

use super::error::EndPollError;

/// 確定した投票とその時点のスナップショット
#[derive(Debug, Clone)]
pub struct EndedPoll {
    pub finalized: FinalizedPoll,
    pub results: PollResults,
    pub stats: DerivedStats,
    pub notice: ChatMessage,
}

/// 投票終了のユースケース
pub struct EndPollUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
    /// 確定データの受け渡し先（履歴ストア）
    history_repository: Arc<dyn PollHistoryRepository>,
}

impl EndPollUseCase {
    /// 新しい EndPollUseCase を作成
    pub fn new(
        repository: Arc<dyn ClassroomRepository>,
        history_repository: Arc<dyn PollHistoryRepository>,
    ) -> Self {
        Self {
            repository,
            history_repository,
        }
    }

    /// 投票終了を実行
    ///
    /// # Arguments
    ///
    /// * `expected_epoch` - タイマー発火時はタイマーを仕込んだ投票の通し番号、
    ///   手動終了時は None
    ///
    /// # Returns
    ///
    /// * `Ok(EndedPoll)` - 終了成功（このセッションで最初の 1 回のみ）
    /// * `Err(EndPollError)` - active な投票がない、または通し番号の不一致
    pub async fn execute(&self, expected_epoch: Option<u64>) -> Result<EndedPoll, EndPollError> {
        let finalized = self
            .repository
            .end_poll(expected_epoch)
            .await
            .ok_or(EndPollError::NoActivePoll)?;
        Ok(self.finalize(finalized).await)
    }

    /// 確定後の副作用（システム通知・履歴保存）を実行してスナップショットを返す
    ///
    /// 全員回答による自動終了（遷移はドメイン層の `submit_response` の中で
    /// 起きる）もこのメソッドに合流する。
    pub async fn finalize(&self, finalized: FinalizedPoll) -> EndedPoll {
        let notice = self
            .repository
            .post_system_notice(format!("Poll \"{}\" has ended", finalized.question))
            .await;

        // 履歴保存の失敗はログして握りつぶす。メモリ上の確定はロールバックしない。
        if let Err(e) = self.history_repository.save(finalized.clone()).await {
            tracing::warn!("Failed to persist finalized poll: {}", e);
        }

        let total_responses: usize = finalized.counts.iter().sum();
        let results = PollResults {
            question: finalized.question.clone(),
            options: finalized.options.clone(),
            percentages: results::percentages(&finalized.counts),
            counts: finalized.counts.clone(),
            total_responses,
            roster_size: finalized.total_participants,
        };
        let stats = self.repository.derived_stats().await;

        EndedPoll {
            finalized,
            results,
            stats,
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Classroom, ConnectionId, ParticipantName, QuestionText, RepositoryError},
        infrastructure::repository::{InMemoryClassroomRepository, InMemoryPollHistoryRepository},
    };
    use anketo_shared::time::FixedClock;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    fn create_test_repository() -> Arc<InMemoryClassroomRepository> {
        Arc::new(InMemoryClassroomRepository::new(
            Arc::new(Mutex::new(Classroom::new())),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        ))
    }

    async fn create_active_poll(repository: &Arc<InMemoryClassroomRepository>) -> u64 {
        let overview = repository
            .create_poll(
                QuestionText::new("2+2?".to_string()).unwrap(),
                vec!["3".to_string(), "4".to_string()],
                30,
            )
            .await
            .unwrap();
        repository.start_poll().await.unwrap();
        overview.epoch
    }

    #[tokio::test]
    async fn test_manual_end_succeeds_once() {
        // テスト項目: 手動終了は 1 回だけ成立し、2 回目はエラーになる
        // given (前提条件):
        let repository = create_test_repository();
        let history = Arc::new(InMemoryPollHistoryRepository::new());
        let usecase = EndPollUseCase::new(repository.clone(), history.clone());
        create_active_poll(&repository).await;

        // when (操作):
        let first = usecase.execute(None).await;
        let second = usecase.execute(None).await;

        // then (期待する結果):
        assert!(first.is_ok());
        assert!(matches!(second, Err(EndPollError::NoActivePoll)));

        // 履歴ストアにはちょうど 1 件保存されている
        assert_eq!(history.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_epoch_is_noop() {
        // テスト項目: 置き換え前の投票のタイマー発火に相当する呼び出しは no-op
        // given (前提条件):
        let repository = create_test_repository();
        let history = Arc::new(InMemoryPollHistoryRepository::new());
        let usecase = EndPollUseCase::new(repository.clone(), history.clone());
        let old_epoch = create_active_poll(&repository).await;
        // 投票を作り直す
        let _ = create_active_poll(&repository).await;

        // when (操作): 古い通し番号での終了
        let result = usecase.execute(Some(old_epoch)).await;

        // then (期待する結果): 現在の投票は生き残り、履歴にも何も保存されない
        assert!(matches!(result, Err(EndPollError::NoActivePoll)));
        assert!(history.list().await.is_empty());
        assert!(repository.derived_stats().await.has_active_poll);
    }

    #[tokio::test]
    async fn test_finalize_posts_system_notice() {
        // テスト項目: 終了時にシステム通知がフィードに追記される
        // given (前提条件):
        let repository = create_test_repository();
        let history = Arc::new(InMemoryPollHistoryRepository::new());
        let usecase = EndPollUseCase::new(repository.clone(), history);
        create_active_poll(&repository).await;

        // when (操作):
        let ended = usecase.execute(None).await.unwrap();

        // then (期待する結果):
        assert!(ended.notice.body.contains("has ended"));
        let chat_history = repository.chat_history().await;
        assert_eq!(chat_history.len(), 1);
    }

    #[tokio::test]
    async fn test_history_save_failure_does_not_roll_back() {
        // テスト項目: 履歴保存の失敗後もメモリ上の確定は維持される
        // given (前提条件):
        struct FailingHistoryRepository;

        #[async_trait]
        impl PollHistoryRepository for FailingHistoryRepository {
            async fn save(&self, _record: FinalizedPoll) -> Result<(), RepositoryError> {
                Err(RepositoryError::StorageUnavailable("disk full".to_string()))
            }

            async fn list(&self) -> Vec<FinalizedPoll> {
                Vec::new()
            }
        }

        let repository = create_test_repository();
        let usecase = EndPollUseCase::new(repository.clone(), Arc::new(FailingHistoryRepository));
        create_active_poll(&repository).await;

        // when (操作):
        let result = usecase.execute(None).await;

        // then (期待する結果): 終了自体は成功として返り、状態は ended のまま
        assert!(result.is_ok());
        let overview = repository.poll_overview().await.unwrap();
        assert_eq!(overview.status, crate::domain::PollStatus::Ended);
    }

    #[tokio::test]
    async fn test_ended_results_match_final_counts() {
        // テスト項目: EndedPoll の集計が確定データと一致する
        // given (前提条件):
        let repository = create_test_repository();
        let history = Arc::new(InMemoryPollHistoryRepository::new());
        let usecase = EndPollUseCase::new(repository.clone(), history);
        let alice = repository
            .join_student(
                ConnectionId::generate(),
                ParticipantName::new("alice".to_string()).unwrap(),
            )
            .await
            .unwrap();
        create_active_poll(&repository).await;
        // alice は create 前に参加しているので roster に入っている
        let outcome = repository.submit_response(alice.id, 1).await.unwrap();
        // 全員回答で自動終了済み
        let finalized = outcome.finalized.unwrap();

        // when (操作):
        let ended = usecase.finalize(finalized).await;

        // then (期待する結果):
        assert_eq!(ended.results.counts, vec![0, 1]);
        assert_eq!(ended.results.total_responses, 1);
        assert_eq!(ended.results.percentages, vec![0, 100]);
    }
}
