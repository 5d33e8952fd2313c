//! UseCase: 投票作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreatePollUseCase::execute() メソッド
//! - 投票の作成処理（設問・選択肢・制限時間の検証、既存投票の置き換え）
//!
//! ### なぜこのテストが必要か
//! - 不正な入力（空の設問、選択肢 1 件、制限時間 0 秒）を境界で弾く
//! - 制限時間が省略されたときにデフォルト値が使われることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規投票の作成（waiting 状態）
//! - 異常系：検証エラー
//! - エッジケース：active な投票がある状態での作り直し

use std::sync::Arc;

use anketo_shared::config::MAX_TIME_LIMIT_SECS;

use crate::domain::{ClassroomRepository, DerivedStats, PollOverview, QuestionText};

use super::error::CreatePollError;

/// 作成された投票のスナップショット
#[derive(Debug, Clone)]
pub struct CreatedPoll {
    pub overview: PollOverview,
    pub stats: DerivedStats,
}

/// 投票作成のユースケース
pub struct CreatePollUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
    /// 制限時間が省略されたときのデフォルト（秒）
    default_time_limit_secs: u64,
}

impl CreatePollUseCase {
    /// 新しい CreatePollUseCase を作成
    pub fn new(repository: Arc<dyn ClassroomRepository>, default_time_limit_secs: u64) -> Self {
        Self {
            repository,
            default_time_limit_secs,
        }
    }

    /// 投票作成を実行
    ///
    /// 新しい投票は waiting 状態で作られ、既存の投票を置き換える。
    /// 回答受付の開始は `StartPollUseCase` が担う。
    ///
    /// # Arguments
    ///
    /// * `raw_question` - 設問文（未検証）
    /// * `options` - 選択肢ラベル（未検証）
    /// * `time_limit` - 制限時間（秒）。None ならデフォルト値
    ///
    /// # Returns
    ///
    /// * `Ok(CreatedPoll)` - 作成成功
    /// * `Err(CreatePollError)` - 検証エラー
    pub async fn execute(
        &self,
        raw_question: String,
        options: Vec<String>,
        time_limit: Option<u64>,
    ) -> Result<CreatedPoll, CreatePollError> {
        let question = QuestionText::new(raw_question).map_err(CreatePollError::InvalidQuestion)?;

        let time_limit_secs = time_limit.unwrap_or(self.default_time_limit_secs);
        if time_limit_secs == 0 || time_limit_secs > MAX_TIME_LIMIT_SECS {
            return Err(CreatePollError::InvalidTimeLimit {
                max: MAX_TIME_LIMIT_SECS,
                actual: time_limit_secs,
            });
        }

        let overview = self
            .repository
            .create_poll(question, options, time_limit_secs)
            .await?;
        let stats = self.repository.derived_stats().await;

        Ok(CreatedPoll { overview, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Classroom, PollError, PollStatus},
        infrastructure::repository::InMemoryClassroomRepository,
    };
    use anketo_shared::time::FixedClock;
    use tokio::sync::Mutex;

    fn create_test_usecase() -> (CreatePollUseCase, Arc<InMemoryClassroomRepository>) {
        let repository = Arc::new(InMemoryClassroomRepository::new(
            Arc::new(Mutex::new(Classroom::new())),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        ));
        (CreatePollUseCase::new(repository.clone(), 60), repository)
    }

    #[tokio::test]
    async fn test_create_poll_success_with_default_time_limit() {
        // テスト項目: 制限時間を省略するとデフォルト値が使われる
        // given (前提条件):
        let (usecase, _repository) = create_test_usecase();

        // when (操作):
        let result = usecase
            .execute(
                "2+2?".to_string(),
                vec!["3".to_string(), "4".to_string()],
                None,
            )
            .await;

        // then (期待する結果):
        let created = result.expect("create should succeed");
        assert_eq!(created.overview.status, PollStatus::Waiting);
        assert_eq!(created.overview.time_limit_secs, 60);
        assert_eq!(created.overview.epoch, 1);
    }

    #[tokio::test]
    async fn test_create_poll_rejects_empty_question() {
        // テスト項目: 空の設問文が検証エラーになる
        // given (前提条件):
        let (usecase, _repository) = create_test_usecase();

        // when (操作):
        let result = usecase
            .execute(
                "  ".to_string(),
                vec!["a".to_string(), "b".to_string()],
                None,
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreatePollError::InvalidQuestion(_))));
    }

    #[tokio::test]
    async fn test_create_poll_rejects_single_option() {
        // テスト項目: 選択肢が 1 件しかない投票が拒否される
        // given (前提条件):
        let (usecase, _repository) = create_test_usecase();

        // when (操作):
        let result = usecase
            .execute("2+2?".to_string(), vec!["4".to_string()], None)
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(CreatePollError::InvalidOptions(PollError::NotEnoughOptions { .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_poll_rejects_zero_time_limit() {
        // テスト項目: 制限時間 0 秒が拒否される
        // given (前提条件):
        let (usecase, _repository) = create_test_usecase();

        // when (操作):
        let result = usecase
            .execute(
                "2+2?".to_string(),
                vec!["3".to_string(), "4".to_string()],
                Some(0),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(CreatePollError::InvalidTimeLimit { actual: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_create_poll_replaces_active_poll() {
        // テスト項目: active な投票がある状態でも作り直しできる
        // given (前提条件):
        let (usecase, repository) = create_test_usecase();
        usecase
            .execute(
                "first?".to_string(),
                vec!["a".to_string(), "b".to_string()],
                None,
            )
            .await
            .unwrap();
        repository.start_poll().await.unwrap();

        // when (操作):
        let result = usecase
            .execute(
                "second?".to_string(),
                vec!["a".to_string(), "b".to_string()],
                None,
            )
            .await;

        // then (期待する結果):
        let created = result.expect("create should succeed");
        assert_eq!(created.overview.epoch, 2);
        assert_eq!(created.overview.status, PollStatus::Waiting);
        assert_eq!(created.stats.questions_asked, 2);
    }
}
