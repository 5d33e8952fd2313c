//! UseCase: 回答送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitResponseUseCase::execute() メソッド
//! - 回答の記録と、全員回答による自動終了への合流
//!
//! ### なぜこのテストが必要か
//! - 1 人 1 回答の保証（2 回目の回答は拒否される）
//! - 最後の 1 人の回答で投票がちょうど 1 回終了し、履歴に保存されること
//! - 参加していない接続からの回答を弾くこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：回答の記録（途中・最後）
//! - 異常系：二重回答、未参加の接続、範囲外の選択肢
//! - エッジケース：roster 1 人での即時自動終了

use std::sync::Arc;

use crate::domain::{ClassroomRepository, ConnectionId, DerivedStats, Participant, PollResults};

use super::{
    end_poll::{EndPollUseCase, EndedPoll},
    error::SubmitResponseError,
};

/// 回答受理のスナップショット
#[derive(Debug, Clone)]
pub struct SubmittedResponse {
    pub participant: Participant,
    pub option_index: usize,
    pub results: PollResults,
    pub stats: DerivedStats,
    /// この回答で全員回答となり投票が終了した場合のみ Some
    pub ended: Option<EndedPoll>,
}

/// 回答送信のユースケース
pub struct SubmitResponseUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
    /// 自動終了時の確定処理の合流先
    end_poll_usecase: Arc<EndPollUseCase>,
}

impl SubmitResponseUseCase {
    /// 新しい SubmitResponseUseCase を作成
    pub fn new(
        repository: Arc<dyn ClassroomRepository>,
        end_poll_usecase: Arc<EndPollUseCase>,
    ) -> Self {
        Self {
            repository,
            end_poll_usecase,
        }
    }

    /// 回答送信を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 回答した接続の ID
    /// * `option_index` - 選択肢インデックス
    ///
    /// # Returns
    ///
    /// * `Ok(SubmittedResponse)` - 受理成功。`ended` が Some なら呼び出し側は
    ///   poll-ended のブロードキャストも行う
    /// * `Err(SubmitResponseError)` - 未参加・状態競合・範囲外
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        option_index: usize,
    ) -> Result<SubmittedResponse, SubmitResponseError> {
        let participant = self
            .repository
            .participant_by_connection(connection_id)
            .await
            .ok_or(SubmitResponseError::NotJoined)?;

        let outcome = self
            .repository
            .submit_response(participant.id, option_index)
            .await?;

        // 全員回答で終了した場合は、タイムアウト・手動終了と同じ確定処理に合流する
        let ended = match outcome.finalized {
            Some(finalized) => Some(self.end_poll_usecase.finalize(finalized).await),
            None => None,
        };

        let stats = self.repository.derived_stats().await;

        Ok(SubmittedResponse {
            participant,
            option_index: outcome.option_index,
            results: outcome.results,
            stats,
            ended,
        })
    }
}
