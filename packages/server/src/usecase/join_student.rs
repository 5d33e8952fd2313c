//! UseCase: 学生参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinStudentUseCase::execute() メソッド
//! - 学生の参加処理（名前の検証、重複チェック、roster への追加）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：表示名はセッション内で一意でなければならない
//! - レジストリと roster の両方に反映されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規学生の参加
//! - 異常系：使用中の表示名での参加試行、不正な名前
//! - エッジケース：除去済みの名前での再参加

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ClassroomRepository, ConnectionId, DerivedStats, Participant, ParticipantName,
    PollOverview,
};

use super::error::JoinError;

/// 参加成功時のスナップショット
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub participant: Participant,
    pub poll: Option<PollOverview>,
    pub stats: DerivedStats,
    pub notice: ChatMessage,
}

/// 学生参加のユースケース
pub struct JoinStudentUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClassroomRepository>,
}

impl JoinStudentUseCase {
    /// 新しい JoinStudentUseCase を作成
    pub fn new(repository: Arc<dyn ClassroomRepository>) -> Self {
        Self { repository }
    }

    /// 学生参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続の ID
    /// * `raw_name` - 申告された表示名（未検証）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加成功（参加者・現在の投票・統計・システム通知）
    /// * `Err(JoinError)` - 名前が不正、または使用中
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        raw_name: String,
    ) -> Result<JoinOutcome, JoinError> {
        let name = ParticipantName::new(raw_name)?;
        let display_name = name.as_str().to_string();

        let participant = self
            .repository
            .join_student(connection_id, name)
            .await
            .ok_or(JoinError::NameTaken(display_name.clone()))?;

        let notice = self
            .repository
            .post_system_notice(format!("{display_name} joined the classroom"))
            .await;
        let poll = self.repository.poll_overview().await;
        let stats = self.repository.derived_stats().await;

        Ok(JoinOutcome {
            participant,
            poll,
            stats,
            notice,
        })
    }
}
