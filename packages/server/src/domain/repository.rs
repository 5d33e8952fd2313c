//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, FinalizedPoll, Participant, SenderRole},
    error::{PollError, RepositoryError, SubmitError},
    results::DerivedStats,
    session::{PollOverview, PollResults, SubmitOutcome},
    value_object::{ConnectionId, MessageBody, ParticipantId, ParticipantName, QuestionText},
};

/// Classroom Repository trait
///
/// プロセス内で唯一の教室状態へのインターフェース。各メソッドは 1 つの
/// クリティカルセクションとして実行される（実装側が 1 つのロックで守る）。
/// 特に `submit_response` の「記録＋全員回答チェック＋終了遷移」は 1 呼び出しに
/// 収まっているため、最後の 1 人を同時に競う 2 つの回答が二重に終了を
/// 起こすことはない。
#[async_trait]
pub trait ClassroomRepository: Send + Sync {
    /// 新しい投票を waiting 状態で作成し、既存の投票を置き換える
    async fn create_poll(
        &self,
        question: QuestionText,
        options: Vec<String>,
        time_limit_secs: u64,
    ) -> Result<PollOverview, PollError>;

    /// 現在の投票の回答受付を開始する
    async fn start_poll(&self) -> Option<PollOverview>;

    /// 回答を記録する（全員回答なら同一ステップで自動終了）
    async fn submit_response(
        &self,
        participant_id: ParticipantId,
        option_index: usize,
    ) -> Result<SubmitOutcome, SubmitError>;

    /// 投票を終了する（`expected_epoch` 不一致・active 以外は None）
    async fn end_poll(&self, expected_epoch: Option<u64>) -> Option<FinalizedPoll>;

    /// 学生として参加する（表示名の衝突は None）
    async fn join_student(
        &self,
        connection_id: ConnectionId,
        name: ParticipantName,
    ) -> Option<Participant>;

    /// 参加者を取り除く（強制退出用）
    async fn remove_participant(&self, participant_id: &ParticipantId) -> Option<Participant>;

    /// 接続 ID で参加者を取り除く（切断時のクリーンアップ用、冪等）
    async fn remove_by_connection(&self, connection_id: &ConnectionId) -> Option<Participant>;

    /// 接続 ID で参加者を検索
    async fn participant_by_connection(&self, connection_id: &ConnectionId) -> Option<Participant>;

    /// 全参加者のリスト
    async fn participants(&self) -> Vec<Participant>;

    /// 現在の投票の公開用スナップショット
    async fn poll_overview(&self) -> Option<PollOverview>;

    /// 現在の投票の集計結果
    async fn poll_results(&self) -> Option<PollResults>;

    /// 派生統計
    async fn derived_stats(&self) -> DerivedStats;

    /// チャットメッセージを投稿する
    async fn post_message(
        &self,
        sender_role: SenderRole,
        sender_name: String,
        body: MessageBody,
    ) -> ChatMessage;

    /// システム通知を投稿する
    async fn post_system_notice(&self, text: String) -> ChatMessage;

    /// チャット履歴を返す
    async fn chat_history(&self) -> Vec<ChatMessage>;

    /// チャット履歴を空にする
    async fn clear_chat(&self);
}

/// Poll History Repository trait
///
/// 確定した投票の記録の受け渡し先（履歴ストア）。保存失敗は呼び出し側で
/// ログして握りつぶす（メモリ上の確定をロールバックしない）。
#[async_trait]
pub trait PollHistoryRepository: Send + Sync {
    /// 確定した投票の記録を保存する
    async fn save(&self, record: FinalizedPoll) -> Result<(), RepositoryError>;

    /// 保存済みの記録を古い順で返す
    async fn list(&self) -> Vec<FinalizedPoll>;
}
