//! ドメイン層のエンティティ定義

use super::value_object::{ConnectionId, MessageId, ParticipantId, ParticipantName, PollId, Timestamp};

/// 接続が自己申告する役割
///
/// 認証は行わない（スコープ外）。接続ごとに自己申告された役割を信頼する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student,
}

/// チャットメッセージの送信者種別
///
/// 参加者の役割に加えて、サーバー自身が発するシステム通知用の `System` を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderRole {
    Teacher,
    Student,
    System,
}

impl From<Role> for SenderRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Teacher => SenderRole::Teacher,
            Role::Student => SenderRole::Student,
        }
    }
}

/// 参加者（Identity Registry に登録される学生）
///
/// 接続 ID は参加時の WebSocket 接続に紐づく。再接続は新しい接続 ID、
/// つまり新しい参加者として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: ParticipantName,
    pub role: Role,
    pub connection_id: ConnectionId,
    pub connected: bool,
    pub joined_at: Timestamp,
}

impl Participant {
    /// 新しい Participant を作成
    pub fn new(
        name: ParticipantName,
        role: Role,
        connection_id: ConnectionId,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            id: ParticipantId::generate(),
            name,
            role,
            connection_id,
            connected: true,
            joined_at,
        }
    }
}

/// チャットメッセージ（追記専用フィードの 1 エントリ）
///
/// `sender_name` は投稿時点の表示名のスナップショット。参加者が退出しても
/// 履歴上の名前は変わらない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_role: SenderRole,
    pub sender_name: String,
    pub body: String,
    pub timestamp: Timestamp,
}

/// 確定した投票の記録（履歴ストアへの受け渡し用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedPoll {
    pub poll_id: PollId,
    pub epoch: u64,
    pub question: String,
    pub options: Vec<String>,
    /// 選択肢インデックスごとの最終回答数（0 埋め）
    pub counts: Vec<usize>,
    pub total_participants: usize,
    pub completed_at: Timestamp,
}
