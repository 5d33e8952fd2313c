//! WebSocket event DTOs.
//!
//! イベントは `type` フィールドで識別するタグ付き JSON。状態を変更する受信
//! イベントには発信元への ACK（`*-success` / `*-error`）が 1 つ対応し、
//! 共有状態が変わった場合は加えて全接続へのブロードキャストが飛ぶ。

use serde::{Deserialize, Serialize};

/// 受信イベント（クライアント → サーバー）
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// 学生として参加する
    JoinAsStudent { name: String },
    /// 教師として参加する（スナップショットの受信のみ、登録なし）
    JoinAsTeacher,
    /// 投票を作成して回答受付を開始する（教師のみ）
    CreatePoll {
        question: String,
        options: Vec<String>,
        #[serde(default)]
        time_limit: Option<u64>,
    },
    /// waiting 状態の投票の回答受付を開始する（教師のみ）
    StartPoll,
    /// 投票を手動で終了する（教師のみ）
    EndPoll,
    /// 回答を送信する（学生のみ）
    SubmitResponse { option_index: usize },
    /// 現在の投票のスナップショットを取得する
    GetPollStatus,
    /// 集計結果を取得する
    GetResults,
    /// チャットメッセージを送信する
    SendChatMessage { message: String },
    /// チャット履歴を取得する
    GetChatHistory,
    /// 参加者を強制退出させる（教師のみ）
    KickParticipant {
        participant_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    /// チャット履歴を消去する（教師のみ）
    ClearChat,
}

/// 送信イベント（サーバー → クライアント）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// 接続直後に送るスナップショット
    SessionState {
        poll: Option<PollOverviewDto>,
        stats: StatsDto,
        participants: Vec<ParticipantDto>,
        chat_history: Vec<ChatMessageDto>,
    },

    // ----------------------------------------
    // ACK（発信元への直接応答）
    // ----------------------------------------
    JoinSuccess {
        participant: Option<ParticipantDto>,
        poll: Option<PollOverviewDto>,
        stats: StatsDto,
    },
    JoinError { message: String },
    CreatePollSuccess { poll: PollOverviewDto },
    CreatePollError { message: String },
    StartPollSuccess { poll: PollOverviewDto },
    StartPollError { message: String },
    EndPollSuccess { results: PollResultsDto },
    EndPollError { message: String },
    SubmitResponseSuccess { option_index: usize },
    SubmitResponseError { message: String },
    SendChatMessageSuccess { message: ChatMessageDto },
    SendChatMessageError { message: String },
    KickParticipantSuccess { participant_id: String },
    KickParticipantError { message: String },
    ClearChatSuccess,
    ClearChatError { message: String },
    /// スナップショットクエリへの応答
    PollStatus {
        poll: Option<PollOverviewDto>,
        stats: StatsDto,
    },
    Results {
        results: Option<PollResultsDto>,
        stats: StatsDto,
    },
    ChatHistory { messages: Vec<ChatMessageDto> },
    /// 解釈できない受信イベントへの応答
    InvalidEvent { message: String },

    // ----------------------------------------
    // ブロードキャスト（全接続向け）
    // ----------------------------------------
    PollCreated {
        poll: PollOverviewDto,
        stats: StatsDto,
    },
    PollStarted {
        poll: PollOverviewDto,
        stats: StatsDto,
    },
    PollEnded {
        results: PollResultsDto,
        stats: StatsDto,
    },
    ParticipantJoined {
        participant: ParticipantDto,
        stats: StatsDto,
    },
    ParticipantLeft {
        participant_id: String,
        name: String,
        stats: StatsDto,
    },
    ParticipantKicked {
        participant_id: String,
        name: String,
        reason: Option<String>,
        stats: StatsDto,
    },
    ResponseRecorded {
        results: PollResultsDto,
        stats: StatsDto,
    },
    ChatMessage { message: ChatMessageDto },
    ChatCleared,
}

impl ServerEvent {
    /// JSON 文字列に変換する
    ///
    /// 自前で定義した Serialize 可能な型なので失敗しない。
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ServerEvent should serialize")
    }
}

/// 投票の公開用スナップショット
#[derive(Debug, Clone, Serialize)]
pub struct PollOverviewDto {
    pub id: String,
    pub question_number: u64,
    pub question: String,
    pub options: Vec<String>,
    pub status: String,
    pub time_limit_secs: u64,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
}

/// 集計結果
#[derive(Debug, Clone, Serialize)]
pub struct PollResultsDto {
    pub question: String,
    pub options: Vec<String>,
    pub counts: Vec<usize>,
    pub percentages: Vec<u8>,
    pub total_responses: usize,
    pub roster_size: usize,
}

/// 派生統計
#[derive(Debug, Clone, Serialize)]
pub struct StatsDto {
    pub has_active_poll: bool,
    pub status: Option<String>,
    pub question_number: u64,
    pub roster_size: usize,
    pub response_count: usize,
    pub questions_asked: u64,
    pub participant_count: usize,
}

/// 参加者情報
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    pub role: String,
    pub connected: bool,
    pub joined_at: i64,
}

/// チャットメッセージ
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageDto {
    pub id: String,
    pub sender_role: String,
    pub sender_name: String,
    pub body: String,
    pub timestamp: i64,
}
