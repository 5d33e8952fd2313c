//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// POST /api/poll リクエストボディ
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub time_limit: Option<u64>,
}

/// 投票の詳細（タイムスタンプは JST RFC 3339）
#[derive(Debug, Clone, Serialize)]
pub struct PollDetailDto {
    pub id: String,
    pub question_number: u64,
    pub question: String,
    pub options: Vec<String>,
    pub status: String,
    pub time_limit_secs: u64,
    pub created_at: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

/// 集計結果のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct PollResultsResponse {
    pub question: String,
    pub options: Vec<String>,
    pub counts: Vec<usize>,
    pub percentages: Vec<u8>,
    pub total_responses: usize,
    pub roster_size: usize,
}

/// 確定済み投票の履歴レコード
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecordDto {
    pub poll_id: String,
    pub question_number: u64,
    pub question: String,
    pub options: Vec<String>,
    pub counts: Vec<usize>,
    pub total_participants: usize,
    pub completed_at: String,
}
