//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::MessagePusher;
use crate::usecase::{
    ClearChatUseCase, CreatePollUseCase, DisconnectParticipantUseCase, EndPollUseCase,
    GetSnapshotUseCase, JoinStudentUseCase, KickParticipantUseCase, SendChatMessageUseCase,
    StartPollUseCase, SubmitResponseUseCase,
};

use super::deadline::PollDeadlineTimer;

/// Shared application state
///
/// WebSocket と HTTP の両ハンドラが同じユースケース群を消費する。
/// 状態機械が唯一の真実の源で、トランスポートアダプタはその入出力に徹する。
pub struct AppState {
    /// JoinStudentUseCase（学生参加のユースケース）
    pub join_student_usecase: Arc<JoinStudentUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// CreatePollUseCase（投票作成のユースケース）
    pub create_poll_usecase: Arc<CreatePollUseCase>,
    /// StartPollUseCase（回答受付開始のユースケース）
    pub start_poll_usecase: Arc<StartPollUseCase>,
    /// SubmitResponseUseCase（回答送信のユースケース）
    pub submit_response_usecase: Arc<SubmitResponseUseCase>,
    /// EndPollUseCase（投票終了のユースケース）
    pub end_poll_usecase: Arc<EndPollUseCase>,
    /// KickParticipantUseCase（強制退出のユースケース）
    pub kick_participant_usecase: Arc<KickParticipantUseCase>,
    /// SendChatMessageUseCase（チャット送信のユースケース）
    pub send_chat_message_usecase: Arc<SendChatMessageUseCase>,
    /// ClearChatUseCase（チャット履歴消去のユースケース）
    pub clear_chat_usecase: Arc<ClearChatUseCase>,
    /// GetSnapshotUseCase（スナップショット取得のユースケース）
    pub snapshot_usecase: Arc<GetSnapshotUseCase>,
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// 現在の投票の締め切りタイマー
    pub poll_deadline: Arc<PollDeadlineTimer>,
}
