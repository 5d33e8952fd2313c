//! UseCase 層
//!
//! 受信イベント 1 種類につき 1 ユースケース。ドメイン層の trait
//! （Repository / MessagePusher）にのみ依存し、WebSocket や HTTP の
//! 具体には依存しない。両方のトランスポートアダプタが同じユースケースを
//! 呼ぶことで、状態機械が唯一の真実の源になる。

pub mod clear_chat;
pub mod create_poll;
pub mod disconnect_participant;
pub mod end_poll;
pub mod error;
pub mod join_student;
pub mod kick_participant;
pub mod send_chat_message;
pub mod snapshot;
pub mod start_poll;
pub mod submit_response;

pub use clear_chat::{ClearChatUseCase, ClearedChat};
pub use create_poll::{CreatePollUseCase, CreatedPoll};
pub use disconnect_participant::{DisconnectOutcome, DisconnectParticipantUseCase};
pub use end_poll::{EndPollUseCase, EndedPoll};
pub use error::{
    ChatError, CreatePollError, EndPollError, JoinError, KickError, StartPollError,
    SubmitResponseError,
};
pub use join_student::{JoinOutcome, JoinStudentUseCase};
pub use kick_participant::{KickOutcome, KickParticipantUseCase};
pub use send_chat_message::SendChatMessageUseCase;
pub use snapshot::{GetSnapshotUseCase, SessionSnapshot};
pub use start_poll::{StartPollUseCase, StartedPoll};
pub use submit_response::{SubmitResponseUseCase, SubmittedResponse};
