//! ドメイン層
//!
//! 投票セッションの状態機械・参加者レジストリ・メッセージフィードと、
//! それらが外部に要求するインターフェース（Repository / MessagePusher）を
//! 定義する。tokio のタイマーや WebSocket には依存しない。

pub mod classroom;
pub mod entity;
pub mod error;
pub mod feed;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod results;
pub mod session;
pub mod value_object;

pub use classroom::Classroom;
pub use entity::{ChatMessage, FinalizedPoll, Participant, Role, SenderRole};
pub use error::{
    MessagePushError, PollError, RepositoryError, SubmitError, ValueObjectError,
};
pub use feed::MessageFeed;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::IdentityRegistry;
pub use repository::{ClassroomRepository, PollHistoryRepository};
pub use results::DerivedStats;
pub use session::{PollOverview, PollResults, PollSession, PollStatus, SubmitOutcome};
pub use value_object::{
    ConnectionId, MessageBody, MessageId, ParticipantId, ParticipantName, PollId, QuestionText,
    Timestamp,
};
