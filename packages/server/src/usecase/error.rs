//! UseCase 層のエラー定義
//!
//! どのエラーも発信元へのエラー ACK に変換される。ブロードキャストはしない。

use thiserror::Error;

use crate::domain::{PollError, SubmitError, ValueObjectError};

/// 学生参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("invalid name: {0}")]
    InvalidName(#[from] ValueObjectError),

    #[error("name '{0}' is already taken")]
    NameTaken(String),
}

/// 投票作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreatePollError {
    #[error("invalid question: {0}")]
    InvalidQuestion(ValueObjectError),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] PollError),

    #[error("time limit must be between 1 and {max} seconds (got {actual})")]
    InvalidTimeLimit { max: u64, actual: u64 },
}

/// 回答受付開始のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartPollError {
    #[error("no poll is waiting to start")]
    NotStartable,
}

/// 回答送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitResponseError {
    #[error("connection has not joined as a student")]
    NotJoined,

    #[error(transparent)]
    Rejected(#[from] SubmitError),
}

/// 投票終了のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EndPollError {
    #[error("no active poll to end")]
    NoActivePoll,
}

/// 強制退出のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KickError {
    #[error("participant not found")]
    UnknownParticipant,
}

/// チャット送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] ValueObjectError),
}
