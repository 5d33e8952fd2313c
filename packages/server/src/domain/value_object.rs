//! ドメイン層の値オブジェクト定義
//!
//! 不正な値がドメインに入り込まないよう、生成時に検証を行う。
//! ID 系は UUID v4 で生成し、同一ミリ秒内の連続生成でも衝突しない。

use std::fmt;

use uuid::Uuid;

use anketo_shared::config::{MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH, MAX_QUESTION_LENGTH};

use super::error::ValueObjectError;

/// 参加者 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// 新しい参加者 ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// 文字列表現からのパース（ワイヤ上の ID の復元用）
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// トランスポート接続 ID（WebSocket 接続ごとに一意）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい接続 ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 投票セッション ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollId(Uuid);

impl PollId {
    /// 新しい投票 ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// チャットメッセージ ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    /// 新しいメッセージ ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 参加者の表示名
///
/// 前後の空白は取り除く。空文字・長すぎる名前は拒否する。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantName(String);

impl ParticipantName {
    /// 新しい ParticipantName を作成
    pub fn new(raw: String) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyName);
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LENGTH {
            return Err(ValueObjectError::NameTooLong {
                max: MAX_NAME_LENGTH,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantName {
    type Error = ValueObjectError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// チャットメッセージ本文
///
/// 前後の空白は取り除く。空文字・500 文字超は拒否する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    /// 新しい MessageBody を作成
    pub fn new(raw: String) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyMessage);
        }
        let len = trimmed.chars().count();
        if len > MAX_MESSAGE_LENGTH {
            return Err(ValueObjectError::MessageTooLong {
                max: MAX_MESSAGE_LENGTH,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = ValueObjectError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// 投票の設問文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionText(String);

impl QuestionText {
    /// 新しい QuestionText を作成
    pub fn new(raw: String) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyQuestion);
        }
        let len = trimmed.chars().count();
        if len > MAX_QUESTION_LENGTH {
            return Err(ValueObjectError::QuestionTooLong {
                max: MAX_QUESTION_LENGTH,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for QuestionText {
    type Error = ValueObjectError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// Unix タイムスタンプ（JST、ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
