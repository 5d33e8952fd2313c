//! Configuration defaults for the polling server.
//!
//! サーバー全体で使う設定値のデフォルト。ホスト・ポート・制限時間は
//! サーバーバイナリの CLI 引数で上書きできる。

/// Default poll time limit in seconds, used when poll creation omits one
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 60;

/// Upper bound on a poll's time limit in seconds
pub const MAX_TIME_LIMIT_SECS: u64 = 3600;

/// Minimum number of answer options a poll must offer
pub const MIN_OPTION_COUNT: usize = 2;

/// Maximum number of answer options a poll may offer
pub const MAX_OPTION_COUNT: usize = 10;

/// Maximum chat message length in characters (after trimming)
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Maximum participant display name length in characters (after trimming)
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum question text length in characters (after trimming)
pub const MAX_QUESTION_LENGTH: usize = 300;

/// Number of chat messages retained in the in-memory history
pub const CHAT_HISTORY_CAPACITY: usize = 100;

/// Advisory cooldown between system notices in milliseconds.
///
/// クライアント向けのヒント。サーバー側では強制しない。
pub const SYSTEM_MESSAGE_COOLDOWN_MS: u64 = 3000;
