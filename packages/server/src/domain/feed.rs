//! メッセージ / 通知フィード
//!
//! チャットとシステム通知を時系列で保持する追記専用ログ。投票セッションとは
//! 独立したライフサイクルを持ち、容量を超えた分は古い方から捨てられる。
//! エントリは作成後に変更されない。

use std::collections::VecDeque;

use super::{
    entity::{ChatMessage, SenderRole},
    value_object::{MessageBody, MessageId, Timestamp},
};

/// システム通知の表示名
const SYSTEM_SENDER_NAME: &str = "System";

/// 容量つきの追記専用メッセージログ
#[derive(Debug)]
pub struct MessageFeed {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl MessageFeed {
    /// 指定した容量のフィードを作成
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// メッセージを追記する
    ///
    /// 本文の検証（空・長さ超過）は `MessageBody` の生成時に済んでいる。
    /// ID は UUID v4 なので、同一ミリ秒内の連続投稿でも衝突しない。
    pub fn post(
        &mut self,
        sender_role: SenderRole,
        sender_name: String,
        body: MessageBody,
        now: Timestamp,
    ) -> ChatMessage {
        let message = ChatMessage {
            id: MessageId::generate(),
            sender_role,
            sender_name,
            body: body.into_string(),
            timestamp: now,
        };
        self.messages.push_back(message.clone());
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
        message
    }

    /// システム通知を追記する
    ///
    /// クライアントが吹き出しではなくバナーとして描画できるよう、
    /// 送信者種別 `System` を付ける。本文の検証は行わない（サーバー内部発）。
    pub fn post_system(&mut self, text: String, now: Timestamp) -> ChatMessage {
        let message = ChatMessage {
            id: MessageId::generate(),
            sender_role: SenderRole::System,
            sender_name: SYSTEM_SENDER_NAME.to_string(),
            body: text,
            timestamp: now,
        };
        self.messages.push_back(message.clone());
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
        message
    }

    /// 保持中のメッセージを挿入順で返す
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    /// フィードを空にする
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
