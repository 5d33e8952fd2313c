//! Classroom 集約
//!
//! プロセスごとに 1 つだけ存在する共有状態の集約ルート。投票セッション
//! （高々 1 つ）・Identity Registry・メッセージフィード・累計質問数を所有し、
//! 複数コレクションにまたがる操作（参加、退出、投票の作り直し）の整合性を
//! このメソッド経由でのみ変化させる。
//!
//! Repository 実装は Classroom 全体を 1 つの Mutex で包み、1 メソッド呼び出しを
//! 1 クリティカルセクションとして実行する。

use anketo_shared::config::CHAT_HISTORY_CAPACITY;

use super::{
    entity::{ChatMessage, FinalizedPoll, Participant, Role, SenderRole},
    error::{PollError, SubmitError},
    feed::MessageFeed,
    registry::IdentityRegistry,
    results::{self, DerivedStats},
    session::{PollOverview, PollResults, PollSession, SubmitOutcome},
    value_object::{ConnectionId, MessageBody, ParticipantId, ParticipantName, QuestionText, Timestamp},
};

/// 教室の共有状態
#[derive(Debug)]
pub struct Classroom {
    session: Option<PollSession>,
    registry: IdentityRegistry,
    feed: MessageFeed,
    questions_asked: u64,
}

impl Classroom {
    /// 新しい空の教室を作成
    pub fn new() -> Self {
        Self {
            session: None,
            registry: IdentityRegistry::new(),
            feed: MessageFeed::new(CHAT_HISTORY_CAPACITY),
            questions_asked: 0,
        }
    }

    // ----------------------------------------
    // 投票セッション
    // ----------------------------------------

    /// 新しい投票を waiting 状態で作成し、既存の投票を置き換える
    ///
    /// 既存セッションのライブ状態は破棄される（確定済みデータは確定時点で
    /// 履歴ストアに渡っている）。roster は接続中の学生で初期化するので、
    /// 投票より先に参加していた学生も全員回答の勘定に入る。
    pub fn create_poll(
        &mut self,
        question: QuestionText,
        options: Vec<String>,
        time_limit_secs: u64,
        now: Timestamp,
    ) -> Result<PollOverview, PollError> {
        let epoch = self.questions_asked + 1;
        let mut session = PollSession::new(epoch, question, options, time_limit_secs, now)?;
        for student in self.registry.list_connected() {
            session.register(student.id);
        }
        self.questions_asked = epoch;
        let overview = session.overview();
        self.session = Some(session);
        Ok(overview)
    }

    /// 現在の投票の回答受付を開始する
    ///
    /// セッションがない、または waiting でない場合は None。
    pub fn start_poll(&mut self, now: Timestamp) -> Option<PollOverview> {
        let session = self.session.as_mut()?;
        if !session.start(now) {
            return None;
        }
        Some(session.overview())
    }

    /// 回答を記録する（全員回答なら同一ステップで自動終了）
    pub fn submit_response(
        &mut self,
        participant_id: ParticipantId,
        option_index: usize,
        now: Timestamp,
    ) -> Result<SubmitOutcome, SubmitError> {
        let Some(session) = self.session.as_mut() else {
            return Err(SubmitError::NoPoll);
        };
        session.submit_response(participant_id, option_index, now)
    }

    /// 投票を終了する
    ///
    /// `expected_epoch` が指定され、現在のセッションの通し番号と一致しない
    /// 場合は何もしない（置き換え前の投票のタイマーが後続の投票を終了させる
    /// ことはない）。active でなければ None。
    pub fn end_poll(&mut self, expected_epoch: Option<u64>, now: Timestamp) -> Option<FinalizedPoll> {
        let session = self.session.as_mut()?;
        if let Some(expected) = expected_epoch {
            if session.epoch() != expected {
                return None;
            }
        }
        session.end(now)
    }

    // ----------------------------------------
    // 参加者
    // ----------------------------------------

    /// 学生として参加する
    ///
    /// レジストリへの登録と roster への追加を 1 ステップで行う。
    /// 表示名の衝突は None（例外ではなく失敗値）。
    pub fn join_student(
        &mut self,
        connection_id: ConnectionId,
        name: ParticipantName,
        now: Timestamp,
    ) -> Option<Participant> {
        let participant = self.registry.add(connection_id, name, Role::Student, now)?;
        if let Some(session) = self.session.as_mut() {
            session.register(participant.id);
        }
        Some(participant)
    }

    /// 参加者をレジストリと roster の両方から取り除く（強制退出用）
    pub fn remove_participant(&mut self, participant_id: &ParticipantId) -> Option<Participant> {
        let participant = self.registry.remove(participant_id)?;
        if let Some(session) = self.session.as_mut() {
            session.remove_participant(participant_id);
        }
        Some(participant)
    }

    /// 接続 ID で参加者を取り除く（切断時のクリーンアップ用）
    ///
    /// 強制退出済みの接続が後から切断イベントを流しても、レジストリに
    /// レコードがないため None になり、二重の退出通知は起きない。
    pub fn remove_by_connection(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let participant = self.registry.remove_by_connection(connection_id)?;
        if let Some(session) = self.session.as_mut() {
            session.remove_participant(&participant.id);
        }
        Some(participant)
    }

    /// 接続 ID で参加者を検索
    pub fn participant_by_connection(&self, connection_id: &ConnectionId) -> Option<Participant> {
        self.registry.lookup_by_connection(connection_id).cloned()
    }

    /// 全参加者のリスト（表示名でソート済み）
    pub fn participants(&self) -> Vec<Participant> {
        self.registry.list_all()
    }

    // ----------------------------------------
    // スナップショット
    // ----------------------------------------

    /// 現在の投票の公開用スナップショット
    pub fn poll_overview(&self) -> Option<PollOverview> {
        self.session.as_ref().map(|s| s.overview())
    }

    /// 現在の投票の集計結果（毎回再計算）
    pub fn poll_results(&self) -> Option<PollResults> {
        self.session.as_ref().map(|s| s.results())
    }

    /// 派生統計（毎回再計算）
    pub fn derived_stats(&self) -> DerivedStats {
        results::derived_stats(
            self.session.as_ref(),
            self.questions_asked,
            self.registry.len(),
        )
    }

    // ----------------------------------------
    // チャット
    // ----------------------------------------

    /// チャットメッセージを投稿する
    pub fn post_message(
        &mut self,
        sender_role: SenderRole,
        sender_name: String,
        body: MessageBody,
        now: Timestamp,
    ) -> ChatMessage {
        self.feed.post(sender_role, sender_name, body, now)
    }

    /// システム通知を投稿する
    pub fn post_system_notice(&mut self, text: String, now: Timestamp) -> ChatMessage {
        self.feed.post_system(text, now)
    }

    /// チャット履歴を挿入順で返す
    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.feed.history()
    }

    /// チャット履歴を空にする
    pub fn clear_chat(&mut self) {
        self.feed.clear();
    }
}

impl Default for Classroom {
    fn default() -> Self {
        Self::new()
    }
}
