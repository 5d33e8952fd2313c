//! インメモリ Classroom Repository 実装
//!
//! ドメイン層が定義する ClassroomRepository trait の具体的な実装。
//! `Classroom` 集約全体を 1 つの `tokio::sync::Mutex` で包み、trait の
//! 1 メソッド呼び出しを 1 クリティカルセクションとして実行する。
//! 状態の変更はすべてロック取得中に同期的に完了し、await をまたがない。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use anketo_shared::time::Clock;

use crate::domain::{
    ChatMessage, Classroom, ClassroomRepository, ConnectionId, DerivedStats, FinalizedPoll,
    MessageBody, Participant, ParticipantId, ParticipantName, PollError, PollOverview, PollResults,
    QuestionText, SenderRole, SubmitError, SubmitOutcome, Timestamp,
};

/// インメモリ Classroom Repository 実装
pub struct InMemoryClassroomRepository {
    classroom: Arc<Mutex<Classroom>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryClassroomRepository {
    /// 新しい InMemoryClassroomRepository を作成
    pub fn new(classroom: Arc<Mutex<Classroom>>, clock: Arc<dyn Clock>) -> Self {
        Self { classroom, clock }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_jst_millis())
    }
}

#[async_trait]
impl ClassroomRepository for InMemoryClassroomRepository {
    async fn create_poll(
        &self,
        question: QuestionText,
        options: Vec<String>,
        time_limit_secs: u64,
    ) -> Result<PollOverview, PollError> {
        let now = self.now();
        let mut classroom = self.classroom.lock().await;
        classroom.create_poll(question, options, time_limit_secs, now)
    }

    async fn start_poll(&self) -> Option<PollOverview> {
        let now = self.now();
        let mut classroom = self.classroom.lock().await;
        classroom.start_poll(now)
    }

    async fn submit_response(
        &self,
        participant_id: ParticipantId,
        option_index: usize,
    ) -> Result<SubmitOutcome, SubmitError> {
        let now = self.now();
        let mut classroom = self.classroom.lock().await;
        classroom.submit_response(participant_id, option_index, now)
    }

    async fn end_poll(&self, expected_epoch: Option<u64>) -> Option<FinalizedPoll> {
        let now = self.now();
        let mut classroom = self.classroom.lock().await;
        classroom.end_poll(expected_epoch, now)
    }

    async fn join_student(
        &self,
        connection_id: ConnectionId,
        name: ParticipantName,
    ) -> Option<Participant> {
        let now = self.now();
        let mut classroom = self.classroom.lock().await;
        classroom.join_student(connection_id, name, now)
    }

    async fn remove_participant(&self, participant_id: &ParticipantId) -> Option<Participant> {
        let mut classroom = self.classroom.lock().await;
        classroom.remove_participant(participant_id)
    }

    async fn remove_by_connection(&self, connection_id: &ConnectionId) -> Option<Participant> {
        let mut classroom = self.classroom.lock().await;
        classroom.remove_by_connection(connection_id)
    }

    async fn participant_by_connection(&self, connection_id: &ConnectionId) -> Option<Participant> {
        let classroom = self.classroom.lock().await;
        classroom.participant_by_connection(connection_id)
    }

    async fn participants(&self) -> Vec<Participant> {
        let classroom = self.classroom.lock().await;
        classroom.participants()
    }

    async fn poll_overview(&self) -> Option<PollOverview> {
        let classroom = self.classroom.lock().await;
        classroom.poll_overview()
    }

    async fn poll_results(&self) -> Option<PollResults> {
        let classroom = self.classroom.lock().await;
        classroom.poll_results()
    }

    async fn derived_stats(&self) -> DerivedStats {
        let classroom = self.classroom.lock().await;
        classroom.derived_stats()
    }

    async fn post_message(
        &self,
        sender_role: SenderRole,
        sender_name: String,
        body: MessageBody,
    ) -> ChatMessage {
        let now = self.now();
        let mut classroom = self.classroom.lock().await;
        classroom.post_message(sender_role, sender_name, body, now)
    }

    async fn post_system_notice(&self, text: String) -> ChatMessage {
        let now = self.now();
        let mut classroom = self.classroom.lock().await;
        classroom.post_system_notice(text, now)
    }

    async fn chat_history(&self) -> Vec<ChatMessage> {
        let classroom = self.classroom.lock().await;
        classroom.chat_history()
    }

    async fn clear_chat(&self) {
        let mut classroom = self.classroom.lock().await;
        classroom.clear_chat();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anketo_shared::time::FixedClock;

    fn create_test_repository() -> InMemoryClassroomRepository {
        InMemoryClassroomRepository::new(
            Arc::new(Mutex::new(Classroom::new())),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        )
    }

    fn name(raw: &str) -> ParticipantName {
        ParticipantName::new(raw.to_string()).unwrap()
    }

    fn question(raw: &str) -> QuestionText {
        QuestionText::new(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_student_success() {
        // テスト項目: 学生を登録すると参加者リストに反映される
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let result = repo
            .join_student(ConnectionId::generate(), name("alice"))
            .await;

        // then (期待する結果):
        assert!(result.is_some());
        let participants = repo.participants().await;
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].name.as_str(), "alice");
        assert_eq!(participants[0].joined_at.value(), 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_submit_records_and_auto_ends_in_one_call() {
        // テスト項目: 記録と全員回答チェックが 1 回の呼び出しで完結する
        // given (前提条件):
        let repo = create_test_repository();
        let alice = repo
            .join_student(ConnectionId::generate(), name("alice"))
            .await
            .unwrap();
        repo.create_poll(question("2+2?"), vec!["3".to_string(), "4".to_string()], 30)
            .await
            .unwrap();
        repo.start_poll().await.unwrap();

        // when (操作):
        let outcome = repo.submit_response(alice.id, 1).await.unwrap();

        // then (期待する結果):
        assert!(outcome.finalized.is_some());
        let results = repo.poll_results().await.unwrap();
        assert_eq!(results.counts, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_system_notice_appended_to_history() {
        // テスト項目: システム通知がチャット履歴に追記される
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        repo.post_system_notice("alice joined the classroom".to_string())
            .await;

        // then (期待する結果):
        let history = repo.chat_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sender_role, SenderRole::System);
    }
}
