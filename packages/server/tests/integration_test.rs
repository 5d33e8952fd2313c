//! Integration tests driving the polling server over real WebSockets.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};

use anketo_server::{
    domain::Classroom,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryClassroomRepository, InMemoryPollHistoryRepository},
    },
    ui::{Server, deadline::PollDeadlineTimer, state::AppState},
    usecase::{
        ClearChatUseCase, CreatePollUseCase, DisconnectParticipantUseCase, EndPollUseCase,
        GetSnapshotUseCase, JoinStudentUseCase, KickParticipantUseCase, SendChatMessageUseCase,
        StartPollUseCase, SubmitResponseUseCase,
    },
};
use anketo_shared::time::SystemClock;

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Start an in-process server on an ephemeral port and return its address
async fn start_test_server() -> std::net::SocketAddr {
    let repository = Arc::new(InMemoryClassroomRepository::new(
        Arc::new(Mutex::new(Classroom::new())),
        Arc::new(SystemClock),
    ));
    let history_repository = Arc::new(InMemoryPollHistoryRepository::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    let end_poll_usecase = Arc::new(EndPollUseCase::new(
        repository.clone(),
        history_repository.clone(),
    ));
    let state = Arc::new(AppState {
        join_student_usecase: Arc::new(JoinStudentUseCase::new(repository.clone())),
        disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        create_poll_usecase: Arc::new(CreatePollUseCase::new(repository.clone(), 60)),
        start_poll_usecase: Arc::new(StartPollUseCase::new(repository.clone())),
        submit_response_usecase: Arc::new(SubmitResponseUseCase::new(
            repository.clone(),
            end_poll_usecase.clone(),
        )),
        end_poll_usecase,
        kick_participant_usecase: Arc::new(KickParticipantUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        send_chat_message_usecase: Arc::new(SendChatMessageUseCase::new(repository.clone())),
        clear_chat_usecase: Arc::new(ClearChatUseCase::new(repository.clone())),
        snapshot_usecase: Arc::new(GetSnapshotUseCase::new(repository, history_repository)),
        message_pusher,
        poll_deadline: Arc::new(PollDeadlineTimer::new()),
    });

    let app = Server::router(state);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    addr
}

/// Connect a WebSocket client to the test server
async fn connect(addr: std::net::SocketAddr) -> WsClient {
    let (ws, _response) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("failed to connect");
    ws
}

/// Send an event as JSON
async fn send_event(ws: &mut WsClient, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .expect("failed to send event");
}

/// Receive events until one with the given type arrives (skipping others)
async fn wait_for_event(ws: &mut WsClient, event_type: &str) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for '{event_type}'"))
            .unwrap_or_else(|| panic!("connection closed while waiting for '{event_type}'"))
            .expect("websocket error");
        if let Message::Text(text) = msg {
            let value: Value = serde_json::from_str(text.as_str()).expect("invalid JSON event");
            if value["type"] == event_type {
                return value;
            }
        }
    }
}

#[tokio::test]
async fn test_connection_receives_session_state() {
    // テスト項目: 接続直後に session-state スナップショットが届く
    // given (前提条件):
    let addr = start_test_server().await;

    // when (操作):
    let mut ws = connect(addr).await;

    // then (期待する結果):
    let snapshot = wait_for_event(&mut ws, "session-state").await;
    assert_eq!(snapshot["poll"], Value::Null);
    assert_eq!(snapshot["stats"]["participant_count"], 0);
}

#[tokio::test]
async fn test_student_join_success_and_broadcast() {
    // テスト項目: 学生の参加が ACK され、参加ブロードキャストが流れる
    // given (前提条件):
    let addr = start_test_server().await;
    let mut alice = connect(addr).await;
    wait_for_event(&mut alice, "session-state").await;

    // when (操作):
    send_event(&mut alice, json!({"type": "join-as-student", "name": "alice"})).await;

    // then (期待する結果): ACK とブロードキャストの両方が届く
    let ack = wait_for_event(&mut alice, "join-success").await;
    assert_eq!(ack["participant"]["name"], "alice");
    let joined = wait_for_event(&mut alice, "participant-joined").await;
    assert_eq!(joined["stats"]["participant_count"], 1);
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    // テスト項目: 使用中の表示名での参加が join-error になる
    // given (前提条件):
    let addr = start_test_server().await;
    let mut first = connect(addr).await;
    wait_for_event(&mut first, "session-state").await;
    send_event(&mut first, json!({"type": "join-as-student", "name": "bob"})).await;
    wait_for_event(&mut first, "join-success").await;

    let mut second = connect(addr).await;
    wait_for_event(&mut second, "session-state").await;

    // when (操作):
    send_event(&mut second, json!({"type": "join-as-student", "name": "bob"})).await;

    // then (期待する結果):
    let error = wait_for_event(&mut second, "join-error").await;
    assert!(
        error["message"]
            .as_str()
            .expect("message should be a string")
            .contains("already taken")
    );
}

#[tokio::test]
async fn test_basic_poll_flow_with_auto_end() {
    // テスト項目: 作成 → 回答 → 全員回答による自動終了の基本フロー
    // given (前提条件):
    let addr = start_test_server().await;

    let mut teacher = connect(addr).await;
    wait_for_event(&mut teacher, "session-state").await;
    send_event(&mut teacher, json!({"type": "join-as-teacher"})).await;
    wait_for_event(&mut teacher, "join-success").await;

    let mut alice = connect(addr).await;
    wait_for_event(&mut alice, "session-state").await;
    send_event(&mut alice, json!({"type": "join-as-student", "name": "alice"})).await;
    wait_for_event(&mut alice, "join-success").await;

    // when (操作): 教師が投票を作成し、alice が回答する
    send_event(
        &mut teacher,
        json!({
            "type": "create-poll",
            "question": "2+2?",
            "options": ["3", "4"],
            "time_limit": 30,
        }),
    )
    .await;
    wait_for_event(&mut teacher, "create-poll-success").await;
    wait_for_event(&mut alice, "poll-started").await;

    send_event(&mut alice, json!({"type": "submit-response", "option_index": 1})).await;

    // then (期待する結果): 回答の ACK、集計ブロードキャスト、自動終了が届く
    wait_for_event(&mut alice, "submit-response-success").await;
    let recorded = wait_for_event(&mut alice, "response-recorded").await;
    assert_eq!(recorded["results"]["counts"], json!([0, 1]));

    let ended = wait_for_event(&mut teacher, "poll-ended").await;
    assert_eq!(ended["results"]["counts"], json!([0, 1]));
    assert_eq!(ended["results"]["total_responses"], 1);
}

#[tokio::test]
async fn test_poll_times_out_without_responses() {
    // テスト項目: 回答がないまま制限時間が過ぎると poll-ended が届く
    // given (前提条件):
    let addr = start_test_server().await;
    let mut teacher = connect(addr).await;
    wait_for_event(&mut teacher, "session-state").await;
    send_event(&mut teacher, json!({"type": "join-as-teacher"})).await;
    wait_for_event(&mut teacher, "join-success").await;

    let mut alice = connect(addr).await;
    wait_for_event(&mut alice, "session-state").await;
    send_event(&mut alice, json!({"type": "join-as-student", "name": "alice"})).await;
    wait_for_event(&mut alice, "join-success").await;

    // when (操作): 制限時間 1 秒の投票を作成し、誰も回答しない
    send_event(
        &mut teacher,
        json!({
            "type": "create-poll",
            "question": "slow?",
            "options": ["yes", "no"],
            "time_limit": 1,
        }),
    )
    .await;
    wait_for_event(&mut teacher, "poll-started").await;

    // then (期待する結果): クライアントから end を送らなくても終了する
    let ended = wait_for_event(&mut teacher, "poll-ended").await;
    assert_eq!(ended["results"]["counts"], json!([0, 0]));
    assert_eq!(ended["stats"]["has_active_poll"], false);
}

#[tokio::test]
async fn test_kick_closes_connection_and_broadcasts_once() {
    // テスト項目: 強制退出で本人に個別通知が届いて接続が閉じ、
    //             退出ブロードキャストが二重に流れない
    // given (前提条件):
    let addr = start_test_server().await;

    let mut teacher = connect(addr).await;
    wait_for_event(&mut teacher, "session-state").await;
    send_event(&mut teacher, json!({"type": "join-as-teacher"})).await;
    wait_for_event(&mut teacher, "join-success").await;

    let mut alice = connect(addr).await;
    wait_for_event(&mut alice, "session-state").await;
    send_event(&mut alice, json!({"type": "join-as-student", "name": "alice"})).await;
    let alice_ack = wait_for_event(&mut alice, "join-success").await;
    let alice_id = alice_ack["participant"]["id"]
        .as_str()
        .expect("participant id should be a string")
        .to_string();

    let mut bob = connect(addr).await;
    wait_for_event(&mut bob, "session-state").await;
    send_event(&mut bob, json!({"type": "join-as-student", "name": "bob"})).await;
    wait_for_event(&mut bob, "join-success").await;

    // when (操作): 教師が alice を強制退出させる
    send_event(
        &mut teacher,
        json!({
            "type": "kick-participant",
            "participant_id": alice_id,
            "reason": "disruptive",
        }),
    )
    .await;

    // then (期待する結果): 本人に個別の participant-kicked が届き、接続が閉じる
    let kicked_notice = wait_for_event(&mut alice, "participant-kicked").await;
    assert_eq!(kicked_notice["name"], "alice");
    loop {
        match tokio::time::timeout(Duration::from_secs(5), alice.next())
            .await
            .expect("timed out waiting for close")
        {
            None | Some(Ok(Message::Close(_))) => break,
            Some(Ok(_)) => continue,
            Some(Err(_)) => break,
        }
    }

    // 残りの参加者には participant-kicked が 1 回だけ届く
    wait_for_event(&mut bob, "participant-kicked").await;

    // alice の切断クリーンアップが participant-left を流していないことを、
    // 後続のチャットイベントまでの間に確認する
    send_event(&mut bob, json!({"type": "send-chat-message", "message": "still here"})).await;
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), bob.next())
            .await
            .expect("timed out waiting for chat message")
            .expect("connection closed unexpectedly")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            let value: Value = serde_json::from_str(text.as_str()).expect("invalid JSON event");
            assert_ne!(
                value["type"], "participant-left",
                "kicked participant must not produce a second departure broadcast"
            );
            if value["type"] == "chat-message" && value["message"]["body"] == "still here" {
                break;
            }
        }
    }
}

#[tokio::test]
async fn test_chat_message_broadcast_to_everyone() {
    // テスト項目: チャットメッセージが発信元を含む全接続に届く
    // given (前提条件):
    let addr = start_test_server().await;

    let mut alice = connect(addr).await;
    wait_for_event(&mut alice, "session-state").await;
    send_event(&mut alice, json!({"type": "join-as-student", "name": "alice"})).await;
    wait_for_event(&mut alice, "join-success").await;

    let mut bob = connect(addr).await;
    wait_for_event(&mut bob, "session-state").await;
    send_event(&mut bob, json!({"type": "join-as-student", "name": "bob"})).await;
    wait_for_event(&mut bob, "join-success").await;

    // when (操作):
    send_event(&mut alice, json!({"type": "send-chat-message", "message": "Hello!"})).await;

    // then (期待する結果): 発信元にも他の参加者にも届く
    let ack = wait_for_event(&mut alice, "send-chat-message-success").await;
    assert_eq!(ack["message"]["body"], "Hello!");
    let on_bob = wait_for_event(&mut bob, "chat-message").await;
    assert_eq!(on_bob["message"]["sender_name"], "alice");
    assert_eq!(on_bob["message"]["sender_role"], "student");
}

#[tokio::test]
async fn test_leaving_student_produces_departure_broadcast() {
    // テスト項目: 学生の切断で participant-left が届く
    // given (前提条件):
    let addr = start_test_server().await;

    let mut alice = connect(addr).await;
    wait_for_event(&mut alice, "session-state").await;
    send_event(&mut alice, json!({"type": "join-as-student", "name": "alice"})).await;
    wait_for_event(&mut alice, "join-success").await;

    let mut bob = connect(addr).await;
    wait_for_event(&mut bob, "session-state").await;
    send_event(&mut bob, json!({"type": "join-as-student", "name": "bob"})).await;
    wait_for_event(&mut bob, "join-success").await;

    // when (操作): alice が接続を閉じる
    alice.close(None).await.expect("failed to close");

    // then (期待する結果):
    let left = wait_for_event(&mut bob, "participant-left").await;
    assert_eq!(left["name"], "alice");
    assert_eq!(left["stats"]["participant_count"], 1);
}
