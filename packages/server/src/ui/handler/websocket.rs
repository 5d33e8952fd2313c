//! WebSocket connection handlers.
//!
//! ここが受信イベントのルータになる。イベント名をユースケース呼び出しに
//! 束ね、結果を「発信元への ACK 1 つ＋（共有状態が変わった場合）全接続への
//! ブロードキャスト」に展開する。ワイヤに流すのは DTO のみ。

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessagePusher, ParticipantId, SenderRole},
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::{
        broadcast::{broadcast_poll_created, broadcast_poll_ended, broadcast_poll_started},
        deadline::arm_poll_deadline,
        state::AppState,
    },
};

/// 接続が自己申告した役割（接続ローカルの状態）
enum ConnectionRole {
    Unjoined,
    Teacher,
    Student { name: String },
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // 接続 ID はサーバー側で採番する。参加者の同一性は join イベントで決まる
    let connection_id = ConnectionId::generate();
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_connection(connection_id, tx)
        .await;

    // Send the current session snapshot to the newly connected client
    {
        let snapshot = state.snapshot_usecase.session_state().await;
        let event = ServerEvent::SessionState {
            poll: snapshot.poll.map(Into::into),
            stats: snapshot.stats.into(),
            participants: snapshot.participants.into_iter().map(Into::into).collect(),
            chat_history: snapshot.chat_history.into_iter().map(Into::into).collect(),
        };
        if let Err(e) = sender.send(Message::Text(event.to_json().into())).await {
            tracing::error!(
                "Failed to send session state to connection '{}': {}",
                connection_id,
                e
            );
            state
                .message_pusher
                .unregister_connection(&connection_id)
                .await;
            return;
        }
        tracing::info!("Sent session state to connection '{}'", connection_id);
    }

    let recv_state = state.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        let mut role = ConnectionRole::Unjoined;
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_event(&recv_state, connection_id, &mut role, &text).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to receive messages from other clients and send to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Disconnect cleanup: registry / roster removal + departure fan-out.
    // 強制退出済みの接続はレジストリにレコードがないため None になり、
    // 退出のブロードキャストは二重に流れない。
    match state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await
    {
        Some(outcome) => {
            tracing::info!(
                "Participant '{}' disconnected and removed",
                outcome.participant.name.as_str()
            );

            let left_event = ServerEvent::ParticipantLeft {
                participant_id: outcome.participant.id.to_string(),
                name: outcome.participant.name.as_str().to_string(),
                stats: outcome.stats.into(),
            };
            state.message_pusher.broadcast_all(&left_event.to_json()).await;

            let notice_event = ServerEvent::ChatMessage {
                message: outcome.notice.into(),
            };
            state
                .message_pusher
                .broadcast_all(&notice_event.to_json())
                .await;
        }
        None => {
            tracing::debug!(
                "Connection '{}' closed without a registry record",
                connection_id
            );
        }
    }
}

/// 発信元への直接応答（ACK）を送る
async fn push(state: &AppState, connection_id: &ConnectionId, event: ServerEvent) {
    if let Err(e) = state
        .message_pusher
        .push_to(connection_id, &event.to_json())
        .await
    {
        tracing::warn!("Failed to push ack to connection '{}': {}", connection_id, e);
    }
}

/// 受信イベント 1 件を処理する
///
/// どの状態変更イベントにも ACK がちょうど 1 つ対応する。ブロードキャストは
/// 状態が実際に変わった場合のみ。
async fn handle_event(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    role: &mut ConnectionRole,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse event as JSON: {}", e);
            push(
                state,
                &connection_id,
                ServerEvent::InvalidEvent {
                    message: format!("unrecognized event: {e}"),
                },
            )
            .await;
            return;
        }
    };

    match event {
        ClientEvent::JoinAsStudent { name } => {
            if !matches!(role, ConnectionRole::Unjoined) {
                push(
                    state,
                    &connection_id,
                    ServerEvent::JoinError {
                        message: "connection has already joined".to_string(),
                    },
                )
                .await;
                return;
            }

            match state
                .join_student_usecase
                .execute(connection_id, name)
                .await
            {
                Ok(outcome) => {
                    *role = ConnectionRole::Student {
                        name: outcome.participant.name.as_str().to_string(),
                    };
                    tracing::info!(
                        "Student '{}' joined on connection '{}'",
                        outcome.participant.name.as_str(),
                        connection_id
                    );

                    push(
                        state,
                        &connection_id,
                        ServerEvent::JoinSuccess {
                            participant: Some(outcome.participant.clone().into()),
                            poll: outcome.poll.map(Into::into),
                            stats: outcome.stats.into(),
                        },
                    )
                    .await;

                    let joined_event = ServerEvent::ParticipantJoined {
                        participant: outcome.participant.into(),
                        stats: outcome.stats.into(),
                    };
                    state
                        .message_pusher
                        .broadcast_all(&joined_event.to_json())
                        .await;

                    let notice_event = ServerEvent::ChatMessage {
                        message: outcome.notice.into(),
                    };
                    state
                        .message_pusher
                        .broadcast_all(&notice_event.to_json())
                        .await;
                }
                Err(e) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::JoinError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::JoinAsTeacher => {
            if !matches!(role, ConnectionRole::Unjoined) {
                push(
                    state,
                    &connection_id,
                    ServerEvent::JoinError {
                        message: "connection has already joined".to_string(),
                    },
                )
                .await;
                return;
            }

            *role = ConnectionRole::Teacher;
            tracing::info!("Teacher joined on connection '{}'", connection_id);

            let snapshot = state.snapshot_usecase.session_state().await;
            push(
                state,
                &connection_id,
                ServerEvent::JoinSuccess {
                    participant: None,
                    poll: snapshot.poll.map(Into::into),
                    stats: snapshot.stats.into(),
                },
            )
            .await;
        }

        ClientEvent::CreatePoll {
            question,
            options,
            time_limit,
        } => {
            if !matches!(role, ConnectionRole::Teacher) {
                push(
                    state,
                    &connection_id,
                    ServerEvent::CreatePollError {
                        message: "only the teacher can create a poll".to_string(),
                    },
                )
                .await;
                return;
            }

            match state
                .create_poll_usecase
                .execute(question, options, time_limit)
                .await
            {
                Ok(created) => {
                    // 前の投票のタイマーが残っていても新しい投票には触れないが、
                    // 無駄撃ちさせない
                    state.poll_deadline.cancel();

                    push(
                        state,
                        &connection_id,
                        ServerEvent::CreatePollSuccess {
                            poll: created.overview.clone().into(),
                        },
                    )
                    .await;
                    broadcast_poll_created(state, &created).await;

                    // create-poll は作成と同時に回答受付を開始する
                    match state.start_poll_usecase.execute().await {
                        Ok(started) => {
                            arm_poll_deadline(
                                state.clone(),
                                started.overview.epoch,
                                started.overview.time_limit_secs,
                            );
                            broadcast_poll_started(state, &started).await;
                        }
                        Err(e) => {
                            // 直後の作り直しと競合した場合のみ到達する
                            tracing::warn!("Failed to auto-start created poll: {}", e);
                        }
                    }
                }
                Err(e) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::CreatePollError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::StartPoll => {
            if !matches!(role, ConnectionRole::Teacher) {
                push(
                    state,
                    &connection_id,
                    ServerEvent::StartPollError {
                        message: "only the teacher can start a poll".to_string(),
                    },
                )
                .await;
                return;
            }

            match state.start_poll_usecase.execute().await {
                Ok(started) => {
                    arm_poll_deadline(
                        state.clone(),
                        started.overview.epoch,
                        started.overview.time_limit_secs,
                    );
                    push(
                        state,
                        &connection_id,
                        ServerEvent::StartPollSuccess {
                            poll: started.overview.clone().into(),
                        },
                    )
                    .await;
                    broadcast_poll_started(state, &started).await;
                }
                Err(e) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::StartPollError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::EndPoll => {
            if !matches!(role, ConnectionRole::Teacher) {
                push(
                    state,
                    &connection_id,
                    ServerEvent::EndPollError {
                        message: "only the teacher can end a poll".to_string(),
                    },
                )
                .await;
                return;
            }

            match state.end_poll_usecase.execute(None).await {
                Ok(ended) => {
                    state.poll_deadline.cancel();
                    push(
                        state,
                        &connection_id,
                        ServerEvent::EndPollSuccess {
                            results: ended.results.clone().into(),
                        },
                    )
                    .await;
                    broadcast_poll_ended(state, &ended).await;
                }
                Err(e) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::EndPollError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::SubmitResponse { option_index } => {
            match state
                .submit_response_usecase
                .execute(&connection_id, option_index)
                .await
            {
                Ok(submitted) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::SubmitResponseSuccess {
                            option_index: submitted.option_index,
                        },
                    )
                    .await;

                    let recorded_event = ServerEvent::ResponseRecorded {
                        results: submitted.results.into(),
                        stats: submitted.stats.into(),
                    };
                    state
                        .message_pusher
                        .broadcast_all(&recorded_event.to_json())
                        .await;

                    // 全員回答で終了した場合はここが最後の経路になる
                    if let Some(ended) = submitted.ended {
                        state.poll_deadline.cancel();
                        broadcast_poll_ended(state, &ended).await;
                    }
                }
                Err(e) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::SubmitResponseError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::GetPollStatus => {
            let (poll, stats) = state.snapshot_usecase.poll_status().await;
            push(
                state,
                &connection_id,
                ServerEvent::PollStatus {
                    poll: poll.map(Into::into),
                    stats: stats.into(),
                },
            )
            .await;
        }

        ClientEvent::GetResults => {
            let (results, stats) = state.snapshot_usecase.results().await;
            push(
                state,
                &connection_id,
                ServerEvent::Results {
                    results: results.map(Into::into),
                    stats: stats.into(),
                },
            )
            .await;
        }

        ClientEvent::SendChatMessage { message } => {
            let (sender_role, sender_name) = match role {
                ConnectionRole::Teacher => (SenderRole::Teacher, "Teacher".to_string()),
                ConnectionRole::Student { name } => (SenderRole::Student, name.clone()),
                ConnectionRole::Unjoined => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::SendChatMessageError {
                            message: "join before sending chat messages".to_string(),
                        },
                    )
                    .await;
                    return;
                }
            };

            match state
                .send_chat_message_usecase
                .execute(sender_role, sender_name, message)
                .await
            {
                Ok(chat_message) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::SendChatMessageSuccess {
                            message: chat_message.clone().into(),
                        },
                    )
                    .await;

                    let chat_event = ServerEvent::ChatMessage {
                        message: chat_message.into(),
                    };
                    state
                        .message_pusher
                        .broadcast_all(&chat_event.to_json())
                        .await;
                }
                Err(e) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::SendChatMessageError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::GetChatHistory => {
            let messages = state.snapshot_usecase.chat_history().await;
            push(
                state,
                &connection_id,
                ServerEvent::ChatHistory {
                    messages: messages.into_iter().map(Into::into).collect(),
                },
            )
            .await;
        }

        ClientEvent::KickParticipant {
            participant_id,
            reason,
        } => {
            if !matches!(role, ConnectionRole::Teacher) {
                push(
                    state,
                    &connection_id,
                    ServerEvent::KickParticipantError {
                        message: "only the teacher can kick participants".to_string(),
                    },
                )
                .await;
                return;
            }

            let Some(target_id) = ParticipantId::parse(&participant_id) else {
                push(
                    state,
                    &connection_id,
                    ServerEvent::KickParticipantError {
                        message: "participant not found".to_string(),
                    },
                )
                .await;
                return;
            };

            match state
                .kick_participant_usecase
                .execute(&target_id, reason)
                .await
            {
                Ok(outcome) => {
                    let kicked_event = ServerEvent::ParticipantKicked {
                        participant_id: outcome.participant.id.to_string(),
                        name: outcome.participant.name.as_str().to_string(),
                        reason: outcome.reason.clone(),
                        stats: outcome.stats.into(),
                    };

                    // 本人への個別通知 → 接続クローズ → 全体ブロードキャスト。
                    // この順序なら本人が自分の removal を二重に見ることはない。
                    state
                        .kick_participant_usecase
                        .deliver_notice_and_close(
                            &outcome.participant.connection_id,
                            &kicked_event.to_json(),
                        )
                        .await;

                    push(
                        state,
                        &connection_id,
                        ServerEvent::KickParticipantSuccess {
                            participant_id: outcome.participant.id.to_string(),
                        },
                    )
                    .await;

                    state
                        .message_pusher
                        .broadcast_all(&kicked_event.to_json())
                        .await;

                    let notice_event = ServerEvent::ChatMessage {
                        message: outcome.notice.into(),
                    };
                    state
                        .message_pusher
                        .broadcast_all(&notice_event.to_json())
                        .await;
                }
                Err(e) => {
                    push(
                        state,
                        &connection_id,
                        ServerEvent::KickParticipantError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientEvent::ClearChat => {
            if !matches!(role, ConnectionRole::Teacher) {
                push(
                    state,
                    &connection_id,
                    ServerEvent::ClearChatError {
                        message: "only the teacher can clear the chat".to_string(),
                    },
                )
                .await;
                return;
            }

            let cleared = state.clear_chat_usecase.execute().await;
            push(state, &connection_id, ServerEvent::ClearChatSuccess).await;

            state
                .message_pusher
                .broadcast_all(&ServerEvent::ChatCleared.to_json())
                .await;

            let notice_event = ServerEvent::ChatMessage {
                message: cleared.notice.into(),
            };
            state
                .message_pusher
                .broadcast_all(&notice_event.to_json())
                .await;
        }
    }
}
