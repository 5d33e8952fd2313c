//! Broadcast helpers shared by the WebSocket router, the HTTP handlers and
//! the deadline timer.
//!
//! 投票のライフサイクルイベントは複数の経路（WebSocket イベント・HTTP・
//! タイマー発火）から起きるが、ワイヤに流す形はここで一元化する。

use super::state::AppState;
use crate::domain::MessagePusher;
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::usecase::{CreatedPoll, EndedPoll, StartedPoll};

/// poll-created を全接続にブロードキャストする
pub async fn broadcast_poll_created(state: &AppState, created: &CreatedPoll) {
    let event = ServerEvent::PollCreated {
        poll: created.overview.clone().into(),
        stats: created.stats.into(),
    };
    state.message_pusher.broadcast_all(&event.to_json()).await;
}

/// poll-started を全接続にブロードキャストする
pub async fn broadcast_poll_started(state: &AppState, started: &StartedPoll) {
    let event = ServerEvent::PollStarted {
        poll: started.overview.clone().into(),
        stats: started.stats.into(),
    };
    state.message_pusher.broadcast_all(&event.to_json()).await;
}

/// poll-ended と終了のシステム通知を全接続にブロードキャストする
///
/// `EndedPoll` は 1 セッションにつき 1 回しか生まれないため（ドメイン層の
/// 保証）、タイムアウト・手動終了・全員回答のどの経路でもこのブロード
/// キャストは投票ごとにちょうど 1 回になる。
pub async fn broadcast_poll_ended(state: &AppState, ended: &EndedPoll) {
    let event = ServerEvent::PollEnded {
        results: ended.results.clone().into(),
        stats: ended.stats.into(),
    };
    state.message_pusher.broadcast_all(&event.to_json()).await;

    let notice_event = ServerEvent::ChatMessage {
        message: ended.notice.clone().into(),
    };
    state.message_pusher.broadcast_all(&notice_event.to_json()).await;
}
