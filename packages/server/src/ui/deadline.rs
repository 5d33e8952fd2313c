//! Poll deadline timer.
//!
//! 締め切りタイマーは「仕込んだ投票の通し番号」を覚えた tokio タスクとして
//! 走り、発火時に他の経路とまったく同じ `EndPollUseCase` に合流する。
//! 正しさは 2 段構えになっている:
//!
//! - キャンセル（新しい投票の作成・手動終了・全員回答）でタスクを abort する
//! - abort をすり抜けて発火しても、ドメイン層の通し番号ガードと
//!   「active からのみ end」の前提条件が no-op にする
//!
//! つまりキャンセルは衛生であって、正しさの根拠ではない。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::{broadcast::broadcast_poll_ended, state::AppState};

struct TimerEntry {
    epoch: u64,
    handle: JoinHandle<()>,
}

/// 現在の投票の締め切りタイマー（高々 1 本）
pub struct PollDeadlineTimer {
    entry: Mutex<Option<TimerEntry>>,
}

impl PollDeadlineTimer {
    /// 新しい（未装填の）タイマーを作成
    pub fn new() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }

    /// タイマータスクを差し替える（前のタスクは abort）
    fn store(&self, epoch: u64, handle: JoinHandle<()>) {
        let mut entry = self.entry.lock().expect("deadline timer lock poisoned");
        if let Some(previous) = entry.take() {
            previous.handle.abort();
        }
        *entry = Some(TimerEntry { epoch, handle });
    }

    /// 仕掛かり中のタイマーをキャンセルする
    ///
    /// 発火済み・未装填の場合も安全に呼べる。
    pub fn cancel(&self) {
        let mut entry = self.entry.lock().expect("deadline timer lock poisoned");
        if let Some(previous) = entry.take() {
            previous.handle.abort();
        }
    }

    /// 装填中のタイマーの通し番号（診断用）
    pub fn armed_epoch(&self) -> Option<u64> {
        let entry = self.entry.lock().expect("deadline timer lock poisoned");
        entry.as_ref().map(|e| e.epoch)
    }
}

impl Default for PollDeadlineTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// 指定した投票の締め切りタイマーを仕込む
///
/// 制限時間が経過すると `end` を試み、成立した場合だけ poll-ended を
/// ブロードキャストする。投票がすでに終了・置き換え済みなら何もしない。
pub fn arm_poll_deadline(state: Arc<AppState>, epoch: u64, time_limit_secs: u64) {
    let timer_state = state.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(time_limit_secs)).await;
        match timer_state.end_poll_usecase.execute(Some(epoch)).await {
            Ok(ended) => {
                tracing::info!("Poll (question #{}) ended by timeout", epoch);
                broadcast_poll_ended(&timer_state, &ended).await;
            }
            Err(_) => {
                tracing::debug!(
                    "Deadline timer for question #{} fired after the poll was settled",
                    epoch
                );
            }
        }
    });
    state.poll_deadline.store(epoch, handle);
}
