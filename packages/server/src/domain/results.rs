//! 集計ロジック（Response Aggregator）
//!
//! 状態を持たない純粋関数のみを置く。結果はクエリのたびに ledger から
//! 再計算され、キャッシュしない。

use super::session::{PollSession, PollStatus};

/// 選択肢インデックスごとの回答数を数える（0 埋め）
///
/// 範囲外のインデックスは無視する。ledger 側の検証で範囲外は入らない前提。
pub fn tally(responses: impl IntoIterator<Item = usize>, option_count: usize) -> Vec<usize> {
    let mut counts = vec![0usize; option_count];
    for index in responses {
        if let Some(slot) = counts.get_mut(index) {
            *slot += 1;
        }
    }
    counts
}

/// 回答数から整数パーセンテージを計算する
///
/// 四捨五入。合計が 0 のときは全て 0%。
pub fn percentages(counts: &[usize]) -> Vec<u8> {
    let total: usize = counts.iter().sum();
    counts
        .iter()
        .map(|&count| {
            if total == 0 {
                0
            } else {
                ((count * 100 + total / 2) / total) as u8
            }
        })
        .collect()
}

/// 最多得票の選択肢インデックスを返す
///
/// 同数の場合はインデックスの小さい方（first-occurrence-wins）。
/// 全選択肢が 0 件、または選択肢がない場合は None。
pub fn leading_option(counts: &[usize]) -> Option<usize> {
    let mut leading: Option<(usize, usize)> = None;
    for (index, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match leading {
            Some((_, best)) if count <= best => {}
            _ => leading = Some((index, count)),
        }
    }
    leading.map(|(index, _)| index)
}

/// ブロードキャストに添える派生統計
///
/// クライアントが差分イベントだけから状態を推測しなくて済むよう、
/// すべての状態変化ブロードキャストに含める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStats {
    pub has_active_poll: bool,
    pub status: Option<PollStatus>,
    /// 現在のセッションの通し番号（セッションがなければ 0）
    pub question_number: u64,
    pub roster_size: usize,
    pub response_count: usize,
    /// これまでに作成された投票の累計
    pub questions_asked: u64,
    /// Identity Registry 上の参加者数
    pub participant_count: usize,
}

/// 現在のセッションとレジストリ状態から派生統計を計算する
pub fn derived_stats(
    session: Option<&PollSession>,
    questions_asked: u64,
    participant_count: usize,
) -> DerivedStats {
    DerivedStats {
        has_active_poll: session.map(|s| s.status() == PollStatus::Active).unwrap_or(false),
        status: session.map(|s| s.status()),
        question_number: session.map(|s| s.epoch()).unwrap_or(0),
        roster_size: session.map(|s| s.roster_size()).unwrap_or(0),
        response_count: session.map(|s| s.response_count()).unwrap_or(0),
        questions_asked,
        participant_count,
    }
}
