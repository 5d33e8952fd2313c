//! 投票セッションの状態機械
//!
//! ## 状態遷移
//!
//! ```text
//! waiting --start--> active --end--> ended
//! ```
//!
//! `create` は常に新しい waiting セッションを生成し、既存セッションを置き換える。
//! `end` は active からのみ成立し、1 セッションにつき 1 回だけ `FinalizedPoll` を返す。
//! タイムアウト・手動終了・全員回答の 3 経路はすべてこの `end` に合流する。
//!
//! ## 不変条件
//!
//! - ledger のキー集合は roster のキー集合の部分集合
//! - ledger にエントリがある参加者の roster フラグは true
//! - options は 2 件以上、回答インデックスは 0 <= index < options.len()

use std::collections::HashMap;

use anketo_shared::config::{MAX_OPTION_COUNT, MIN_OPTION_COUNT};

use super::{
    entity::FinalizedPoll,
    error::{PollError, SubmitError},
    results,
    value_object::{ParticipantId, PollId, QuestionText, Timestamp},
};

/// 投票セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Waiting,
    Active,
    Ended,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollStatus::Waiting => "waiting",
            PollStatus::Active => "active",
            PollStatus::Ended => "ended",
        }
    }
}

/// 公開用スナップショット
///
/// roster / ledger / タイマーなどの内部構造を含まない。ブロードキャストには
/// 必ずこの形（か `PollResults`）を使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOverview {
    pub id: PollId,
    pub epoch: u64,
    pub question: String,
    pub options: Vec<String>,
    pub status: PollStatus,
    pub time_limit_secs: u64,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
}

/// 集計結果のスナップショット
///
/// 誰も選んでいない選択肢も 0 件として必ず含まれる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResults {
    pub question: String,
    pub options: Vec<String>,
    pub counts: Vec<usize>,
    pub percentages: Vec<u8>,
    pub total_responses: usize,
    pub roster_size: usize,
}

/// 回答受理の結果
///
/// `results` は記録と同じクリティカルセクションの中で再計算した集計
/// スナップショット。ブロードキャスト用にそのまま使える。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub option_index: usize,
    pub response_count: usize,
    pub roster_size: usize,
    pub results: PollResults,
    /// 全員回答による自動終了が起きた場合のみ Some
    pub finalized: Option<FinalizedPoll>,
}

/// 投票セッション
///
/// roster（参加者 → 回答済みフラグ）と ledger（参加者 → 選択肢インデックス）を
/// 所有する。両コレクションの整合性はこの型のメソッド経由でのみ変化する。
#[derive(Debug, Clone)]
pub struct PollSession {
    id: PollId,
    epoch: u64,
    question: QuestionText,
    options: Vec<String>,
    time_limit_secs: u64,
    status: PollStatus,
    created_at: Timestamp,
    started_at: Option<Timestamp>,
    ended_at: Option<Timestamp>,
    roster: HashMap<ParticipantId, bool>,
    ledger: HashMap<ParticipantId, usize>,
}

impl PollSession {
    /// 新しい waiting 状態のセッションを作成
    ///
    /// 選択肢は前後の空白を除去して保持する。2 件未満・上限超過・空ラベルは
    /// `PollError` として拒否する。
    pub fn new(
        epoch: u64,
        question: QuestionText,
        options: Vec<String>,
        time_limit_secs: u64,
        created_at: Timestamp,
    ) -> Result<Self, PollError> {
        if options.len() < MIN_OPTION_COUNT {
            return Err(PollError::NotEnoughOptions {
                min: MIN_OPTION_COUNT,
                actual: options.len(),
            });
        }
        if options.len() > MAX_OPTION_COUNT {
            return Err(PollError::TooManyOptions {
                max: MAX_OPTION_COUNT,
                actual: options.len(),
            });
        }
        let mut trimmed = Vec::with_capacity(options.len());
        for label in options {
            let label = label.trim().to_string();
            if label.is_empty() {
                return Err(PollError::EmptyOptionLabel);
            }
            trimmed.push(label);
        }

        Ok(Self {
            id: PollId::generate(),
            epoch,
            question,
            options: trimmed,
            time_limit_secs,
            status: PollStatus::Waiting,
            created_at,
            started_at: None,
            ended_at: None,
            roster: HashMap::new(),
            ledger: HashMap::new(),
        })
    }

    pub fn id(&self) -> PollId {
        self.id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_secs
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    pub fn response_count(&self) -> usize {
        self.ledger.len()
    }

    /// roster に参加者を登録する（未回答として）
    ///
    /// すでに登録済みなら false を返す。
    pub fn register(&mut self, participant_id: ParticipantId) -> bool {
        if self.roster.contains_key(&participant_id) {
            return false;
        }
        self.roster.insert(participant_id, false);
        true
    }

    /// 回答受付を開始する
    ///
    /// waiting からのみ成立する。2 回目以降の呼び出しは false。
    pub fn start(&mut self, now: Timestamp) -> bool {
        if self.status != PollStatus::Waiting {
            return false;
        }
        self.status = PollStatus::Active;
        self.started_at = Some(now);
        true
    }

    /// 回答を記録する
    ///
    /// 記録の結果、roster が空でなく全員が回答済みになった場合は同じ呼び出しの
    /// 中で `end` まで遷移させる。チェックと遷移を 1 ステップで行うことで、
    /// 「最後の 1 人」を同時に競う 2 つの回答が二重に終了を起こすことはない。
    pub fn submit_response(
        &mut self,
        participant_id: ParticipantId,
        option_index: usize,
        now: Timestamp,
    ) -> Result<SubmitOutcome, SubmitError> {
        if self.status != PollStatus::Active {
            return Err(SubmitError::PollNotActive);
        }
        let Some(answered) = self.roster.get(&participant_id) else {
            return Err(SubmitError::UnknownParticipant);
        };
        if *answered {
            return Err(SubmitError::AlreadyAnswered);
        }
        if option_index >= self.options.len() {
            return Err(SubmitError::OptionOutOfRange {
                index: option_index,
                option_count: self.options.len(),
            });
        }

        self.ledger.insert(participant_id, option_index);
        self.roster.insert(participant_id, true);

        let finalized = if !self.roster.is_empty() && self.ledger.len() == self.roster.len() {
            self.end(now)
        } else {
            None
        };

        Ok(SubmitOutcome {
            option_index,
            response_count: self.ledger.len(),
            roster_size: self.roster.len(),
            results: self.results(),
            finalized,
        })
    }

    /// 投票を終了する
    ///
    /// active からのみ成立し、そのとき 1 回だけ `FinalizedPoll` を返す。
    /// waiting / ended からの呼び出し（発火済みタイマーの再入を含む）は None。
    pub fn end(&mut self, now: Timestamp) -> Option<FinalizedPoll> {
        if self.status != PollStatus::Active {
            return None;
        }
        self.status = PollStatus::Ended;
        self.ended_at = Some(now);

        Some(FinalizedPoll {
            poll_id: self.id,
            epoch: self.epoch,
            question: self.question.as_str().to_string(),
            options: self.options.clone(),
            counts: results::tally(self.ledger.values().copied(), self.options.len()),
            total_participants: self.roster.len(),
            completed_at: now,
        })
    }

    /// 参加者を roster と ledger から取り除く
    ///
    /// 切断・強制退出用。未回答者の除去で roster が「全員回答済み」になっても
    /// 自動終了は起こさない。
    pub fn remove_participant(&mut self, participant_id: &ParticipantId) -> bool {
        let removed = self.roster.remove(participant_id).is_some();
        self.ledger.remove(participant_id);
        removed
    }

    /// 集計結果のスナップショットを作成（毎回再計算）
    pub fn results(&self) -> PollResults {
        let counts = results::tally(self.ledger.values().copied(), self.options.len());
        let percentages = results::percentages(&counts);
        PollResults {
            question: self.question.as_str().to_string(),
            options: self.options.clone(),
            total_responses: self.ledger.len(),
            roster_size: self.roster.len(),
            counts,
            percentages,
        }
    }

    /// 公開用スナップショットを作成
    pub fn overview(&self) -> PollOverview {
        PollOverview {
            id: self.id,
            epoch: self.epoch,
            question: self.question.as_str().to_string(),
            options: self.options.clone(),
            status: self.status,
            time_limit_secs: self.time_limit_secs,
            created_at: self.created_at,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        assert!(self.ledger.len() <= self.roster.len());
        for (id, _) in self.ledger.iter() {
            assert_eq!(self.roster.get(id), Some(&true));
        }
    }
}
