//! Identity Registry
//!
//! セッションスコープ（プロセス寿命）の参加者台帳。投票の作り直しをまたいで
//! 生存し、「この接続は誰か」をチャットやモデレーションのために解決する。
//! 投票の roster とは独立している。

use std::collections::HashMap;

use super::{
    entity::{Participant, Role},
    value_object::{ConnectionId, ParticipantId, ParticipantName, Timestamp},
};

/// 接続中の参加者の台帳
///
/// 不変条件: 接続 ID ごとに高々 1 レコード。表示名はレコードが存在する限り
/// （connected フラグに関係なく）占有される。
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    participants: HashMap<ParticipantId, Participant>,
}

impl IdentityRegistry {
    /// 新しい空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 参加者を登録する
    ///
    /// 表示名の衝突（大文字小文字を区別）または接続 ID の重複は None。
    pub fn add(
        &mut self,
        connection_id: ConnectionId,
        name: ParticipantName,
        role: Role,
        joined_at: Timestamp,
    ) -> Option<Participant> {
        let name_taken = self
            .participants
            .values()
            .any(|p| p.name.as_str() == name.as_str());
        if name_taken {
            return None;
        }
        let connection_taken = self
            .participants
            .values()
            .any(|p| p.connection_id == connection_id);
        if connection_taken {
            return None;
        }

        let participant = Participant::new(name, role, connection_id, joined_at);
        self.participants.insert(participant.id, participant.clone());
        Some(participant)
    }

    /// 参加者をレジストリから取り除く
    ///
    /// 取り除かれた時点で表示名は解放され、再利用できる。
    pub fn remove(&mut self, participant_id: &ParticipantId) -> Option<Participant> {
        self.participants.remove(participant_id)
    }

    /// 接続 ID で参加者を取り除く（切断時のクリーンアップ用）
    pub fn remove_by_connection(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let id = self
            .participants
            .values()
            .find(|p| p.connection_id == *connection_id)
            .map(|p| p.id)?;
        self.participants.remove(&id)
    }

    /// 参加者 ID で検索
    pub fn lookup_by_id(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(participant_id)
    }

    /// 接続 ID で検索
    pub fn lookup_by_connection(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants
            .values()
            .find(|p| p.connection_id == *connection_id)
    }

    /// 接続フラグを更新する
    ///
    /// 該当する参加者がいなければ false。
    pub fn set_connected(&mut self, connection_id: &ConnectionId, connected: bool) -> bool {
        for participant in self.participants.values_mut() {
            if participant.connection_id == *connection_id {
                participant.connected = connected;
                return true;
            }
        }
        false
    }

    /// 全参加者のリスト（表示名でソート済み）
    pub fn list_all(&self) -> Vec<Participant> {
        let mut all: Vec<Participant> = self.participants.values().cloned().collect();
        // Sort by name for consistent ordering
        all.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        all
    }

    /// 接続中の参加者のリスト（表示名でソート済み）
    pub fn list_connected(&self) -> Vec<Participant> {
        let mut connected: Vec<Participant> = self
            .participants
            .values()
            .filter(|p| p.connected)
            .cloned()
            .collect();
        connected.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        connected
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
