//! メッセージ送信（通知）のインターフェース
//!
//! ドメイン層が必要とするトランスポートへの抽象。具体的な実装
//! （WebSocket など）は Infrastructure 層が提供する（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// 接続ごとの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ送信の抽象
///
/// - `push_to`: 特定の接続への直接送信（ACK・個別通知用）
/// - `broadcast_all`: 全接続への送信（発信元を含む fan-out 用）
/// - `unregister_connection`: 送信チャンネルの破棄。WebSocket 実装では
///   これが接続のクローズにつながる（強制退出で使う）。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録する
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続を登録解除する（送信チャンネルを破棄する）
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信する
    async fn push_to(&self, connection_id: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// 全接続にメッセージをブロードキャストする
    ///
    /// 一部の接続への送信失敗は許容する（ベストエフォート）。
    async fn broadcast_all(&self, content: &str);

    /// 登録中の接続数を返す
    async fn connection_count(&self) -> usize;
}
