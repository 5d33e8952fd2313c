//! Infrastructure 層
//!
//! ドメイン層が定義するインターフェースの具体的な実装（インメモリ
//! Repository、WebSocket MessagePusher）と、ワイヤ上の表現（DTO）を置く。

pub mod dto;
pub mod message_pusher;
pub mod repository;
