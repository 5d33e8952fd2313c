//! Data Transfer Objects (DTOs) for the polling application.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event DTOs (inbound and outbound)
//! - `http`: HTTP API request/response DTOs
//!
//! ドメインモデルをそのままワイヤに流さず、必ずここで定義した形に
//! 変換してから送信する（roster / ledger / タイマーは決して露出しない）。

pub mod conversion;
pub mod http;
pub mod websocket;
