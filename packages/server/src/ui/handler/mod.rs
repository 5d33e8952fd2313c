//! WebSocket / HTTP handlers.

pub mod http;
pub mod websocket;
