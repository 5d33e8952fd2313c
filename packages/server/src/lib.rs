//! Live classroom polling server library.
//!
//! This library provides the server implementation for anketo, a real-time
//! polling application: a teacher creates multiple-choice questions, students
//! submit answers over WebSocket, and everyone sees live aggregated results.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
