//! インメモリ Repository 実装

pub mod classroom;
pub mod history;

pub use classroom::InMemoryClassroomRepository;
pub use history::InMemoryPollHistoryRepository;
