//! Live classroom polling server.
//!
//! A teacher creates multiple-choice questions, students join and answer in
//! real time over WebSocket, and everyone sees live aggregated results.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin anketo-server
//! cargo run --bin anketo-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::sync::Mutex;

use anketo_server::{
    domain::Classroom,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryClassroomRepository, InMemoryPollHistoryRepository},
    },
    ui::{Server, deadline::PollDeadlineTimer, state::AppState},
    usecase::{
        ClearChatUseCase, CreatePollUseCase, DisconnectParticipantUseCase, EndPollUseCase,
        GetSnapshotUseCase, JoinStudentUseCase, KickParticipantUseCase, SendChatMessageUseCase,
        StartPollUseCase, SubmitResponseUseCase,
    },
};
use anketo_shared::{config::DEFAULT_TIME_LIMIT_SECS, logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "anketo-server")]
#[command(about = "Live classroom polling server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Default poll time limit in seconds, used when poll creation omits one
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_SECS)]
    time_limit: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher
    // 3. UseCases
    // 4. AppState
    // 5. Server

    // 1. Create repositories (in-memory)
    let classroom = Arc::new(Mutex::new(Classroom::new()));
    let repository = Arc::new(InMemoryClassroomRepository::new(
        classroom,
        Arc::new(SystemClock),
    ));
    let history_repository = Arc::new(InMemoryPollHistoryRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let end_poll_usecase = Arc::new(EndPollUseCase::new(
        repository.clone(),
        history_repository.clone(),
    ));
    let join_student_usecase = Arc::new(JoinStudentUseCase::new(repository.clone()));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let create_poll_usecase = Arc::new(CreatePollUseCase::new(repository.clone(), args.time_limit));
    let start_poll_usecase = Arc::new(StartPollUseCase::new(repository.clone()));
    let submit_response_usecase = Arc::new(SubmitResponseUseCase::new(
        repository.clone(),
        end_poll_usecase.clone(),
    ));
    let kick_participant_usecase = Arc::new(KickParticipantUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let send_chat_message_usecase = Arc::new(SendChatMessageUseCase::new(repository.clone()));
    let clear_chat_usecase = Arc::new(ClearChatUseCase::new(repository.clone()));
    let snapshot_usecase = Arc::new(GetSnapshotUseCase::new(
        repository.clone(),
        history_repository.clone(),
    ));

    // 4. Create AppState
    let state = Arc::new(AppState {
        join_student_usecase,
        disconnect_participant_usecase,
        create_poll_usecase,
        start_poll_usecase,
        submit_response_usecase,
        end_poll_usecase,
        kick_participant_usecase,
        send_chat_message_usecase,
        clear_chat_usecase,
        snapshot_usecase,
        message_pusher,
        poll_deadline: Arc::new(PollDeadlineTimer::new()),
    });

    // 5. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
