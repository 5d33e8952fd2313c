//! Conversion logic between DTOs and domain entities.

use anketo_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{
    ChatMessage, DerivedStats, FinalizedPoll, Participant, PollOverview, PollResults, PollStatus,
    Role, SenderRole,
};

use super::{http, websocket as dto};

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Teacher => "teacher",
        Role::Student => "student",
    }
}

fn sender_role_label(role: SenderRole) -> &'static str {
    match role {
        SenderRole::Teacher => "teacher",
        SenderRole::Student => "student",
        SenderRole::System => "system",
    }
}

fn status_label(status: PollStatus) -> String {
    status.as_str().to_string()
}

// ========================================
// Domain Model → WebSocket DTO
// ========================================

impl From<PollOverview> for dto::PollOverviewDto {
    fn from(model: PollOverview) -> Self {
        Self {
            id: model.id.to_string(),
            question_number: model.epoch,
            question: model.question,
            options: model.options,
            status: status_label(model.status),
            time_limit_secs: model.time_limit_secs,
            created_at: model.created_at.value(),
            started_at: model.started_at.map(|t| t.value()),
            ended_at: model.ended_at.map(|t| t.value()),
        }
    }
}

impl From<PollResults> for dto::PollResultsDto {
    fn from(model: PollResults) -> Self {
        Self {
            question: model.question,
            options: model.options,
            counts: model.counts,
            percentages: model.percentages,
            total_responses: model.total_responses,
            roster_size: model.roster_size,
        }
    }
}

impl From<DerivedStats> for dto::StatsDto {
    fn from(model: DerivedStats) -> Self {
        Self {
            has_active_poll: model.has_active_poll,
            status: model.status.map(status_label),
            question_number: model.question_number,
            roster_size: model.roster_size,
            response_count: model.response_count,
            questions_asked: model.questions_asked,
            participant_count: model.participant_count,
        }
    }
}

impl From<Participant> for dto::ParticipantDto {
    fn from(model: Participant) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name.into_string(),
            role: role_label(model.role).to_string(),
            connected: model.connected,
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<ChatMessage> for dto::ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.to_string(),
            sender_role: sender_role_label(model.sender_role).to_string(),
            sender_name: model.sender_name,
            body: model.body,
            timestamp: model.timestamp.value(),
        }
    }
}

// ========================================
// Domain Model → HTTP DTO
// ========================================

impl From<PollOverview> for http::PollDetailDto {
    fn from(model: PollOverview) -> Self {
        Self {
            id: model.id.to_string(),
            question_number: model.epoch,
            question: model.question,
            options: model.options,
            status: status_label(model.status),
            time_limit_secs: model.time_limit_secs,
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
            started_at: model.started_at.map(|t| timestamp_to_jst_rfc3339(t.value())),
            ended_at: model.ended_at.map(|t| timestamp_to_jst_rfc3339(t.value())),
        }
    }
}

impl From<PollResults> for http::PollResultsResponse {
    fn from(model: PollResults) -> Self {
        Self {
            question: model.question,
            options: model.options,
            counts: model.counts,
            percentages: model.percentages,
            total_responses: model.total_responses,
            roster_size: model.roster_size,
        }
    }
}

impl From<FinalizedPoll> for http::HistoryRecordDto {
    fn from(model: FinalizedPoll) -> Self {
        Self {
            poll_id: model.poll_id.to_string(),
            question_number: model.epoch,
            question: model.question,
            options: model.options,
            counts: model.counts,
            total_participants: model.total_participants,
            completed_at: timestamp_to_jst_rfc3339(model.completed_at.value()),
        }
    }
}
