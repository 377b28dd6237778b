use crate::error::{AppError, AppResult};
use crate::middleware::MaybeAuthUser;
use crate::models::{User, UserModel};
use crate::response::ApiResponse;
use crate::services::chatbot::{
    self, ChatSessions, ChatState, TicketLookup, Transition,
};
use crate::services::complaint::ComplaintService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    /// The bot's reply
    pub response: String,
    /// Quick-reply buttons to offer, if any
    pub options: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Bot reply", body = ChatResponse),
    ),
    tag = "chat"
)]
pub async fn chat(
    Extension(db): Extension<DatabaseConnection>,
    Extension(sessions): Extension<ChatSessions>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Json(payload): Json<ChatRequest>,
) -> AppResult<impl IntoResponse> {
    // A token for a since-deleted account counts as logged out.
    let user = match user_id {
        Some(id) => User::find_by_id(id).one(&db).await?,
        None => None,
    };

    let Some(user) = user else {
        // Anonymous flow never leaves Init, so there is no session.
        let transition = chatbot::step(ChatState::Init, &payload.message, false);
        return Ok(ApiResponse::ok(into_chat_response(transition)?));
    };

    let state = sessions.take(user.id);
    let transition = chatbot::step(state, &payload.message, true);
    let transition = resolve_effects(&db, &user, transition).await?;

    let Transition::Reply {
        next,
        response,
        options,
    } = transition
    else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "chat transition did not resolve to a reply"
        )));
    };

    sessions.put(user.id, next);
    Ok(ApiResponse::ok(ChatResponse { response, options }))
}

/// Execute any side effect a transition carries, yielding a plain reply.
async fn resolve_effects(
    db: &DatabaseConnection,
    user: &UserModel,
    transition: Transition,
) -> AppResult<Transition> {
    match transition {
        Transition::Submit { draft } => {
            let service = ComplaintService::new(db.clone());
            let result = service.create(&user.phone, draft.into()).await;
            Ok(submit_reply(result))
        }
        Transition::Lookup { ticket_id } => {
            let service = ComplaintService::new(db.clone());
            let outcome = match service.get(ticket_id).await {
                Ok(complaint) if complaint.user_phone == user.phone => TicketLookup::Owned {
                    status: complaint.status,
                },
                Ok(_) => TicketLookup::NotYours,
                Err(AppError::NotFound) => TicketLookup::NotFound,
                Err(e) => return Err(e),
            };
            Ok(chatbot::lookup_reply(ticket_id, outcome))
        }
        reply => Ok(reply),
    }
}

/// Turn the insert result into a reply. Failures discard the draft and
/// reset the conversation rather than surfacing an error to the widget.
fn submit_reply(result: AppResult<crate::models::ComplaintModel>) -> Transition {
    match result {
        Ok(saved) => chatbot::submitted_reply(saved.id),
        Err(e) => {
            tracing::error!("chatbot complaint insert failed: {}", e);
            chatbot::submit_failed_reply()
        }
    }
}

fn into_chat_response(transition: Transition) -> AppResult<ChatResponse> {
    let Transition::Reply {
        response, options, ..
    } = transition
    else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "anonymous chat produced a side effect"
        )));
    };
    Ok(ChatResponse { response, options })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplaintModel;
    use sea_orm::DbErr;

    fn saved_complaint(id: i32) -> ComplaintModel {
        ComplaintModel {
            id,
            user_phone: "9000000001".into(),
            name: "Ravi Kumar".into(),
            phone: "9000000001".into(),
            district: "Puri".into(),
            block: "Sadar".into(),
            gp: "Gp".into(),
            village: "Village".into(),
            landmark: "Landmark".into(),
            pincode: "752001".into(),
            department: "Water Supply".into(),
            complaint: "pipe burst".into(),
            proof: None,
            voice_proof: None,
            status: "Pending".into(),
            admin_proof: None,
            updated_at: None,
        }
    }

    #[test]
    fn successful_insert_replies_with_ticket_id() {
        let transition = submit_reply(Ok(saved_complaint(42)));
        let Transition::Reply { next, response, .. } = transition else {
            panic!("expected a reply");
        };
        assert_eq!(next, ChatState::Init);
        assert!(response.contains("#42"));
    }

    #[test]
    fn failed_insert_discards_draft_and_resets() {
        let err = AppError::Database(DbErr::Custom("connection reset".into()));
        let transition = submit_reply(Err(err));
        let Transition::Reply { next, response, .. } = transition else {
            panic!("expected a reply");
        };
        assert_eq!(next, ChatState::Init);
        assert!(response.contains("canceled this report"));
        assert!(!response.contains("connection reset"));
    }
}
