//! Customer-service chat WebSocket endpoint.

use axum::{
    extract::{
        Path, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use tracing::instrument;

use ebookstore_core::OrderId;

use crate::chat::{self, ChatParticipant, ChatRejection, ChatRole};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::models::User;
use crate::state::AppState;

impl IntoResponse for ChatRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Anonymous | Self::Unauthorized(_) => StatusCode::FORBIDDEN.into_response(),
            Self::OrderNotFound(_) => StatusCode::NOT_FOUND.into_response(),
            Self::Repository(err) => AppError::Database(err).into_response(),
        }
    }
}

/// Authorize the connection, then upgrade and relay until it closes.
///
/// GET /ws/customer-service/{order_id}/
#[instrument(skip(ws, state, current))]
pub async fn connect(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
    Path(order_id): Path<i32>,
) -> Result<Response, ChatRejection> {
    let order_id = OrderId::new(order_id);

    // Roles are not cached in the session, so reload the account.
    let user = match current {
        Some(current) => UserRepository::new(state.pool())
            .get_by_id(current.id)
            .await?,
        None => None,
    };

    let role = chat::authorize(state.pool(), user.as_ref(), order_id).await?;
    let Some(user) = user else {
        return Err(ChatRejection::Anonymous);
    };
    let participant = participant(&user, order_id, role);

    Ok(ws.on_upgrade(move |socket| relay(socket, state, participant)))
}

fn participant(user: &User, order_id: OrderId, role: ChatRole) -> ChatParticipant {
    ChatParticipant {
        order_id,
        username: user.display_name(),
        email: user.email.to_string(),
        role,
    }
}

async fn relay(socket: WebSocket, state: AppState, participant: ChatParticipant) {
    let (outbound, inbound) = socket.split();
    chat::run(
        outbound,
        inbound,
        state.chat_hub(),
        state.presence(),
        state.config().chat.presence_ttl,
        &participant,
    )
    .await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ebookstore_core::StaffGroup;

    use super::*;
    use crate::models::user::tests::user;

    #[test]
    fn rejections_map_to_statuses() {
        assert_eq!(
            ChatRejection::Anonymous.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ChatRejection::Unauthorized("a@b.co".to_string())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ChatRejection::OrderNotFound(OrderId::new(3))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn participant_uses_full_name_then_email() {
        let mut staff = user(true, false, vec![StaffGroup::Employees]);
        let named = participant(&staff, OrderId::new(8), ChatRole::Employee);
        assert_eq!(named.username, "Wanjiru Kamau");
        assert_eq!(named.email, "staff@ebookstore.co.ke");

        staff.first_name.clear();
        staff.last_name.clear();
        let unnamed = participant(&staff, OrderId::new(8), ChatRole::Employee);
        assert_eq!(unnamed.username, "staff@ebookstore.co.ke");
    }
}
