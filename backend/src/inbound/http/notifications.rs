//! Notification inbox HTTP handlers.
//!
//! ```text
//! GET /api/notifications?unreadOnly=true&page=1&limit=20
//! POST /api/notifications {"type":"mention","message":"..."}
//! PUT /api/notifications {"notificationId":"...","action":"mark-read"}
//! DELETE /api/notifications?action=read
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::NotificationUpdateOutcome;
use crate::domain::{
    AnswerId, Error, NotificationAction, NotificationDetails, NotificationDraft, NotificationId,
    NotificationKind, NotificationListQuery, NotificationMessage, NotificationScope, QuestionId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::page_envelope::NotificationPagination;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, optional_uuid};

const NOTIFICATION_PAGE_LIMIT: u32 = 20;

/// Inbox listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
pub struct ListNotificationsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Only the literal `true` restricts the listing to unread entries.
    pub unread_only: Option<String>,
}

/// Inbox page plus the caller's overall unread total.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationDetails>,
    pub pagination: NotificationPagination,
    pub unread_count: u64,
}

/// Notification addressed to the caller.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    /// `answer`, `comment`, `mention` or `vote`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub related_question: Option<String>,
    pub related_answer: Option<String>,
}

/// Single-notification action, or `mark-all-read` without an id.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateNotificationRequest {
    pub notification_id: Option<String>,
    /// `mark-read`, `mark-unread`, `delete` or `mark-all-read`.
    pub action: Option<String>,
}

/// Bulk delete scope.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
pub struct DeleteNotificationsParams {
    /// `read` limits deletion to read notifications; anything else deletes all.
    pub action: Option<String>,
}

/// Result of a notification mutation.
///
/// `notification` accompanies read-flag changes and creation;
/// `updatedCount` accompanies mark-all-read.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMutationResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_count: Option<u64>,
}

impl NotificationMutationResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notification: None,
            updated_count: None,
        }
    }
}

impl From<NotificationUpdateOutcome> for NotificationMutationResponse {
    fn from(outcome: NotificationUpdateOutcome) -> Self {
        match outcome {
            NotificationUpdateOutcome::Updated(details) => Self {
                notification: Some(details),
                ..Self::message("Notification updated successfully")
            },
            NotificationUpdateOutcome::Deleted => Self::message("Notification deleted successfully"),
            NotificationUpdateOutcome::AllMarkedRead { updated_count } => Self {
                updated_count: Some(updated_count),
                ..Self::message("All notifications marked as read")
            },
        }
    }
}

/// Bulk delete result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNotificationsResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// Page the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(ListNotificationsParams),
    responses(
        (status = 200, description = "Notifications", body = NotificationListResponse),
        (status = 400, description = "Bad pagination", body = ErrorSchema),
        (status = 401, description = "Authentication required", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<ListNotificationsParams>,
) -> ApiResult<web::Json<NotificationListResponse>> {
    let user = session.require_user()?;
    let page = PageRequest::parse(
        params.page.as_deref(),
        params.limit.as_deref(),
        NOTIFICATION_PAGE_LIMIT,
    );
    let listing = state
        .notifications
        .list(NotificationListQuery {
            user_id: user.id().clone(),
            unread_only: params.unread_only.as_deref() == Some("true"),
            page,
        })
        .await?;
    Ok(web::Json(NotificationListResponse {
        notifications: listing.page.items,
        pagination: listing.page.info.into(),
        unread_count: listing.unread_count,
    }))
}

/// Store a notification for the caller.
#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = NotificationMutationResponse),
        (status = 400, description = "Invalid type or empty message", body = ErrorSchema),
        (status = 401, description = "Authentication required", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "createNotification"
)]
#[post("/notifications")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let payload = payload.into_inner();
    let kind = payload
        .kind
        .as_deref()
        .unwrap_or_default()
        .parse::<NotificationKind>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let message = NotificationMessage::new(payload.message.as_deref().unwrap_or_default())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let related_question = optional_uuid(
        payload.related_question.as_deref(),
        FieldName::new("relatedQuestion"),
    )?
    .map(QuestionId::from_uuid);
    let related_answer = optional_uuid(
        payload.related_answer.as_deref(),
        FieldName::new("relatedAnswer"),
    )?
    .map(AnswerId::from_uuid);

    let notification = state
        .notifications
        .create(NotificationDraft {
            recipient: user.id().clone(),
            kind,
            message,
            related_question,
            related_answer,
        })
        .await?;
    Ok(HttpResponse::Created().json(NotificationMutationResponse {
        notification: Some(notification),
        ..NotificationMutationResponse::message("Notification created successfully")
    }))
}

/// Mark, unmark or delete one notification, or mark all read.
#[utoipa::path(
    put,
    path = "/api/notifications",
    request_body = UpdateNotificationRequest,
    responses(
        (status = 200, description = "Action applied", body = NotificationMutationResponse),
        (status = 400, description = "Invalid action or missing id", body = ErrorSchema),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 404, description = "Notification not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "updateNotification"
)]
#[put("/notifications")]
pub async fn update_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateNotificationRequest>,
) -> ApiResult<web::Json<NotificationMutationResponse>> {
    let user = session.require_user()?;
    let payload = payload.into_inner();
    let action = payload
        .action
        .as_deref()
        .unwrap_or_default()
        .parse::<NotificationAction>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    // mark-all-read ignores the id, so a malformed one must not fail it.
    let notification_id = if action.needs_target() {
        optional_uuid(
            payload.notification_id.as_deref(),
            FieldName::new("notificationId"),
        )?
        .map(NotificationId::from_uuid)
    } else {
        None
    };
    let outcome = state
        .notifications
        .update(user, notification_id, action)
        .await?;
    Ok(web::Json(outcome.into()))
}

/// Delete the caller's notifications, optionally only the read ones.
#[utoipa::path(
    delete,
    path = "/api/notifications",
    params(DeleteNotificationsParams),
    responses(
        (status = 200, description = "Notifications deleted", body = DeleteNotificationsResponse),
        (status = 401, description = "Authentication required", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotifications"
)]
#[delete("/notifications")]
pub async fn delete_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<DeleteNotificationsParams>,
) -> ApiResult<web::Json<DeleteNotificationsResponse>> {
    let user = session.require_user()?;
    let scope = NotificationScope::from_query(params.action.as_deref());
    let deleted_count = state.notifications.delete_bulk(user, scope).await?;
    Ok(web::Json(DeleteNotificationsResponse {
        message: format!("Deleted {deleted_count} notifications successfully"),
        deleted_count,
    }))
}
