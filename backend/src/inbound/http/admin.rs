//! Admin maintenance endpoints.
//!
//! ```text
//! POST /api/admin/answers/reconcile
//! ```

use actix_web::{post, web};

use crate::domain::Error;
use crate::domain::ports::ReconciliationReport;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Re-append answers missing from their question's answer list.
#[utoipa::path(
    post,
    path = "/api/admin/answers/reconcile",
    responses(
        (status = 200, description = "Repair pass finished", body = ReconciliationReport),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "reconcileAnswerLinks"
)]
#[post("/admin/answers/reconcile")]
pub async fn reconcile_answer_links(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ReconciliationReport>> {
    let user = session.require_user()?;
    if !user.role().is_admin() {
        return Err(Error::forbidden("Admin role required"));
    }
    let report = state.answers.reconcile_links().await?;
    Ok(web::Json(report))
}
