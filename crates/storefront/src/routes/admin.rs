//! Admin route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::OrderStats;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Store-wide order figures.
#[instrument(skip_all, fields(admin_id = admin.admin_id().as_i32()))]
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<OrderStats>> {
    Ok(Json(state.order_service().stats(&admin).await?))
}
