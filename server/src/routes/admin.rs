//! Admin console routes. Global admins only; the [`AdminUser`] extractor
//! rejects everyone else before a handler body runs.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::gate::AdminUser;
use crate::services::users::{self, UserQuery, UserRow};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleView {
    pub admin_id: String,
    pub admin_email: String,
    pub is_impersonating: bool,
    pub total_users: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UsersPage {
    pub users: Vec<UserRow>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// `GET /admin`
pub async fn console(State(state): State<AppState>, AdminUser(session): AdminUser) -> Result<Json<ConsoleView>, StatusCode> {
    let total_users = users::count_users(&state.pool, None).await.map_err(|e| {
        tracing::error!(error = %e, "admin console user count failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ConsoleView {
        is_impersonating: session.is_impersonating(),
        admin_id: session.user.id,
        admin_email: session.user.email,
        total_users,
    }))
}

/// `GET /admin/users?search=&limit=&offset=`
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<UsersParams>,
) -> Result<Json<UsersPage>, StatusCode> {
    let query = UserQuery::new(params.search.as_deref(), params.limit, params.offset);

    let rows = users::list_users(&state.pool, &query).await.map_err(|e| {
        tracing::error!(error = %e, "admin user list failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let total = users::count_users(&state.pool, query.search.as_deref()).await.map_err(|e| {
        tracing::error!(error = %e, "admin user count failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(UsersPage { users: rows, total, limit: query.limit, offset: query.offset }))
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
