use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::state::AppState;
use super::{map_error, ErrorResponse};
use crate::pagination::{paginate, OrderSpec, Page, PaginationRequest, USERS_QUERY_COLS};
use crate::repo::FindOverrides;
use crate::users::{NewUser, User, UsersRepository};

/// Request structure for registering a new user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<User>>, (StatusCode, Json<ErrorResponse>)> {
    let request =
        PaginationRequest::from_query_pairs(pairs, state.default_take).map_err(map_error)?;

    let direction = request.order_created_at();
    let overrides = FindOverrides {
        order: vec![
            OrderSpec::new("users.created_at", direction),
            OrderSpec::new("users.id", direction),
        ],
        ..Default::default()
    };

    let repository = UsersRepository::new(state.db.clone());
    let page = paginate(
        &request,
        &repository,
        &overrides,
        "api/users",
        &state.page_url,
        &USERS_QUERY_COLS,
    )
    .map_err(map_error)?;

    Ok(Json(page))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), (StatusCode, Json<ErrorResponse>)> {
    let user = User::create(
        &state.db,
        &NewUser {
            nickname: req.nickname,
            email: req.email,
            password: req.password,
        },
    )
    .map_err(map_error)?;

    log::info!("Created user {} ('{}')", user.id, user.nickname);
    Ok((StatusCode::CREATED, Json(user)))
}
