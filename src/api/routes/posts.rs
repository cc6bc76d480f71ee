use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::state::AppState;
use super::{map_error, ErrorResponse};
use crate::error::PostlineError;
use crate::pagination::{paginate, OrderSpec, Page, PaginationRequest, POSTS_QUERY_COLS};
use crate::posts::{NewPost, Post, PostPatch, PostsRepository};
use crate::repo::FindOverrides;
use crate::users::User;

/// Request structure for creating a new post
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub author_id: i64,
    pub title: String,
    pub content: String,
}

/// Request structure for patching a post
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Post not found".to_string(),
        }),
    )
}

/// GET /api/posts
///
/// Cursor-paginated feed. The raw query pairs bind in request order so the
/// next URL can replay them faithfully.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<Post>>, (StatusCode, Json<ErrorResponse>)> {
    let request =
        PaginationRequest::from_query_pairs(pairs, state.default_take).map_err(map_error)?;

    let direction = request.order_created_at();
    let overrides = FindOverrides {
        relations: vec!["author"],
        order: vec![
            OrderSpec::new("posts.created_at", direction),
            // Tie-break on id so rows created in the same second still page
            // deterministically.
            OrderSpec::new("posts.id", direction),
        ],
        ..Default::default()
    };

    let repository = PostsRepository::new(state.db.clone());
    let page = paginate(
        &request,
        &repository,
        &overrides,
        "api/posts",
        &state.page_url,
        &POSTS_QUERY_COLS,
    )
    .map_err(map_error)?;

    Ok(Json(page))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), (StatusCode, Json<ErrorResponse>)> {
    let author = User::get_by_id(&state.db, req.author_id).map_err(map_error)?;
    if author.is_none() {
        return Err(map_error(PostlineError::Error(format!(
            "Author {} does not exist",
            req.author_id
        ))));
    }

    let post = Post::create(
        &state.db,
        req.author_id,
        &NewPost {
            title: req.title,
            content: req.content,
        },
    )
    .map_err(map_error)?;

    log::info!("Created post {} by user {}", post.id, post.author_id);
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts/{post_id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Post>, (StatusCode, Json<ErrorResponse>)> {
    match Post::get_by_id(&state.db, post_id).map_err(map_error)? {
        Some(post) => Ok(Json(post)),
        None => Err(not_found()),
    }
}

/// PATCH /api/posts/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<Post>, (StatusCode, Json<ErrorResponse>)> {
    let patch = PostPatch {
        title: req.title,
        content: req.content,
    };

    match Post::update(&state.db, post_id, &patch).map_err(map_error)? {
        Some(post) => Ok(Json(post)),
        None => Err(not_found()),
    }
}

/// DELETE /api/posts/{post_id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match Post::delete(&state.db, post_id).map_err(map_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(not_found()),
    }
}
